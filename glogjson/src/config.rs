use std::{env, str::FromStr};

use crate::{diagnostics, process, receive, Error};

#[derive(Debug, Default, Clone)]
pub struct Config {
    pub receive: receive::Config,
    pub process: process::Config,
    pub diagnostics: diagnostics::Config,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Config::default();

        read_environment(&mut config.process.source_host, "HOSTNAME")?;
        read_environment(&mut config.process.source_host, "GLOG_JSON_SOURCE_HOST")?;
        read_environment(&mut config.process.extra_fields, "GLOG_JSON_EXTRA_FIELDS")?;
        read_environment(&mut config.process.line_number, "GLOG_JSON_LINE_NUMBER")?;
        read_environment(&mut config.receive.max_size_bytes, "GLOG_JSON_MAX_LINE_BYTES")?;

        if is_truthy("GLOG_JSON_ENABLE_DIAGNOSTICS")? {
            config.diagnostics.min_level = diagnostics::Level::Debug;
        }

        Ok(config)
    }
}

fn is_truthy(name: impl AsRef<str>) -> Result<bool, Error> {
    match env::var(name.as_ref()) {
        // The evironment variable contains a truthy value
        Ok(ref v) if v == "True" || v == "true" => Ok(true),
        // The environment variable is not set or doesn't contain
        // a truthy value
        Ok(_) | Err(env::VarError::NotPresent) => Ok(false),
        // The environment variable is invalid
        Err(e) => Err(e.into()),
    }
}

fn read_environment<T>(into: &mut T, name: impl AsRef<str>) -> Result<(), Error>
where
    T: FromStr,
    Error: From<T::Err>,
{
    match env::var(name.as_ref()) {
        // The environment variable exists, but is empty
        Ok(ref v) if v.is_empty() => Ok(()),
        // The environment variable does not exist
        Err(env::VarError::NotPresent) => Ok(()),
        // The environment variable is invalid
        Err(e) => Err(e.into()),
        // The environment variable has a value
        Ok(v) => {
            *into = T::from_str(&v)
                .map_err(Error::from)
                .map_err(|e| e.context(format!("could not read {}", name.as_ref())))?;

            Ok(())
        }
    }
}
