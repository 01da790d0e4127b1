/*!
Diagnostics for the converter itself.

Diagnostic events are written to `stderr` as CLEF so they don't
get mixed up with the events written to `stdout`.
*/

use std::{
    fmt::Display,
    io::{self, Write},
    sync::atomic::{AtomicUsize, Ordering},
};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::Error;

lazy_static! {
    static ref MIN_LEVEL: AtomicUsize = AtomicUsize::new(Level::Info as usize);
}

/**
Declare counters for a module.

Counters are incremented with `increment!(module.counter)` and
reported when diagnostics are stopped.
*/
macro_rules! metrics {
    ($($metric:ident),* $(,)?) => {
        #[allow(non_upper_case_globals)]
        pub(crate) mod metrics {
            use std::sync::atomic::{AtomicUsize, Ordering};

            $(
                pub(crate) static $metric: AtomicUsize = AtomicUsize::new(0);
            )*

            pub(crate) fn take() -> Vec<(&'static str, usize)> {
                vec![
                    $(
                        (stringify!($metric), $metric.swap(0, Ordering::Relaxed)),
                    )*
                ]
            }
        }
    };
}

macro_rules! increment {
    ($module:ident . $metric:ident) => {
        $crate::$module::metrics::$metric.fetch_add(1, std::sync::atomic::Ordering::Relaxed)
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Error,
}

impl Level {
    fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Error => "ERROR",
        }
    }

    fn enabled(&self) -> bool {
        *self as usize >= MIN_LEVEL.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /**
    The minimum level of diagnostic events to write.
    */
    pub min_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            min_level: Level::Info,
        }
    }
}

/**
Start writing diagnostics.
*/
pub fn init(config: Config) {
    MIN_LEVEL.store(config.min_level as usize, Ordering::Relaxed);
}

/**
Stop writing diagnostics.

Any counters collected so far are written as a final debug event
and then reset.
*/
pub fn stop() -> Result<(), Error> {
    let mut properties = Map::new();

    for (module, metrics) in &[
        ("receive", crate::receive::metrics::take()),
        ("pipe", crate::pipe::metrics::take()),
        ("process", crate::process::metrics::take()),
    ] {
        for (metric, value) in metrics {
            properties.insert(format!("{}_{}", module, metric), (*value).into());
        }
    }

    if Level::Debug.enabled() {
        let evt = DiagnosticEvent::new(Level::Debug, None, "Collected metrics", properties);

        let mut stderr = io::stderr();
        writeln!(stderr, "{}", serde_json::to_string(&evt)?)?;
        stderr.flush()?;
    }

    MIN_LEVEL.store(Level::Info as usize, Ordering::Relaxed);

    Ok(())
}

#[derive(Serialize)]
struct DiagnosticEvent<'a> {
    #[serde(rename = "@t")]
    timestamp: DateTime<Utc>,

    #[serde(rename = "@l")]
    level: &'static str,

    #[serde(rename = "@mt")]
    message_template: &'static str,

    #[serde(rename = "@x")]
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,

    #[serde(flatten)]
    properties: Map<String, Value>,
}

impl<'a> DiagnosticEvent<'a> {
    fn new(
        level: Level,
        error: Option<&'a str>,
        message_template: &'static str,
        properties: Map<String, Value>,
    ) -> DiagnosticEvent<'a> {
        DiagnosticEvent {
            timestamp: Utc::now(),
            message_template,
            level: level.as_str(),
            error,
            properties,
        }
    }
}

fn emit_at(level: Level, error: Option<&dyn Display>, message_template: &'static str) {
    if !level.enabled() {
        return;
    }

    let err_str = error.map(|err| err.to_string());
    let evt = DiagnosticEvent::new(level, err_str.as_deref(), message_template, Map::new());
    let json = serde_json::to_string(&evt).expect("infallible JSON");

    eprintln!("{}", json);
}

pub fn emit(message_template: &'static str) {
    emit_at(Level::Info, None, message_template)
}

pub fn emit_debug(message_template: &'static str) {
    emit_at(Level::Debug, None, message_template)
}

pub fn emit_err(error: &impl Display, message_template: &'static str) {
    emit_at(Level::Error, Some(error), message_template)
}

pub fn emit_debug_err(error: &impl Display, message_template: &'static str) {
    emit_at(Level::Debug, Some(error), message_template)
}
