pub mod error;
pub mod event;
mod iwef;
pub mod severity;
pub mod str;

use std::{ops::Deref, str::FromStr, sync::Arc};

use serde_json::{Map, Value};

use crate::diagnostics::*;

use self::iwef::Header;

pub use self::{
    error::Error,
    event::{Event, Timestamp},
    severity::Severity,
    str::Str,
};

metrics! {
    msg,
    classified,
    unclassified,
    line_number_zeroed
}

/**
Configuration for converting glog lines into events.
*/
#[derive(Debug, Clone)]
pub struct Config {
    /**
    The host name written to `@source_host` on every event.
    */
    pub source_host: String,
    /**
    Fields to add to every event.

    These take precedence over fields read from a glog line.
    */
    pub extra_fields: ExtraFields,
    /**
    What to do when a glog line number isn't an integer.
    */
    pub line_number: LineNumberPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_host: "localhost".to_owned(),
            extra_fields: ExtraFields::default(),
            line_number: LineNumberPolicy::Reject,
        }
    }
}

/**
How to treat a line number that isn't a base-10 integer.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineNumberPolicy {
    /**
    Fail the conversion with `Error::LineNumber`.
    */
    Reject,
    /**
    Use `0` as the line number and report the raw value as a diagnostic.
    */
    Zero,
}

impl FromStr for LineNumberPolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reject" => Ok(LineNumberPolicy::Reject),
            "zero" => Ok(LineNumberPolicy::Zero),
            _ => Err(anyhow!(
                "unexpected line number policy {:?}; expected `reject` or `zero`",
                s
            )),
        }
    }
}

/**
A set of fields added to every event.
*/
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtraFields(Map<String, Value>);

impl ExtraFields {
    pub fn insert(&mut self, k: impl Into<String>, v: impl Into<Value>) {
        self.0.insert(k.into(), v.into());
    }
}

impl Deref for ExtraFields {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Map<String, Value>> for ExtraFields {
    fn from(fields: Map<String, Value>) -> Self {
        ExtraFields(fields)
    }
}

impl FromStr for ExtraFields {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match serde_json::from_str(s)? {
            Value::Object(fields) => Ok(ExtraFields(fields)),
            _ => bail!("extra fields must be a JSON object"),
        }
    }
}

/**
A source of capture times for events.
*/
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/**
A clock that reads the system time.
*/
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/**
Build a processor to convert glog lines into events.
*/
pub fn build(config: Config) -> Process {
    Process::new(config)
}

/**
Convert raw glog lines into events.

A `Process` doesn't change after it's built, so it can be shared
between threads and used to convert independent lines concurrently.
The host name and extra fields are fixed for the lifetime of the
`Process`; to change them, build a new one. Callers that swap a shared
`Process` at runtime need to synchronize that themselves.
*/
#[derive(Debug, Clone)]
pub struct Process<C = SystemClock> {
    source_host: Arc<str>,
    extra_fields: Arc<ExtraFields>,
    line_number_policy: LineNumberPolicy,
    clock: C,
}

impl Process {
    pub fn new(config: Config) -> Self {
        Process::with_clock(config, SystemClock)
    }
}

impl<C> Process<C>
where
    C: Clock,
{
    pub fn with_clock(config: Config, clock: C) -> Self {
        Process {
            source_host: config.source_host.into(),
            extra_fields: Arc::new(config.extra_fields),
            line_number_policy: config.line_number,
            clock,
        }
    }

    /**
    Convert a raw line into an event.

    Lines that start with `I`, `W`, `E`, or `F` are read as glog lines,
    and their header is split into the `level`, `threadid`, `file`,
    and `line` fields. The rest of the line becomes the message, without
    its trailing terminator byte. Any other line becomes the message
    verbatim, terminator included.

    The `stack` is only attached to glog lines, and only when it's non-empty.

    Extra fields are added last, so they replace any field read
    from the line with the same name.
    */
    pub fn to_event<'a>(
        &'a self,
        line: &'a [u8],
        stack: Option<&'a [u8]>,
    ) -> Result<Event<'a>, Error> {
        increment!(process.msg);

        let marker = match line.first() {
            Some(marker) => *marker,
            None => return Err(Error::malformed(0, "the line is empty")),
        };

        let mut event = match Severity::classify(marker) {
            Some(severity) => {
                increment!(process.classified);

                let header = Header::read(severity, line)?;
                let line_number = self.line_number(&header)?;

                let mut event = Event::new(&self.source_host, self.clock.now(), header.message);

                event.set(event::LEVEL, header.severity.as_str());
                event.set(event::THREAD_ID, header.thread_id.to_string());
                event.set(event::FILE, header.file.to_string());
                event.set(event::LINE, line_number);

                if let Some(stack) = stack.filter(|stack| !stack.is_empty()) {
                    event.set(event::STACK, String::from_utf8_lossy(stack));
                }

                event
            }
            None => {
                increment!(process.unclassified);

                Event::new(
                    &self.source_host,
                    self.clock.now(),
                    Str::from_utf8_lossy(line),
                )
            }
        };

        for (k, v) in self.extra_fields.iter() {
            event.set(k, v.clone());
        }

        Ok(event)
    }

    /**
    Convert a raw line into a JSON encoded event.
    */
    pub fn write_json(&self, line: &[u8]) -> Result<Vec<u8>, Error> {
        self.write_json_with_stack(line, None)
    }

    /**
    Convert a raw line and the stack trace that goes with it into a JSON encoded event.
    */
    pub fn write_json_with_stack(
        &self,
        line: &[u8],
        stack: Option<&[u8]>,
    ) -> Result<Vec<u8>, Error> {
        self.to_event(line, stack)?.to_vec()
    }

    fn line_number(&self, header: &Header) -> Result<i64, Error> {
        match header.line_number() {
            Ok(line_number) => Ok(line_number),
            Err(err) => match self.line_number_policy {
                LineNumberPolicy::Reject => Err(err),
                LineNumberPolicy::Zero => {
                    increment!(process.line_number_zeroed);
                    emit_debug_err(&err, "Replacing an invalid line number with zero");

                    Ok(0)
                }
            },
        }
    }
}
