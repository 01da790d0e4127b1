use std::{collections::HashMap, fmt, time::SystemTime};

use serde::{
    de::{self, Deserialize, Deserializer, Visitor},
    ser::{Serialize, Serializer},
};

use serde_json::Value;

use super::{error::Error, str::Str};

/*
{
   "@source_host": "test.here.com",
   "@timestamp": "2013-10-24T09:30:46.947024155Z",
   "@fields": {
      "level": "INFO",
      "threadid": "400004",
      "file": "file.go",
      "line": 10
   },
   "message": "hello"
}
*/
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event<'a> {
    #[serde(rename = "@source_host")]
    #[serde(borrow)]
    pub source_host: Str<'a>,

    #[serde(rename = "@timestamp")]
    pub timestamp: Timestamp,

    #[serde(rename = "@fields")]
    #[serde(borrow)]
    pub fields: HashMap<Str<'a>, Value>,

    #[serde(rename = "message")]
    #[serde(borrow)]
    pub message: Str<'a>,
}

pub(super) const LEVEL: &str = "level";
pub(super) const THREAD_ID: &str = "threadid";
pub(super) const FILE: &str = "file";
pub(super) const LINE: &str = "line";
pub(super) const STACK: &str = "stack";

impl<'a> Event<'a> {
    pub(super) fn new(source_host: &'a str, timestamp: Timestamp, message: Str<'a>) -> Self {
        Event {
            source_host: Str::Borrowed(source_host),
            timestamp,
            fields: HashMap::new(),
            message,
        }
    }

    /**
    Read an event back from its JSON encoding.

    Strings are borrowed from `json` where they don't contain escapes.
    */
    pub fn from_slice(json: &'a [u8]) -> Result<Self, Error> {
        Ok(serde_json::from_slice(json)?)
    }

    /**
    Encode the event as JSON.
    */
    pub fn to_vec(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_json::to_vec(self)?)
    }

    /**
    Get a field by name.
    */
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub(super) fn set(&mut self, name: &'a str, value: impl Into<Value>) {
        self.fields.insert(Str::Borrowed(name), value.into());
    }
}

/**
The point in time an event was captured.

Timestamps are encoded as RFC3339 in UTC with nanosecond precision.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp(SystemTime);

impl Timestamp {
    pub fn now() -> Self {
        Timestamp(SystemTime::now())
    }
}

impl From<SystemTime> for Timestamp {
    fn from(ts: SystemTime) -> Self {
        Timestamp(ts)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&humantime::format_rfc3339_nanos(self.0), f)
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StringVisitor;

        impl<'de> Visitor<'de> for StringVisitor {
            type Value = Timestamp;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an RFC3339 formatted string")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                let ts = humantime::parse_rfc3339(value).map_err(|e| E::custom(e))?;

                Ok(Timestamp(ts))
            }
        }

        deserializer.deserialize_str(StringVisitor)
    }
}
