use std::{error, fmt, num::ParseIntError};

/**
An error converting a raw line into an event.
*/
#[derive(Debug)]
pub enum Error {
    /**
    The header of a glog line couldn't be read.

    The `offset` is the position in the raw line where reading stopped.
    */
    MalformedHeader { offset: usize, reason: &'static str },
    /**
    The line number between `:` and `]` isn't a base-10 integer.
    */
    LineNumber { raw: String, source: ParseIntError },
    /**
    The event couldn't be encoded or decoded.
    */
    Serialization(serde_json::Error),
}

impl Error {
    pub(super) fn malformed(offset: usize, reason: &'static str) -> Self {
        Error::MalformedHeader { offset, reason }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MalformedHeader { offset, reason } => {
                write!(f, "malformed glog header at byte {}: {}", offset, reason)
            }
            Error::LineNumber { raw, source } => {
                write!(f, "invalid line number {:?}: {}", raw, source)
            }
            Error::Serialization(err) => write!(f, "could not serialize event: {}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::MalformedHeader { .. } => None,
            Error::LineNumber { source, .. } => Some(source),
            Error::Serialization(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err)
    }
}
