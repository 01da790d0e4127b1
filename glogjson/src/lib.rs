/*!
Convert glog lines into JSON events for a log pipeline.

The converter is split into a few main components, in order of where they appear in the processing of a log line:

- **Pipe**: An asynchronous loop built on `tokio` that reads input until it's closed.
- **Receive**: Splits the input into raw lines, discarding any that are too big.
- **Process**: Reads the severity, thread id, file, and line from a glog line and maps them
into a JSON event, along with a stack trace and any extra fields.
*/

#![recursion_limit = "256"]
#![deny(unsafe_code)]

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate serde_derive;

#[macro_use]
pub mod diagnostics;

#[macro_use]
extern crate anyhow;

pub mod config;
pub mod pipe;
pub mod process;
pub mod receive;

pub use self::{anyhow::Error, config::Config};
