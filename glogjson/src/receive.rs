use std::cmp;

use bytes::{Buf, Bytes, BytesMut};

use tokio_util::codec::Decoder;

use crate::{diagnostics::*, Error};

metrics! {
    line,
    line_overflow
}

/**
Configuration for splitting input into lines.
*/
#[derive(Debug, Clone)]
pub struct Config {
    /**
    The maximum size of a single line before it'll be discarded.
    */
    pub max_size_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_size_bytes: 1024 * 256, // 256kiB
        }
    }
}

/**
Build a decoder that splits input into lines.
*/
pub fn build(config: Config) -> Lines {
    Lines::new(config)
}

/**
A decoder for raw log lines.

Lines are separated by `\n`. Each line is returned with its terminator,
because a glog line is read up to its final byte. A line at the end of
the input without a terminator has one added.
*/
#[derive(Debug)]
pub struct Lines {
    max_size_bytes: usize,
    read_head: usize,
    discarding: bool,
}

impl Lines {
    pub fn new(config: Config) -> Self {
        Lines {
            max_size_bytes: config.max_size_bytes,
            read_head: 0,
            discarding: false,
        }
    }
}

impl Decoder for Lines {
    type Item = Bytes;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        'read_frame: loop {
            let read_to = cmp::min(self.max_size_bytes.saturating_add(1), src.len());

            let sep_offset = src[self.read_head..].iter().position(|b| *b == b'\n');

            match (self.discarding, sep_offset) {
                // A terminator was found
                // Split the line from the buffer and return it
                (false, Some(offset)) => {
                    let frame_end = offset + self.read_head;

                    // The line is sitting right there, but since
                    // it's bigger than our max capacity we still discard it
                    if frame_end > self.max_size_bytes {
                        self.overflow();

                        continue 'read_frame;
                    }

                    self.read_head = 0;
                    increment!(receive.line);

                    return Ok(Some(src.split_to(frame_end + 1).freeze()));
                }
                // A terminator wasn't found, but the incomplete
                // line is too big. Start discarding the input
                (false, None) if src.len() > self.max_size_bytes => {
                    self.overflow();

                    continue 'read_frame;
                }
                // A terminator wasn't found
                // Move the read head forward so we'll check
                // from that position next time data arrives
                (false, None) => {
                    self.read_head = read_to;

                    return Ok(None);
                }
                // We're discarding input and have reached the end of the line
                // Advance the source buffer past it and try again
                (true, Some(offset)) => {
                    src.advance(offset + self.read_head + 1);
                    self.discarding = false;
                    self.read_head = 0;

                    continue 'read_frame;
                }
                // We're discarding input but haven't reached the end of the line yet
                (true, None) => {
                    src.advance(read_to);
                    self.read_head = 0;

                    if src.is_empty() {
                        return Ok(None);
                    }

                    continue 'read_frame;
                }
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        Ok(match self.decode(src)? {
            Some(frame) => Some(frame),
            None => {
                if src.is_empty() {
                    None
                } else {
                    let mut frame = src.split_to(src.len());
                    frame.extend_from_slice(b"\n");
                    self.read_head = 0;

                    increment!(receive.line);

                    Some(frame.freeze())
                }
            }
        })
    }
}

impl Lines {
    fn overflow(&mut self) {
        increment!(receive.line_overflow);
        emit_debug("Discarding a line that's bigger than the maximum size");

        self.discarding = true;
    }
}
