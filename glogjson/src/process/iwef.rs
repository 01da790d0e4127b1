/*!
Reading the header of a glog line.

A glog line looks like:

```text
[IWEF]mmdd hh:mm:ss.uuuuuu threadid file:line] msg
```

The severity and timestamp are a fixed width, so reading starts at a
fixed offset. Everything after that is found by scanning for delimiters.
*/

use super::{error::Error, severity::Severity, str::Str};

/**
The offset just past the timestamp and the space that follows it.
*/
const HEADER_OFFSET: usize = 22;

const SPACE: u8 = b' ';
const COLON: u8 = b':';
const CLOSE_BRACKET: u8 = b']';

/**
The fields read from a glog line.
*/
#[derive(Debug)]
pub(super) struct Header<'a> {
    pub(super) severity: Severity,
    pub(super) thread_id: Str<'a>,
    pub(super) file: Str<'a>,
    pub(super) line: &'a [u8],
    pub(super) message: Str<'a>,
}

impl<'a> Header<'a> {
    /**
    Read the header of a line that's already been classified.
    */
    pub(super) fn read(severity: Severity, data: &'a [u8]) -> Result<Self, Error> {
        let mut r = Reader::new(data, HEADER_OFFSET)?;

        r.skip_all(SPACE);
        let thread_id = r.up_to(SPACE, "missing space after the thread id")?;
        r.skip()?;

        let file = r.up_to(COLON, "missing `:` after the file name")?;
        r.skip()?;

        let line = r.up_to(CLOSE_BRACKET, "missing `]` after the line number")?;
        r.skip()?;
        r.skip()?;

        let message = r.up_to_line_end()?;

        Ok(Header {
            severity,
            thread_id: Str::from_utf8_lossy(thread_id),
            file: Str::from_utf8_lossy(file),
            line,
            message: Str::from_utf8_lossy(message),
        })
    }

    /**
    Parse the line number as a base-10 integer.
    */
    pub(super) fn line_number(&self) -> Result<i64, Error> {
        let raw = String::from_utf8_lossy(self.line);

        raw.parse().map_err(|source| Error::LineNumber {
            raw: raw.into_owned(),
            source,
        })
    }
}

/**
A cursor over a raw line.

Every read is bounds checked so a short or truncated line is
an error instead of a panic.
*/
#[derive(Debug)]
struct Reader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8], position: usize) -> Result<Self, Error> {
        if data.len() < position {
            return Err(Error::malformed(
                data.len(),
                "the line is shorter than the timestamp header",
            ));
        }

        Ok(Reader { data, position })
    }

    fn skip(&mut self) -> Result<(), Error> {
        if self.position >= self.data.len() {
            return Err(Error::malformed(self.position, "unexpected end of line"));
        }

        self.position += 1;

        Ok(())
    }

    fn skip_all(&mut self, b: u8) {
        while self.data.get(self.position) == Some(&b) {
            self.position += 1;
        }
    }

    /**
    Read up to, but not including, the next `delim`.

    The cursor is left on the delimiter.
    */
    fn up_to(&mut self, delim: u8, reason: &'static str) -> Result<&'a [u8], Error> {
        let start = self.position;

        match self.data[start..].iter().position(|b| *b == delim) {
            Some(len) => {
                self.position = start + len;

                Ok(&self.data[start..self.position])
            }
            None => Err(Error::malformed(self.data.len(), reason)),
        }
    }

    /**
    Read the rest of the line, without its final terminator byte.
    */
    fn up_to_line_end(&self) -> Result<&'a [u8], Error> {
        if self.position >= self.data.len() {
            return Err(Error::malformed(
                self.position,
                "missing the line terminator after the message",
            ));
        }

        Ok(&self.data[self.position..self.data.len() - 1])
    }
}
