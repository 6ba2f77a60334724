//! Streaming canonical CSV reader

use crate::error::{Error, Result};
use std::io::BufRead;

/// Reads canonical CSV records one at a time.
///
/// Fields are separated by the delimiter and may be enclosed in double
/// quotes. A quoted field can contain the delimiter, line breaks and doubled
/// quotes (`""` for one `"`). There is no backslash escape and fields are
/// never trimmed. An empty line is a record with one empty field.
pub struct CsvRowReader<R> {
    input: R,
    delimiter: char,
    line: usize,
    buffer: String,
}

impl<R: BufRead> CsvRowReader<R> {
    /// Reader over comma separated input
    pub fn new(input: R) -> Self {
        Self::with_delimiter(input, ',')
    }

    pub fn with_delimiter(input: R, delimiter: char) -> Self {
        Self {
            input,
            delimiter,
            line: 0,
            buffer: String::new(),
        }
    }

    /// Physical lines consumed so far
    pub fn line(&self) -> usize {
        self.line
    }

    /// Next record, `None` at end of input
    pub fn read_row(&mut self) -> Result<Option<Vec<String>>> {
        if !self.read_line()? {
            return Ok(None);
        }

        let start_line = self.line;
        let mut fields = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;

        loop {
            let mut chars = self.buffer.chars().peekable();
            while let Some(c) = chars.next() {
                if c == '"' {
                    if in_quotes && chars.peek() == Some(&'"') {
                        current.push('"');
                        chars.next();
                    } else {
                        in_quotes = !in_quotes;
                    }
                } else if c == self.delimiter && !in_quotes {
                    fields.push(std::mem::take(&mut current));
                } else {
                    current.push(c);
                }
            }

            if !in_quotes {
                break;
            }

            // Quoted field spans a line break
            current.push('\n');
            if !self.read_line()? {
                return Err(Error::csv(start_line, "unterminated quoted field"));
            }
        }

        fields.push(current);
        Ok(Some(fields))
    }

    /// Read one physical line into the buffer without its terminator
    fn read_line(&mut self) -> Result<bool> {
        self.buffer.clear();
        if self.input.read_line(&mut self.buffer)? == 0 {
            return Ok(false);
        }
        self.line += 1;

        if self.buffer.ends_with('\n') {
            self.buffer.pop();
            if self.buffer.ends_with('\r') {
                self.buffer.pop();
            }
        }
        Ok(true)
    }
}

impl<R: BufRead> Iterator for CsvRowReader<R> {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_row().transpose()
    }
}
