//! Record sources feeding the table decoder.
//!
//! Tokenizing lines into fields (quoting, escaped delimiters, embedded
//! newlines) is delegated to the `csv` crate. The decoder only sees
//! [`Record`]s pulled through the [`RecordSource`] trait.
//!
//! The `csv` crate accepts stray and unbalanced quotes. [`CsvSource`] watches
//! the raw bytes on their way into the tokenizer and rejects them instead.

use crate::config::ReaderOptions;
use crate::error::{DecodeError, QuoteFault, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::{self, Read};

/// One tokenized line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 1-based line the record started on.
    pub line: u64,

    /// Fields in source order.
    pub fields: Vec<String>,
}

impl Record {
    /// Creates a record from its line number and fields.
    pub fn new(line: u64, fields: Vec<String>) -> Self {
        Record { line, fields }
    }
}

/// A pull-based supplier of records.
pub trait RecordSource {
    /// Reads the next record.
    ///
    /// Returns `Ok(None)` at end of stream. Tokenizer and I/O failures are
    /// reported as errors, never as end of stream.
    fn next_record(&mut self) -> Result<Option<Record>>;
}

/// Record source backed by a `csv::Reader`.
///
/// Records may have any number of fields since one stream carries tables of
/// different widths. Blank lines are skipped by the tokenizer. A bare quote,
/// text after a closing quote or a quoted field left open at end of input is
/// reported as [`DecodeError::MalformedQuote`].
pub struct CsvSource<R> {
    reader: csv::Reader<QuoteCheck<R>>,
    record: StringRecord,
}

impl<R: Read> CsvSource<R> {
    /// Wraps a reader using the default options.
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, &ReaderOptions::default())
    }

    /// Wraps a reader honoring the delimiter and trimming options.
    pub fn with_options(reader: R, options: &ReaderOptions) -> Self {
        let trim = if options.trim { Trim::All } else { Trim::None };
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(options.delimiter)
            .trim(trim)
            .from_reader(QuoteCheck::new(reader, options.delimiter));

        CsvSource {
            reader,
            record: StringRecord::new(),
        }
    }
}

impl<R: Read> RecordSource for CsvSource<R> {
    fn next_record(&mut self) -> Result<Option<Record>> {
        let more = self.reader.read_record(&mut self.record)?;
        let line = self.record.position().map(|p| p.line()).unwrap_or(0);

        // Faults at or before the end of this record belong to it.
        if let Some((offset, fault)) = self.reader.get_ref().fault {
            if !more || offset <= self.reader.position().byte() {
                return Err(DecodeError::MalformedQuote { line, fault });
            }
        }

        if !more {
            return Ok(None);
        }

        let fields = self.record.iter().map(str::to_string).collect();
        Ok(Some(Record::new(line, fields)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// Read adapter tracking RFC 4180 quoting over the raw bytes.
///
/// Only the first fault is kept, with the byte offset it was found at.
struct QuoteCheck<R> {
    inner: R,
    delimiter: u8,
    state: QuoteState,
    offset: u64,
    fault: Option<(u64, QuoteFault)>,
}

impl<R> QuoteCheck<R> {
    fn new(inner: R, delimiter: u8) -> Self {
        QuoteCheck {
            inner,
            delimiter,
            state: QuoteState::FieldStart,
            offset: 0,
            fault: None,
        }
    }

    fn step(&mut self, b: u8) {
        let boundary = b == self.delimiter || b == b'\n' || b == b'\r';

        self.state = match (self.state, b) {
            (QuoteState::FieldStart, b'"') => QuoteState::Quoted,
            (QuoteState::FieldStart, _) if boundary => QuoteState::FieldStart,
            (QuoteState::FieldStart, _) => QuoteState::Unquoted,
            (QuoteState::Unquoted, b'"') => {
                self.fault = Some((self.offset, QuoteFault::Bare));
                QuoteState::Unquoted
            }
            (QuoteState::Unquoted, _) if boundary => QuoteState::FieldStart,
            (QuoteState::Unquoted, _) => QuoteState::Unquoted,
            (QuoteState::Quoted, b'"') => QuoteState::QuoteInQuoted,
            (QuoteState::Quoted, _) => QuoteState::Quoted,
            (QuoteState::QuoteInQuoted, b'"') => QuoteState::Quoted,
            (QuoteState::QuoteInQuoted, _) if boundary => QuoteState::FieldStart,
            (QuoteState::QuoteInQuoted, _) => {
                self.fault = Some((self.offset, QuoteFault::Extraneous));
                QuoteState::Unquoted
            }
        };
    }
}

impl<R: Read> Read for QuoteCheck<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if self.fault.is_some() {
            return Ok(n);
        }

        if n == 0 && self.state == QuoteState::Quoted {
            self.fault = Some((self.offset, QuoteFault::Unterminated));
        }
        for &b in &buf[..n] {
            self.step(b);
            if self.fault.is_some() {
                break;
            }
            self.offset += 1;
        }
        Ok(n)
    }
}

/// Record source over lines that are already tokenized.
///
/// Line numbers are assigned sequentially starting at 1.
pub struct MemorySource {
    lines: std::vec::IntoIter<Vec<String>>,
    line: u64,
}

impl MemorySource {
    /// Creates a source yielding `lines` in order.
    pub fn new(lines: Vec<Vec<String>>) -> Self {
        MemorySource {
            lines: lines.into_iter(),
            line: 0,
        }
    }
}

impl From<Vec<Vec<String>>> for MemorySource {
    fn from(lines: Vec<Vec<String>>) -> Self {
        MemorySource::new(lines)
    }
}

impl RecordSource for MemorySource {
    fn next_record(&mut self) -> Result<Option<Record>> {
        Ok(self.lines.next().map(|fields| {
            self.line += 1;
            Record::new(self.line, fields)
        }))
    }
}
