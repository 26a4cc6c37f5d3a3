//! Incremental table decoder.
//!
//! Lines of one table are contiguous, so a table ends exactly when a header
//! for another table shows up or the stream ends. The decoder reads one line
//! past the boundary to see this and keeps that line for the next call.

use crate::config::{ReaderOptions, SameNameHeader};
use crate::error::{DecodeError, Result};
use crate::record::{CsvSource, Record, RecordSource};
use crate::table::{Marker, RowKind, Table};
use log::{debug, trace};
use std::io::Read;

/// Outcome of a single [`TableReader::next_table`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A table closed by the header of the next one.
    Table(Table),

    /// End of stream, with the table that was still open when it was hit.
    ///
    /// `End(None)` means no line was read during the call.
    End(Option<Table>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ready,
    Finished,
    Poisoned,
}

/// Pull-based decoder turning a record stream into [`Table`]s.
///
/// A reader is stateful and meant for a single consumer. After it has
/// returned an error every further call fails with [`DecodeError::Poisoned`].
///
/// # Examples
///
/// ```
/// use ibkr_csv::{Decoded, TableReader};
///
/// let csv = "A,Header,X,Y\nA,Data,1,2\nB,Header,X,Y\nB,Data,3,4\n";
/// let mut reader = TableReader::from_reader(csv.as_bytes());
///
/// let Decoded::Table(a) = reader.next_table().unwrap() else { panic!() };
/// assert_eq!(a.name(), "A");
///
/// let Decoded::End(Some(b)) = reader.next_table().unwrap() else { panic!() };
/// assert_eq!(b.rows()[0].get("Y"), Some("4"));
///
/// assert_eq!(reader.next_table().unwrap(), Decoded::End(None));
/// ```
pub struct TableReader<S> {
    source: S,
    options: ReaderOptions,

    /// Line read past the previous table's boundary.
    pending: Option<Record>,

    state: State,
}

impl<R: Read> TableReader<CsvSource<R>> {
    /// Decodes CSV from `reader` with default options.
    pub fn from_reader(reader: R) -> Self {
        Self::from_reader_with_options(reader, ReaderOptions::default())
    }

    /// Decodes CSV from `reader`, tokenizing according to `options`.
    pub fn from_reader_with_options(reader: R, options: ReaderOptions) -> Self {
        let source = CsvSource::with_options(reader, &options);
        Self::with_options(source, options)
    }
}

impl<S: RecordSource> TableReader<S> {
    /// Creates a decoder over an arbitrary record source.
    pub fn new(source: S) -> Self {
        Self::with_options(source, ReaderOptions::default())
    }

    /// Creates a decoder over an arbitrary record source with options.
    ///
    /// Tokenizer options (`delimiter`, `trim`) are the source's concern and
    /// are ignored here.
    pub fn with_options(source: S, options: ReaderOptions) -> Self {
        TableReader {
            source,
            options,
            pending: None,
            state: State::Ready,
        }
    }

    /// Options in effect.
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Decodes the next table.
    ///
    /// Once [`Decoded::End`] has been returned, later calls keep returning
    /// `Decoded::End(None)`.
    pub fn next_table(&mut self) -> Result<Decoded> {
        match self.state {
            State::Finished => return Ok(Decoded::End(None)),
            State::Poisoned => return Err(DecodeError::Poisoned),
            State::Ready => {}
        }

        match self.decode() {
            Ok(decoded) => {
                if matches!(decoded, Decoded::End(_)) {
                    self.state = State::Finished;
                }
                Ok(decoded)
            }
            Err(e) => {
                self.state = State::Poisoned;
                Err(e)
            }
        }
    }

    /// Decodes every remaining table.
    pub fn read_all(&mut self) -> Result<Vec<Table>> {
        self.collect()
    }

    fn next_line(&mut self) -> Result<Option<Record>> {
        match self.pending.take() {
            Some(record) => Ok(Some(record)),
            None => self.source.next_record(),
        }
    }

    fn decode(&mut self) -> Result<Decoded> {
        let mut table: Option<Table> = None;

        loop {
            let record = match self.next_line()? {
                Some(record) => record,
                None => {
                    if let Some(t) = &table {
                        debug!(
                            "Table {:?} closed at end of stream ({} rows)",
                            t.name(),
                            t.rows().len()
                        );
                    }
                    return Ok(Decoded::End(table));
                }
            };

            if record.fields.len() < 3 {
                return Err(DecodeError::TooFewFields {
                    line: record.line,
                    found: record.fields.len(),
                });
            }

            let marker = Marker::parse(&record.fields[1]).ok_or_else(|| {
                DecodeError::UnrecognizedMarker {
                    line: record.line,
                    marker: record.fields[1].clone(),
                }
            })?;

            let name = record.fields[0].as_str();
            let restart = self.options.same_name_header == SameNameHeader::Restart;

            table = match (table.take(), marker) {
                (None, Marker::Header) => Some(open_table(record)),
                (Some(t), Marker::Header) if t.name() != name || restart => {
                    debug!(
                        "Table {:?} closed by header of {:?} at line {} ({} rows)",
                        t.name(),
                        name,
                        record.line,
                        t.rows().len()
                    );
                    self.pending = Some(record);
                    return Ok(Decoded::Table(t));
                }
                (Some(_), Marker::Header) => {
                    return Err(DecodeError::UnexpectedHeader {
                        line: record.line,
                        table: name.to_string(),
                    });
                }
                (Some(mut t), Marker::Row(kind)) if t.name() == name => {
                    append_row(&mut t, kind, record)?;
                    Some(t)
                }
                (_, Marker::Row(_)) => {
                    return Err(DecodeError::MissingHeader {
                        line: record.line,
                        table: name.to_string(),
                    });
                }
            };
        }
    }
}

/// Starts a table from its header line.
fn open_table(record: Record) -> Table {
    let Record { line, mut fields } = record;
    let schema = fields.split_off(2);
    let name = fields.swap_remove(0);
    debug!(
        "Line {}: opened table {:?} with {} fields",
        line,
        name,
        schema.len()
    );
    Table::new(name, schema)
}

/// Adds a body line to the open table, pairing values with field names by position.
fn append_row(table: &mut Table, kind: RowKind, record: Record) -> Result<()> {
    let Record { line, mut fields } = record;
    let values = fields.split_off(2);
    trace!("Line {}: {} row for {:?}", line, kind, table.name());

    table
        .push_row(kind, values)
        .map_err(|values| DecodeError::FieldCountMismatch {
            line,
            table: table.name().to_string(),
            expected: table.fields().len(),
            found: values.len(),
        })
}

impl<S: RecordSource> Iterator for TableReader<S> {
    type Item = Result<Table>;

    /// Yields each table, then the first error if there is one, then `None`.
    fn next(&mut self) -> Option<Self::Item> {
        if self.state != State::Ready {
            return None;
        }

        match self.next_table() {
            Ok(Decoded::Table(table)) | Ok(Decoded::End(Some(table))) => Some(Ok(table)),
            Ok(Decoded::End(None)) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MemorySource;

    fn source(lines: &[&[&str]]) -> MemorySource {
        MemorySource::new(
            lines
                .iter()
                .map(|l| l.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    fn expect_table(reader: &mut TableReader<MemorySource>) -> Table {
        match reader.next_table().unwrap() {
            Decoded::Table(t) => t,
            other => panic!("Expected a table, got {:?}", other),
        }
    }

    #[test]
    fn test_boundary_on_new_header() {
        let mut reader = TableReader::new(source(&[
            &["A", "Header", "X", "Y"],
            &["A", "Data", "1", "2"],
            &["B", "Header", "X", "Y"],
            &["B", "Data", "3", "4"],
        ]));

        let a = expect_table(&mut reader);
        assert_eq!(a.name(), "A");
        assert_eq!(a.fields(), ["X", "Y"]);
        assert_eq!(a.rows().len(), 1);
        assert_eq!(a.rows()[0].get("X"), Some("1"));

        match reader.next_table().unwrap() {
            Decoded::End(Some(b)) => {
                assert_eq!(b.name(), "B");
                assert_eq!(b.rows()[0].get("Y"), Some("4"));
            }
            other => panic!("Expected end with table, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_source() {
        let mut reader = TableReader::new(source(&[]));
        assert_eq!(reader.next_table().unwrap(), Decoded::End(None));
    }

    #[test]
    fn test_end_is_idempotent() {
        let mut reader = TableReader::new(source(&[&["A", "Header", "X"]]));

        match reader.next_table().unwrap() {
            Decoded::End(Some(t)) => assert!(t.is_empty()),
            other => panic!("Expected end with table, got {:?}", other),
        }
        assert_eq!(reader.next_table().unwrap(), Decoded::End(None));
        assert_eq!(reader.next_table().unwrap(), Decoded::End(None));
    }

    #[test]
    fn test_row_kinds() {
        let mut reader = TableReader::new(source(&[
            &["Fees", "Header", "Amount"],
            &["Fees", "Data", "1"],
            &["Fees", "SubTotal", "1"],
            &["Fees", "Total", "1"],
        ]));

        let tables = reader.read_all().unwrap();
        let kinds: Vec<_> = tables[0].rows().iter().map(|r| r.kind()).collect();
        assert_eq!(kinds, vec![RowKind::Data, RowKind::Subtotal, RowKind::Total]);
    }

    #[test]
    fn test_too_few_fields() {
        let mut reader = TableReader::new(source(&[&["A", "Header"]]));
        assert!(matches!(
            reader.next_table(),
            Err(DecodeError::TooFewFields { line: 1, found: 2 })
        ));
    }

    #[test]
    fn test_unrecognized_marker() {
        let mut reader = TableReader::new(source(&[
            &["A", "Header", "X"],
            &["A", "Bogus", "1"],
        ]));
        match reader.next_table() {
            Err(DecodeError::UnrecognizedMarker { line, marker }) => {
                assert_eq!(line, 2);
                assert_eq!(marker, "Bogus");
            }
            other => panic!("Expected UnrecognizedMarker, got {:?}", other),
        }
    }

    #[test]
    fn test_same_name_header_rejected_by_default() {
        let mut reader = TableReader::new(source(&[
            &["A", "Header", "X"],
            &["A", "Data", "1"],
            &["A", "Header", "X"],
        ]));
        assert!(matches!(
            reader.next_table(),
            Err(DecodeError::UnexpectedHeader { line: 3, .. })
        ));
    }

    #[test]
    fn test_same_name_header_restart() {
        let options = ReaderOptions::new().same_name_header(SameNameHeader::Restart);
        let mut reader = TableReader::with_options(
            source(&[
                &["A", "Header", "X"],
                &["A", "Data", "1"],
                &["A", "Header", "Y", "Z"],
                &["A", "Data", "2", "3"],
            ]),
            options,
        );

        let first = expect_table(&mut reader);
        assert_eq!(first.fields(), ["X"]);
        assert_eq!(first.rows().len(), 1);

        match reader.next_table().unwrap() {
            Decoded::End(Some(second)) => {
                assert_eq!(second.name(), "A");
                assert_eq!(second.fields(), ["Y", "Z"]);
                assert_eq!(second.rows()[0].get("Z"), Some("3"));
            }
            other => panic!("Expected end with table, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_header_on_first_line() {
        let mut reader = TableReader::new(source(&[&["A", "Data", "1"]]));
        assert!(matches!(
            reader.next_table(),
            Err(DecodeError::MissingHeader { line: 1, .. })
        ));
    }

    #[test]
    fn test_missing_header_for_new_name() {
        let mut reader = TableReader::new(source(&[
            &["A", "Header", "X"],
            &["B", "Data", "1"],
        ]));
        match reader.next_table() {
            Err(DecodeError::MissingHeader { line, table }) => {
                assert_eq!(line, 2);
                assert_eq!(table, "B");
            }
            other => panic!("Expected MissingHeader, got {:?}", other),
        }
    }

    #[test]
    fn test_field_count_mismatch() {
        let mut reader = TableReader::new(source(&[
            &["A", "Header", "X", "Y"],
            &["A", "Data", "1"],
        ]));
        match reader.next_table() {
            Err(DecodeError::FieldCountMismatch {
                line,
                expected,
                found,
                ..
            }) => {
                assert_eq!(line, 2);
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("Expected FieldCountMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_poisoned_after_error() {
        let mut reader = TableReader::new(source(&[
            &["A", "Data", "1"],
            &["B", "Header", "X"],
        ]));
        assert!(reader.next_table().is_err());
        assert!(matches!(reader.next_table(), Err(DecodeError::Poisoned)));
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let reader = TableReader::new(source(&[
            &["A", "Header", "X"],
            &["B", "Header", "X"],
            &["B", "Total"],
        ]));

        let results: Vec<_> = reader.collect();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().name(), "A");
        assert!(matches!(results[1], Err(DecodeError::TooFewFields { .. })));
    }

    #[test]
    fn test_source_error_propagates() {
        struct Failing;

        impl RecordSource for Failing {
            fn next_record(&mut self) -> Result<Option<Record>> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "boom").into())
            }
        }

        let mut reader = TableReader::new(Failing);
        assert!(matches!(reader.next_table(), Err(DecodeError::Io(_))));
    }
}
