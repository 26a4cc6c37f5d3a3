//! Error types for the statement decoder.

use std::fmt;
use thiserror::Error;

/// Result type alias for decoder operations
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Errors that can occur while decoding a statement.
///
/// Every variant except `Csv` and `Io` describes malformed input. They are all
/// fatal: the decoder does not skip the offending line or resynchronize.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Failed to open or read the input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tokenizer error (invalid UTF-8, read failure)
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Quoting the tokenizer would otherwise accept silently
    #[error("malformed quoting in record at line {line}: {fault}")]
    MalformedQuote { line: u64, fault: QuoteFault },

    /// A line without the table name, the marker and at least one field
    #[error("not enough fields at line {line}: expected at least 3, found {found}")]
    TooFewFields { line: u64, found: usize },

    /// The second field is not one of `Header`, `Data`, `SubTotal`, `Total`
    #[error("unrecognized row marker {marker:?} at line {line}")]
    UnrecognizedMarker { line: u64, marker: String },

    /// A header line repeating the name of the table currently open
    #[error("unexpected header for table {table:?} at line {line}")]
    UnexpectedHeader { line: u64, table: String },

    /// A body line for a table that was never opened by a header
    #[error("missing header for table {table:?} at line {line}")]
    MissingHeader { line: u64, table: String },

    /// A body line whose value count differs from the table's field count
    #[error("table {table:?} at line {line}: expected {expected} values, found {found}")]
    FieldCountMismatch {
        line: u64,
        table: String,
        expected: usize,
        found: usize,
    },

    /// The reader was used again after reporting an error
    #[error("reader already failed; decoding cannot continue")]
    Poisoned,

    /// Missing input file argument
    #[error("Missing input file argument. Usage: ibkr-csv <statement.csv>")]
    MissingArgument,
}

/// Quoting defects detected in the raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteFault {
    /// A quote inside a field that did not start with a quote
    Bare,

    /// A character other than a delimiter or line end after a closing quote
    Extraneous,

    /// A quoted field still open at end of input
    Unterminated,
}

impl fmt::Display for QuoteFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            QuoteFault::Bare => "bare quote in non-quoted field",
            QuoteFault::Extraneous => "extraneous character after closing quote",
            QuoteFault::Unterminated => "quoted field not closed before end of input",
        };
        f.write_str(msg)
    }
}
