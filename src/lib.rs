//! # IBKR CSV
//!
//! A streaming decoder for Interactive Brokers CSV statements, where many
//! logical tables share one comma-delimited file.
//!
//! Every line is `TableName,Marker,field1,field2,...` with the marker being one
//! of `Header`, `Data`, `SubTotal` or `Total`. A `Header` line opens a table
//! and declares its field names; the following lines with the same name are
//! its rows. Values are kept as raw text.
//!
//! ## Design Principles
//!
//! - **Single pass**: tables are returned as soon as the next header is seen
//! - **One line of lookahead**: the line that ends a table starts the next one
//! - **Fail closed**: malformed lines are errors, never skipped or padded
//!
//! ## Example
//!
//! ```no_run
//! use ibkr_csv::TableReader;
//! use std::fs::File;
//!
//! let file = File::open("statement.csv").unwrap();
//! for table in TableReader::from_reader(file) {
//!     let table = table.unwrap();
//!     println!("{}: {} rows", table.name(), table.rows().len());
//! }
//! ```

pub mod config;
pub mod error;
pub mod reader;
pub mod record;
pub mod summary;
pub mod table;

pub use config::{ReaderOptions, SameNameHeader};
pub use error::{DecodeError, QuoteFault, Result};
pub use reader::{Decoded, TableReader};
pub use record::{CsvSource, MemorySource, Record, RecordSource};
pub use summary::{write_summary, TableSummary};
pub use table::{Marker, Row, RowKind, Table};
