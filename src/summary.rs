//! Per-table summary output.

use crate::error::Result;
use crate::reader::TableReader;
use crate::record::RecordSource;
use crate::table::{RowKind, Table};
use csv::WriterBuilder;
use log::info;
use serde::Serialize;
use std::io::Write;

/// One line of summary output.
///
/// Serialized with header `table,fields,rows,data,subtotal,total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub table: String,
    pub fields: usize,
    pub rows: usize,
    pub data: usize,
    pub subtotal: usize,
    pub total: usize,
}

impl TableSummary {
    pub fn of(table: &Table) -> Self {
        TableSummary {
            table: table.name().to_string(),
            fields: table.fields().len(),
            rows: table.rows().len(),
            data: table.rows_of_kind(RowKind::Data).count(),
            subtotal: table.rows_of_kind(RowKind::Subtotal).count(),
            total: table.rows_of_kind(RowKind::Total).count(),
        }
    }
}

/// Decodes every table from `reader` and writes one summary line per table.
///
/// Tables are written as soon as they are decoded, in stream order. Returns
/// the number of tables written. The header line is written even when the
/// stream holds no tables.
pub fn write_summary<S, W>(reader: &mut TableReader<S>, writer: W) -> Result<usize>
where
    S: RecordSource,
    W: Write,
{
    // Header is written by hand so an empty stream still gets one.
    let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    csv_writer.write_record(["table", "fields", "rows", "data", "subtotal", "total"])?;

    let mut count = 0;
    for table in reader {
        let table = table?;
        let summary = TableSummary::of(&table);
        csv_writer.serialize(&summary)?;
        count += 1;
    }

    csv_writer.flush()?;
    info!("Decoded {} tables", count);
    Ok(count)
}
