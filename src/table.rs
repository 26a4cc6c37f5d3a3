//! Decoded tables and rows.
//!
//! A statement multiplexes many logical tables into one CSV stream. Each line
//! starts with the table name and a row marker; the rest of the line is either
//! the table's field names (on `Header` lines) or values for those fields.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Kind of a body row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    /// Ordinary data row.
    Data,

    /// Subtotal row (`SubTotal` marker).
    Subtotal,

    /// Grand total row (`Total` marker).
    Total,
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            RowKind::Data => "data",
            RowKind::Subtotal => "subtotal",
            RowKind::Total => "total",
        };
        f.write_str(tag)
    }
}

/// The marker in the second column of every line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Opens a table and declares its field names.
    Header,

    /// A body row of the given kind.
    Row(RowKind),
}

impl Marker {
    /// Parses a marker column. Matching is exact and case-sensitive.
    ///
    /// Returns `None` for anything that is not a known marker.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Header" => Some(Marker::Header),
            "Data" => Some(Marker::Row(RowKind::Data)),
            "SubTotal" => Some(Marker::Row(RowKind::Subtotal)),
            "Total" => Some(Marker::Row(RowKind::Total)),
            _ => None,
        }
    }
}

/// A fully decoded table.
///
/// # Invariants
///
/// - `fields` is fixed when the header line is read and never changes
/// - every row holds exactly `fields.len()` values
/// - rows keep the order of their source lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    fields: Arc<[String]>,
    rows: Vec<Row>,
}

impl Table {
    /// Creates an empty table with the given schema.
    pub fn new(name: impl Into<String>, fields: Vec<String>) -> Self {
        Table {
            name: name.into(),
            fields: fields.into(),
            rows: Vec::new(),
        }
    }

    /// Table name, as found in the first column.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field names in declaration order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Rows in source order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Consumes the table, returning its rows.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Returns `true` if the table has no body rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates over rows of a single kind.
    pub fn rows_of_kind(&self, kind: RowKind) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(move |r| r.kind == kind)
    }

    /// Appends a body row built from positional values.
    ///
    /// Returns the values back if their count does not match the schema.
    pub(crate) fn push_row(
        &mut self,
        kind: RowKind,
        values: Vec<String>,
    ) -> std::result::Result<(), Vec<String>> {
        if values.len() != self.fields.len() {
            return Err(values);
        }
        self.rows.push(Row {
            kind,
            fields: Arc::clone(&self.fields),
            values,
        });
        Ok(())
    }
}

/// One body row of a table.
///
/// Values are stored positionally and paired with the owning table's field
/// names on access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    kind: RowKind,
    fields: Arc<[String]>,
    values: Vec<String>,
}

impl Row {
    /// Row kind.
    pub fn kind(&self) -> RowKind {
        self.kind
    }

    /// Returns the value for a field name.
    ///
    /// Field names are not required to be unique; the first match wins.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .position(|f| f == field)
            .map(|i| self.values[i].as_str())
    }

    /// Raw values in schema order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Iterates over `(field, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .zip(self.values.iter())
            .map(|(f, v)| (f.as_str(), v.as_str()))
    }

    /// Number of values, always equal to the table's field count.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the row has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copies the row into a map from field name to value.
    ///
    /// With duplicate field names the last value wins.
    pub fn to_map(&self) -> HashMap<String, String> {
        self.iter()
            .map(|(f, v)| (f.to_string(), v.to_string()))
            .collect()
    }
}
