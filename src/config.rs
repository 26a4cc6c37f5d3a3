//! Reader configuration.

/// What to do when a `Header` line repeats the name of the open table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameNameHeader {
    /// Fail with `DecodeError::UnexpectedHeader`.
    #[default]
    Reject,

    /// Seal the open table and start a new one with the same name.
    Restart,
}

/// Options for [`TableReader`](crate::TableReader).
///
/// # Examples
///
/// ```
/// use ibkr_csv::{ReaderOptions, SameNameHeader};
///
/// let options = ReaderOptions::new()
///     .delimiter(b';')
///     .same_name_header(SameNameHeader::Restart);
/// assert_eq!(options.delimiter, b';');
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Field delimiter. Default: `b','`.
    pub delimiter: u8,

    /// Trim whitespace around every field. Default: `false`.
    pub trim: bool,

    /// Handling of a repeated header for the open table. Default: `Reject`.
    pub same_name_header: SameNameHeader,
}

impl ReaderOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        ReaderOptions {
            delimiter: b',',
            trim: false,
            same_name_header: SameNameHeader::Reject,
        }
    }

    /// Sets the field delimiter.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Enables trimming of whitespace around fields.
    pub fn trim(mut self, yes: bool) -> Self {
        self.trim = yes;
        self
    }

    /// Sets the policy for a repeated header of the open table.
    pub fn same_name_header(mut self, policy: SameNameHeader) -> Self {
        self.same_name_header = policy;
        self
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self::new()
    }
}
