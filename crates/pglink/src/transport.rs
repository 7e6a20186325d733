//! The transport seam between the driver and the wire protocol.
//!
//! Everything protocol-level lives behind [`Transport`]: establishing
//! the link, shipping commands, collecting results, cancellation. The
//! driver never parses protocol messages itself; it orchestrates these
//! primitives and interprets the [`RawResult`]s they hand back.
//!
//! A transport reports results as plain data. Server-side failures are
//! not Rust errors at this level: they arrive as results classified
//! [`ResultStatus::FatalError`] and friends, with the diagnostic fields
//! attached. A transport method returns `Err` only when the command
//! could not be carried out at all.

use pglink_core::error::Result;

use crate::result::ResultStatus;
use crate::types::{Format, WireParam};

/// Health of the underlying link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStatus {
    /// The link is usable.
    Ok,
    /// The link is broken or was never established.
    Bad,
}

/// Metadata for one reported column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawColumn {
    /// Column name as reported by the server.
    pub name: String,
    /// OID of the column's type.
    pub type_oid: u32,
    /// Format the column's values arrive in.
    pub format: Format,
    /// OID of the originating table, or 0 for computed columns.
    pub table_oid: u32,
    /// One-based position within the originating table, or 0.
    pub table_column: i32,
}

impl RawColumn {
    /// A text-format column with no table provenance.
    pub fn new(name: impl Into<String>, type_oid: u32) -> Self {
        Self {
            name: name.into(),
            type_oid,
            format: Format::Text,
            table_oid: 0,
            table_column: 0,
        }
    }

    /// Set the wire format values arrive in.
    #[must_use]
    pub const fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Record which table and column this result column came from.
    #[must_use]
    pub const fn with_table(mut self, table_oid: u32, table_column: i32) -> Self {
        self.table_oid = table_oid;
        self.table_column = table_column;
        self
    }
}

/// One complete result as the transport reported it.
///
/// Cells are `Option<Vec<u8>>`: `None` is SQL NULL, `Some(vec![])` is a
/// real empty value. The two never collapse into each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResult {
    status: ResultStatus,
    columns: Vec<RawColumn>,
    rows: Vec<Vec<Option<Vec<u8>>>>,
    command_tag: String,
    param_types: Vec<u32>,
    error_message: String,
    error_fields: Vec<(u8, String)>,
}

impl RawResult {
    /// An empty result with the given classification.
    #[must_use]
    pub fn new(status: ResultStatus) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Attach column metadata.
    #[must_use]
    pub fn with_columns(mut self, columns: Vec<RawColumn>) -> Self {
        self.columns = columns;
        self
    }

    /// Attach row data. Each row must be as wide as the column list.
    #[must_use]
    pub fn with_rows(mut self, rows: Vec<Vec<Option<Vec<u8>>>>) -> Self {
        self.rows = rows;
        self
    }

    /// Attach the command completion tag (e.g. `"INSERT 0 1"`).
    #[must_use]
    pub fn with_command_tag(mut self, tag: impl Into<String>) -> Self {
        self.command_tag = tag.into();
        self
    }

    /// Attach the parameter type OIDs of a described statement.
    #[must_use]
    pub fn with_param_types(mut self, param_types: Vec<u32>) -> Self {
        self.param_types = param_types;
        self
    }

    /// Attach the primary diagnostic text.
    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    /// Attach one diagnostic field by its single-byte protocol code.
    #[must_use]
    pub fn with_error_field(mut self, code: u8, value: impl Into<String>) -> Self {
        self.error_fields.push((code, value.into()));
        self
    }

    /// The result's classification.
    #[must_use]
    pub const fn status(&self) -> ResultStatus {
        self.status
    }

    #[must_use]
    pub fn columns(&self) -> &[RawColumn] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Option<Vec<u8>>>] {
        &self.rows
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// One cell. Outer `None` means the coordinates are out of range;
    /// inner `None` means SQL NULL.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<Option<&[u8]>> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(|cell| cell.as_deref())
    }

    #[must_use]
    pub fn command_tag(&self) -> &str {
        &self.command_tag
    }

    #[must_use]
    pub fn param_types(&self) -> &[u32] {
        &self.param_types
    }

    /// Primary diagnostic text, empty when the result carries none.
    #[must_use]
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    #[must_use]
    pub fn error_fields(&self) -> &[(u8, String)] {
        &self.error_fields
    }
}

/// The protocol primitive a [`Connection`](crate::Connection) drives.
///
/// Implementations wrap whatever actually speaks the wire protocol. All
/// blocking calls run a command to completion and report exactly one
/// result; the `send_*` family submits without waiting, and
/// [`next_result`](Transport::next_result) then pulls results until it
/// reports `None`.
pub trait Transport {
    /// Current health of the link.
    fn status(&self) -> TransportStatus;

    /// Run a plain command to completion.
    fn exec(&mut self, command: &str) -> Result<RawResult>;

    /// Run a parameterized command ($1, $2, ...) to completion.
    fn exec_params(&mut self, command: &str, params: &[WireParam]) -> Result<RawResult>;

    /// Create a named prepared statement.
    ///
    /// `param_types` pre-declares parameter OIDs; leave it empty to let
    /// the server infer them.
    fn prepare(&mut self, name: &str, command: &str, param_types: &[u32]) -> Result<RawResult>;

    /// Run a previously prepared statement to completion.
    fn exec_prepared(&mut self, name: &str, params: &[WireParam]) -> Result<RawResult>;

    /// Fetch parameter and column metadata for a prepared statement.
    fn describe_prepared(&mut self, name: &str) -> Result<RawResult>;

    /// Fetch column metadata for an open portal.
    fn describe_portal(&mut self, name: &str) -> Result<RawResult>;

    /// Submit a plain command without waiting for results.
    fn send_query(&mut self, command: &str) -> Result<()>;

    /// Submit a parameterized command without waiting for results.
    fn send_query_params(&mut self, command: &str, params: &[WireParam]) -> Result<()>;

    /// Submit a prepared statement without waiting for results.
    fn send_query_prepared(&mut self, name: &str, params: &[WireParam]) -> Result<()>;

    /// Switch the in-flight command to single-row delivery.
    ///
    /// Only valid between a `send_*` call and the first
    /// [`next_result`](Transport::next_result).
    fn set_single_row_mode(&mut self) -> Result<()>;

    /// Pull the next result of the in-flight command.
    ///
    /// `Ok(None)` means the command is complete and the link is ready
    /// for the next one.
    fn next_result(&mut self) -> Result<Option<RawResult>>;

    /// Ask the server to abandon the in-flight command.
    ///
    /// Delivery is best-effort; the remaining results must still be
    /// pulled either way.
    fn request_cancel(&mut self) -> Result<()>;

    /// Tear down and re-establish the link with the same options.
    fn reset(&mut self) -> Result<()>;

    /// The OS descriptor of the underlying socket.
    fn socket(&self) -> Result<i32>;

    /// The link's current diagnostic text, empty when healthy.
    fn error_message(&self) -> String;

    /// Drain notices accumulated since the last call.
    ///
    /// Notices are complete results classified
    /// [`ResultStatus::NonfatalError`].
    fn take_notices(&mut self) -> Vec<RawResult>;
}
