//! Result classification and decoded access.
//!
//! A [`PgResult`] pairs one [`RawResult`] with the connection's codec.
//! Classification is data: execution hands back error-classified
//! results instead of failing, and [`PgResult::check`] is the explicit
//! step that converts them into [`Error::Result`]. Cell access decodes
//! on demand; nothing is decoded until asked for.

use std::fmt;
use std::sync::Arc;

use pglink_core::error::ProtocolError;
use pglink_core::{ColumnInfo, DiagField, Error, Result, ResultError, ResultErrorKind, Row, Value};

use crate::transport::RawResult;
use crate::types::{Codec, Format};

/// Classification of a completed result.
///
/// The discriminants are wire-facing codes shared with host bindings
/// and must not be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum ResultStatus {
    /// The submitted command string was empty.
    EmptyQuery = 0,
    /// A command that returns no rows completed.
    #[default]
    CommandOk = 1,
    /// A query completed and all of its rows are present.
    TuplesOk = 2,
    /// Copy-out transfer started.
    CopyOut = 3,
    /// Copy-in transfer started.
    CopyIn = 4,
    /// The server's response was not understood.
    BadResponse = 5,
    /// A notice or warning.
    NonfatalError = 6,
    /// The command failed.
    FatalError = 7,
    /// Copy-both transfer started.
    CopyBoth = 8,
    /// Exactly one row of a single-row-mode query.
    SingleTuple = 9,
}

impl ResultStatus {
    /// The numeric code host bindings see.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Map a numeric code back to a status.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(ResultStatus::EmptyQuery),
            1 => Some(ResultStatus::CommandOk),
            2 => Some(ResultStatus::TuplesOk),
            3 => Some(ResultStatus::CopyOut),
            4 => Some(ResultStatus::CopyIn),
            5 => Some(ResultStatus::BadResponse),
            6 => Some(ResultStatus::NonfatalError),
            7 => Some(ResultStatus::FatalError),
            8 => Some(ResultStatus::CopyBoth),
            9 => Some(ResultStatus::SingleTuple),
            _ => None,
        }
    }

    /// Human-readable name, aligned with the error labels where the
    /// status is error-like.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ResultStatus::EmptyQuery => "empty query",
            ResultStatus::CommandOk => "command ok",
            ResultStatus::TuplesOk => "tuples ok",
            ResultStatus::CopyOut => "copy out",
            ResultStatus::CopyIn => "copy in",
            ResultStatus::BadResponse => "bad response",
            ResultStatus::NonfatalError => "nonfatal error",
            ResultStatus::FatalError => "fatal error",
            ResultStatus::CopyBoth => "copy both",
            ResultStatus::SingleTuple => "single tuple",
        }
    }

    /// Does this classification count as an error?
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(
            self,
            ResultStatus::EmptyQuery
                | ResultStatus::BadResponse
                | ResultStatus::NonfatalError
                | ResultStatus::FatalError
        )
    }

    /// Does this result carry row data?
    #[must_use]
    pub const fn returns_rows(self) -> bool {
        matches!(self, ResultStatus::TuplesOk | ResultStatus::SingleTuple)
    }

    /// The error kind this status converts into, if it is error-like.
    #[must_use]
    pub const fn error_kind(self) -> Option<ResultErrorKind> {
        match self {
            ResultStatus::EmptyQuery => Some(ResultErrorKind::EmptyQuery),
            ResultStatus::BadResponse => Some(ResultErrorKind::BadResponse),
            ResultStatus::NonfatalError => Some(ResultErrorKind::NonFatal),
            ResultStatus::FatalError => Some(ResultErrorKind::Fatal),
            _ => None,
        }
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One complete result, ready to decode.
pub struct PgResult {
    raw: RawResult,
    codec: Arc<Codec>,
}

impl PgResult {
    pub(crate) fn new(raw: RawResult, codec: Arc<Codec>) -> Self {
        Self { raw, codec }
    }

    /// The result's classification.
    #[must_use]
    pub const fn status(&self) -> ResultStatus {
        self.raw.status()
    }

    /// Shorthand for `status().is_error()`.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.status().is_error()
    }

    /// Convert an error-classified result into [`Error::Result`].
    ///
    /// Results that are not error-like pass through unchanged, so this
    /// chains naturally after execution when the caller wants failures
    /// raised rather than inspected.
    pub fn check(self) -> Result<Self> {
        match self.status().error_kind() {
            None => Ok(self),
            Some(kind) => Err(Error::Result(ResultError {
                kind,
                message: self.raw.error_message().to_string(),
                fields: self.raw.error_fields().to_vec(),
            })),
        }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.raw.row_count()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.raw.column_count()
    }

    /// Name of a column, `None` when out of range.
    #[must_use]
    pub fn column_name(&self, column: usize) -> Option<&str> {
        self.raw.columns().get(column).map(|c| c.name.as_str())
    }

    /// Position of the first column with this name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.raw.columns().iter().position(|c| c.name == name)
    }

    /// Type OID of a column.
    #[must_use]
    pub fn column_type(&self, column: usize) -> Option<u32> {
        self.raw.columns().get(column).map(|c| c.type_oid)
    }

    /// Wire format of a column.
    #[must_use]
    pub fn column_format(&self, column: usize) -> Option<Format> {
        self.raw.columns().get(column).map(|c| c.format)
    }

    /// OID of the table a column came from; `None` for computed columns.
    #[must_use]
    pub fn column_table(&self, column: usize) -> Option<u32> {
        self.raw
            .columns()
            .get(column)
            .map(|c| c.table_oid)
            .filter(|oid| *oid != 0)
    }

    /// One-based position of a column within its originating table.
    #[must_use]
    pub fn column_table_column(&self, column: usize) -> Option<i32> {
        self.raw
            .columns()
            .get(column)
            .map(|c| c.table_column)
            .filter(|position| *position != 0)
    }

    /// Number of parameters of a described prepared statement.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.raw.param_types().len()
    }

    /// Type OID of a described parameter.
    #[must_use]
    pub fn param_type(&self, index: usize) -> Option<u32> {
        self.raw.param_types().get(index).copied()
    }

    /// Command completion tag, empty when there is none.
    #[must_use]
    pub fn command_tag(&self) -> &str {
        self.raw.command_tag()
    }

    /// Is this cell SQL NULL? Out-of-range coordinates read as NULL.
    #[must_use]
    pub fn is_null(&self, row: usize, column: usize) -> bool {
        self.raw
            .cell(row, column)
            .is_none_or(|cell| cell.is_none())
    }

    /// The undecoded bytes of a cell; `None` for NULL or out of range.
    #[must_use]
    pub fn raw_value(&self, row: usize, column: usize) -> Option<&[u8]> {
        self.raw.cell(row, column).flatten()
    }

    /// Decode one cell.
    ///
    /// Out-of-range coordinates are a protocol error, unlike the
    /// forgiving [`is_null`](PgResult::is_null) probe.
    pub fn value(&self, row: usize, column: usize) -> Result<Value> {
        let Some(cell) = self.raw.cell(row, column) else {
            return Err(access_error(format!(
                "no cell at row {row}, column {column}"
            )));
        };
        let Some(info) = self.raw.columns().get(column) else {
            return Err(access_error(format!("no metadata for column {column}")));
        };
        self.codec.decode(info.type_oid, info.format, cell)
    }

    /// Decode every cell into [`Row`]s sharing one column table.
    pub fn rows(&self) -> Result<Vec<Row>> {
        let names = self.raw.columns().iter().map(|c| c.name.clone()).collect();
        let columns = Arc::new(ColumnInfo::new(names));
        let mut rows = Vec::with_capacity(self.raw.row_count());
        for row in 0..self.raw.row_count() {
            let mut values = Vec::with_capacity(self.raw.column_count());
            for column in 0..self.raw.column_count() {
                values.push(self.value(row, column)?);
            }
            rows.push(Row::with_columns(Arc::clone(&columns), values));
        }
        Ok(rows)
    }

    /// Primary diagnostic text, empty when the result carries none.
    #[must_use]
    pub fn error_message(&self) -> &str {
        self.raw.error_message()
    }

    /// One diagnostic field, when the server supplied it.
    #[must_use]
    pub fn error_field(&self, field: DiagField) -> Option<&str> {
        self.error_field_raw(field.code())
    }

    /// One diagnostic field by its raw protocol code.
    #[must_use]
    pub fn error_field_raw(&self, code: u8) -> Option<&str> {
        self.raw
            .error_fields()
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, v)| v.as_str())
    }

    /// The transport-level result behind this wrapper.
    #[must_use]
    pub const fn raw(&self) -> &RawResult {
        &self.raw
    }
}

impl fmt::Debug for PgResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgResult")
            .field("status", &self.status())
            .field("rows", &self.row_count())
            .field("columns", &self.column_count())
            .finish_non_exhaustive()
    }
}

fn access_error(message: String) -> Error {
    Error::Protocol(ProtocolError {
        message,
        type_oid: None,
        raw_data: None,
        source: None,
    })
}
