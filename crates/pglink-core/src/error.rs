//! Error types for pglink operations.

use std::fmt;

/// The primary error type for all pglink operations.
#[derive(Debug)]
pub enum Error {
    /// Transport-level failures: connect, reset, socket, cancel, or a command
    /// that could not be delivered at all
    Connection(ConnectionError),
    /// Operation attempted on a connection that has been closed
    ClosedStream,
    /// Server-reported result errors (empty query, bad response, nonfatal, fatal)
    Result(ResultError),
    /// Encode-side: a host value kind with no wire parameter mapping
    UnsupportedParameterType(ParameterError),
    /// Decode-side: a value malformed for its declared wire type
    Protocol(ProtocolError),
    /// Type conversion errors when extracting typed values
    Type(TypeError),
}

#[derive(Debug)]
pub struct ConnectionError {
    pub kind: ConnectionErrorKind,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    /// Failed to establish a connection
    Connect,
    /// Failed to re-establish the connection in place
    Reset,
    /// No usable socket descriptor
    Socket,
    /// Cancel request could not be sent
    Cancel,
    /// A command could not be delivered to the server
    Command,
}

impl ConnectionError {
    /// Create a connection error from the transport's diagnostic text.
    pub fn new(kind: ConnectionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying OS-level error.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

/// A server-reported error captured from a classified result.
///
/// These are data, not faults: blocking execution returns the classified
/// result and the host decides whether to convert it into this error.
#[derive(Debug)]
pub struct ResultError {
    pub kind: ResultErrorKind,
    /// Primary diagnostic text as the server sent it
    pub message: String,
    /// Diagnostic fields keyed by their single-byte protocol codes
    pub fields: Vec<(u8, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultErrorKind {
    /// The query string was empty
    EmptyQuery,
    /// The server's response was not understood
    BadResponse,
    /// A nonfatal error (notice or warning severity)
    NonFatal,
    /// A fatal error; the command failed
    Fatal,
}

impl ResultErrorKind {
    pub const fn label(self) -> &'static str {
        match self {
            ResultErrorKind::EmptyQuery => "empty query",
            ResultErrorKind::BadResponse => "bad response",
            ResultErrorKind::NonFatal => "nonfatal error",
            ResultErrorKind::Fatal => "fatal error",
        }
    }
}

/// Diagnostic field identifiers for server errors and notices.
///
/// The discriminants are the wire protocol's single-byte field codes and
/// must not be renumbered. Every field is optional; the server sends only
/// what applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DiagField {
    Severity = b'S',
    SeverityNonlocalized = b'V',
    Sqlstate = b'C',
    MessagePrimary = b'M',
    MessageDetail = b'D',
    MessageHint = b'H',
    StatementPosition = b'P',
    InternalPosition = b'p',
    InternalQuery = b'q',
    Context = b'W',
    SchemaName = b's',
    TableName = b't',
    ColumnName = b'c',
    DatatypeName = b'd',
    ConstraintName = b'n',
    SourceFile = b'F',
    SourceLine = b'L',
    SourceFunction = b'R',
}

impl DiagField {
    /// The single-byte protocol code for this field.
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl ResultError {
    /// Look up a diagnostic field; `None` when the server did not supply it.
    pub fn field(&self, field: DiagField) -> Option<&str> {
        self.field_raw(field.code())
    }

    /// Look up a diagnostic field by its raw protocol code.
    pub fn field_raw(&self, code: u8) -> Option<&str> {
        self.fields
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, v)| v.as_str())
    }

    /// The SQLSTATE code, when supplied (e.g. "23505" for unique violation).
    pub fn sqlstate(&self) -> Option<&str> {
        self.field(DiagField::Sqlstate)
    }
}

/// Encode-side rejection of a parameter value.
#[derive(Debug)]
pub struct ParameterError {
    /// `Value::type_name()` of the rejected parameter
    pub value_type: &'static str,
    /// Position in the bind list, when known
    pub index: Option<usize>,
}

#[derive(Debug)]
pub struct ProtocolError {
    pub message: String,
    /// Wire type identifier of the column being decoded, when known
    pub type_oid: Option<u32>,
    /// The offending bytes, when retaining them aids debugging
    pub raw_data: Option<Vec<u8>>,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub column: Option<String>,
    pub rust_type: Option<&'static str>,
}

impl Error {
    /// Is this the closed-connection error?
    pub const fn is_closed(&self) -> bool {
        matches!(self, Error::ClosedStream)
    }

    /// Is this a transport-level error that likely requires reconnection?
    pub const fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Get SQLSTATE if available (e.g., "23505" for unique violation)
    pub fn sqlstate(&self) -> Option<&str> {
        match self {
            Error::Result(e) => e.sqlstate(),
            _ => None,
        }
    }

    /// The server-reported result classification behind this error, if any.
    pub fn result_kind(&self) -> Option<ResultErrorKind> {
        match self {
            Error::Result(e) => Some(e.kind),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Connection(e) => write!(f, "Connection error: {}", e.message),
            // The exact text host bindings match on for closed-handle faults
            Error::ClosedStream => write!(f, "closed stream"),
            Error::Result(e) => write!(f, "{}", e),
            Error::UnsupportedParameterType(e) => write!(f, "{}", e),
            Error::Protocol(e) => write!(f, "Protocol error: {}", e.message),
            Error::Type(e) => {
                if let Some(col) = &e.column {
                    write!(
                        f,
                        "Type error in column '{}': expected {}, found {}",
                        col, e.expected, e.actual
                    )
                } else {
                    write!(f, "Type error: expected {}, found {}", e.expected, e.actual)
                }
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Connection(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Protocol(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for ResultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Server messages arrive newline-terminated
        let message = self.message.trim_end();
        if message.is_empty() {
            write!(f, "{}", self.kind.label())
        } else if let Some(state) = self.sqlstate() {
            write!(f, "{}: {} (SQLSTATE {})", self.kind.label(), message, state)
        } else {
            write!(f, "{}: {}", self.kind.label(), message)
        }
    }
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(index) = self.index {
            write!(
                f,
                "unsupported parameter type {} at index {}",
                self.value_type, index
            )
        } else {
            write!(f, "unsupported parameter type {}", self.value_type)
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(col) = &self.column {
            write!(
                f,
                "expected {} for column '{}', found {}",
                self.expected, col, self.actual
            )
        } else {
            write!(f, "expected {}, found {}", self.expected, self.actual)
        }
    }
}

impl From<ConnectionError> for Error {
    fn from(err: ConnectionError) -> Self {
        Error::Connection(err)
    }
}

impl From<ResultError> for Error {
    fn from(err: ResultError) -> Self {
        Error::Result(err)
    }
}

impl From<ParameterError> for Error {
    fn from(err: ParameterError) -> Self {
        Error::UnsupportedParameterType(err)
    }
}

impl From<ProtocolError> for Error {
    fn from(err: ProtocolError) -> Self {
        Error::Protocol(err)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

/// Result type alias for pglink operations.
pub type Result<T> = std::result::Result<T, Error>;
