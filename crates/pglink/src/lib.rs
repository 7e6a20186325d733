//! PostgreSQL driver core for pglink.
//!
//! `pglink` is the **driver layer**: it turns a protocol-level
//! [`Transport`] into a typed query interface with blocking execution,
//! prepared statements, single-row streaming, and a value codec that
//! maps reported columns to [`Value`]s by type OID.
//!
//! # Role In The Architecture
//!
//! - Owns connection lifecycle: connect, reset, cancel, idempotent close
//! - Runs commands and wraps every outcome as a classified [`PgResult`]
//! - Streams large results one row at a time with a strict drain rule
//! - Encodes parameters and decodes columns through a pluggable [`Codec`]
//!
//! The wire protocol itself is out of scope. Anything that can run
//! commands and report classified results can sit behind [`Transport`];
//! the driver supplies everything above it.
//!
//! # Error Model
//!
//! Server-reported failures are data: execution returns the
//! error-classified result and [`PgResult::check`] converts it into
//! [`Error::Result`] on demand. A Rust error from an execution method
//! means the command could not be carried out at all.
//!
//! # Example
//!
//! ```rust,ignore
//! use pglink::{CodecOptions, Connection, RowControl};
//!
//! let mut conn = Connection::connect(transport, CodecOptions::new().build())?;
//!
//! let result = conn.exec("SELECT id, note FROM items")?.check()?;
//! for row in result.rows()? {
//!     println!("{:?}", row.get_by_name("note"));
//! }
//!
//! conn.exec_streaming("SELECT n FROM generate_series(1, 100000) n", &[], |result| {
//!     let n = result.value(0, 0)?;
//!     Ok(if n.as_i64() < Some(10) { RowControl::Continue } else { RowControl::Cancel })
//! })?;
//! ```

pub mod config;
pub mod connection;
mod executor;
#[cfg(test)]
mod mock;
pub mod result;
pub mod stream;
pub mod transport;
pub mod types;

pub use config::{ByteOrder, CodecOptions};
pub use connection::{Connection, NoticeCallback};
pub use result::{PgResult, ResultStatus};
pub use stream::RowControl;
pub use transport::{RawColumn, RawResult, Transport, TransportStatus};
pub use types::{Codec, Format, WireParam};

pub use pglink_core::{ColumnInfo, DiagField, Error, FromValue, Result, Row, Value};
