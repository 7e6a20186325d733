//! Core types for the pglink driver.
//!
//! This crate provides the foundational pieces shared by the driver:
//!
//! - `Value` for dynamically-typed host values
//! - The error taxonomy (`Error`, `Result`, diagnostic field lookup)
//! - `Row` and `ColumnInfo` for decoded result access

pub mod error;
pub mod row;
pub mod value;

pub use error::{
    ConnectionError, ConnectionErrorKind, DiagField, Error, ParameterError, ProtocolError, Result,
    ResultError, ResultErrorKind, TypeError,
};
pub use row::{ColumnInfo, FromValue, Row};
pub use value::Value;
