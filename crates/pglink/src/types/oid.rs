//! PostgreSQL type object identifiers (OIDs).
//!
//! The server reports every column and parameter type as a numeric OID.
//! These values are assigned by the protocol and never renumbered; the
//! decoder dispatches on them directly.

/// Boolean type
pub const BOOL: u32 = 16;

/// Byte array (bytea)
pub const BYTEA: u32 = 17;

/// Single character (char)
pub const CHAR: u32 = 18;

/// Name type (internal, 63-byte identifier)
pub const NAME: u32 = 19;

/// 8-byte signed integer (int8/bigint)
pub const INT8: u32 = 20;

/// 2-byte signed integer (int2/smallint)
pub const INT2: u32 = 21;

/// 4-byte signed integer (int4/integer)
pub const INT4: u32 = 23;

/// Variable-length text (text)
pub const TEXT: u32 = 25;

/// Object identifier (oid)
pub const OID: u32 = 26;

/// JSON (text-based)
pub const JSON: u32 = 114;

/// XML data
pub const XML: u32 = 142;

/// Single-precision floating point (float4/real)
pub const FLOAT4: u32 = 700;

/// Double-precision floating point (float8/double precision)
pub const FLOAT8: u32 = 701;

/// Unknown type (untyped literals and NULL parameters)
pub const UNKNOWN: u32 = 705;

/// Fixed-length character (bpchar)
pub const BPCHAR: u32 = 1042;

/// Variable-length character with limit (varchar)
pub const VARCHAR: u32 = 1043;

/// Arbitrary precision numeric
pub const NUMERIC: u32 = 1700;

/// JSONB (binary JSON)
pub const JSONB: u32 = 3802;

/// Get a human-readable name for a type OID.
#[must_use]
pub const fn type_name(type_oid: u32) -> &'static str {
    match type_oid {
        BOOL => "bool",
        BYTEA => "bytea",
        CHAR => "char",
        NAME => "name",
        INT8 => "int8",
        INT2 => "int2",
        INT4 => "int4",
        TEXT => "text",
        OID => "oid",
        JSON => "json",
        XML => "xml",
        FLOAT4 => "float4",
        FLOAT8 => "float8",
        BPCHAR => "bpchar",
        VARCHAR => "varchar",
        NUMERIC => "numeric",
        JSONB => "jsonb",
        UNKNOWN => "unknown",
        _ => "unknown",
    }
}

/// Check if the OID is one of the integer types.
#[must_use]
pub const fn is_integer(type_oid: u32) -> bool {
    matches!(type_oid, INT2 | INT4 | INT8)
}

/// Check if the OID is one of the floating-point types.
#[must_use]
pub const fn is_float(type_oid: u32) -> bool {
    matches!(type_oid, FLOAT4 | FLOAT8)
}
