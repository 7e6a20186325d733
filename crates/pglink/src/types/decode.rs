//! Column decoding (wire text → host values).
//!
//! Every function here works on the exact byte slice the protocol
//! reported. Values may contain embedded NUL bytes; nothing assumes
//! C-string termination. NULL handling happens one level up, in
//! [`Codec::decode`](super::Codec::decode): by the time these run, the
//! data is known to be a real (possibly empty) value.

use pglink_core::Error;
use pglink_core::error::ProtocolError;
use pglink_core::value::Value;

use super::oid;

/// How many offending bytes a decode error retains for diagnostics.
const RAW_CAPTURE_LIMIT: usize = 64;

/// Decode a boolean column from text format.
///
/// The server sends `"t"` or `"f"`; anything not starting with `t` reads
/// as false.
#[must_use]
pub fn decode_bool_text(data: &[u8]) -> Value {
    Value::Bool(data.first() == Some(&b't'))
}

/// Decode an integer column from text format.
///
/// Parses signed base-10 text. A value that overflows `i64` promotes to
/// `Double` rather than truncating or wrapping. Results narrow to the
/// column's natural width when they fit (`SmallInt` for int2, `Int` for
/// int4) and widen otherwise. Text that parses as neither integer nor
/// float is a protocol error.
pub fn decode_integer_text(type_oid: u32, data: &[u8]) -> Result<Value, Error> {
    let Ok(text) = std::str::from_utf8(data) else {
        return Err(decode_error(type_oid, data, None));
    };
    if let Ok(parsed) = text.parse::<i64>() {
        return Ok(narrow_integer(type_oid, parsed));
    }
    // Out-of-range integers still parse as floats; garbage does not.
    match text.parse::<f64>() {
        Ok(parsed) => Ok(Value::Double(parsed)),
        Err(err) => Err(decode_error(type_oid, data, Some(Box::new(err)))),
    }
}

/// Decode a floating-point column from text format.
///
/// Accepts the server's special spellings `NaN`, `Infinity`, and
/// `-Infinity`; everything else goes through a locale-independent parse.
pub fn decode_float_text(type_oid: u32, data: &[u8]) -> Result<Value, Error> {
    let Ok(text) = std::str::from_utf8(data) else {
        return Err(decode_error(type_oid, data, None));
    };
    if type_oid == oid::FLOAT4 {
        let parsed = match text {
            "NaN" => f32::NAN,
            "Infinity" => f32::INFINITY,
            "-Infinity" => f32::NEG_INFINITY,
            _ => text
                .parse()
                .map_err(|err| decode_error(type_oid, data, Some(Box::new(err))))?,
        };
        return Ok(Value::Float(parsed));
    }
    let parsed = match text {
        "NaN" => f64::NAN,
        "Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ => text
            .parse()
            .map_err(|err| decode_error(type_oid, data, Some(Box::new(err))))?,
    };
    Ok(Value::Double(parsed))
}

/// The built-in structured decoder for `json` and `jsonb` columns.
///
/// Malformed input is a protocol error: once a decoder claims an OID,
/// falling back to raw text would hide corruption.
pub fn decode_json(data: &[u8]) -> Result<Value, Error> {
    match serde_json::from_slice::<serde_json::Value>(data) {
        Ok(json) => Ok(Value::Json(json)),
        Err(err) => Err(Error::Protocol(ProtocolError {
            message: format!("malformed JSON: {err}"),
            type_oid: None,
            raw_data: Some(capture(data)),
            source: Some(Box::new(err)),
        })),
    }
}

/// The default column decode: the reported bytes unchanged.
///
/// Valid UTF-8 becomes `Text`; anything else is handed over as `Bytes`.
/// This path never fails, whatever OID the server reported.
#[must_use]
pub fn decode_raw(data: &[u8]) -> Value {
    match std::str::from_utf8(data) {
        Ok(text) => Value::Text(text.to_string()),
        Err(_) => Value::Bytes(data.to_vec()),
    }
}

/// Narrow a parsed integer to the column's natural width when it fits.
fn narrow_integer(type_oid: u32, parsed: i64) -> Value {
    match type_oid {
        oid::INT2 => match i16::try_from(parsed) {
            Ok(v) => Value::SmallInt(v),
            Err(_) => match i32::try_from(parsed) {
                Ok(v) => Value::Int(v),
                Err(_) => Value::BigInt(parsed),
            },
        },
        oid::INT4 => match i32::try_from(parsed) {
            Ok(v) => Value::Int(v),
            Err(_) => Value::BigInt(parsed),
        },
        _ => Value::BigInt(parsed),
    }
}

fn decode_error(
    type_oid: u32,
    data: &[u8],
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
) -> Error {
    Error::Protocol(ProtocolError {
        message: format!("malformed {} value", oid::type_name(type_oid)),
        type_oid: Some(type_oid),
        raw_data: Some(capture(data)),
        source,
    })
}

fn capture(data: &[u8]) -> Vec<u8> {
    data[..data.len().min(RAW_CAPTURE_LIMIT)].to_vec()
}
