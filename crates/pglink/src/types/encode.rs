//! Parameter encoding (host values → wire form).
//!
//! Two encoders cover the two execution paths: the text encoder renders
//! values as the server's text literals, the binary encoder emits native
//! fixed-width representations in network byte order.

use pglink_core::Error;
use pglink_core::error::ParameterError;
use pglink_core::value::Value;

use super::oid;
use crate::config::ByteOrder;

/// Wire format for values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Text format (human-readable strings)
    #[default]
    Text,
    /// Binary format (native binary representation)
    Binary,
}

impl Format {
    /// Get the format code for the wire protocol (0 = text, 1 = binary).
    #[must_use]
    pub const fn code(self) -> i16 {
        match self {
            Format::Text => 0,
            Format::Binary => 1,
        }
    }

    /// Create format from wire protocol code.
    #[must_use]
    pub const fn from_code(code: i16) -> Self {
        match code {
            1 => Format::Binary,
            _ => Format::Text,
        }
    }
}

/// A query parameter in wire form.
///
/// `data` of `None` is the SQL NULL parameter; an empty byte vector is a
/// real zero-length value. The bytes are owned, so the backing storage
/// stays valid until the transport has consumed the send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireParam {
    /// Declared parameter type; `oid::UNKNOWN` lets the server infer it
    pub type_oid: u32,
    /// Wire format of `data`
    pub format: Format,
    /// Encoded bytes; `None` is SQL NULL
    pub data: Option<Vec<u8>>,
}

impl WireParam {
    /// The NULL parameter.
    #[must_use]
    pub const fn null() -> Self {
        Self {
            type_oid: oid::UNKNOWN,
            format: Format::Text,
            data: None,
        }
    }

    /// A text-format parameter.
    #[must_use]
    pub fn text(type_oid: u32, data: impl Into<Vec<u8>>) -> Self {
        Self {
            type_oid,
            format: Format::Text,
            data: Some(data.into()),
        }
    }

    /// A binary-format parameter.
    #[must_use]
    pub fn binary(type_oid: u32, data: impl Into<Vec<u8>>) -> Self {
        Self {
            type_oid,
            format: Format::Binary,
            data: Some(data.into()),
        }
    }

    /// Check if this is the NULL parameter.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.data.is_none()
    }

    /// Length in bytes of the encoded value (0 for NULL).
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.as_ref().map_or(0, Vec::len)
    }

    /// Check if the encoded value carries no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Encode a value as a text-format parameter.
///
/// - `Null` maps to the NULL parameter with an unspecified type
/// - `Bool` renders as `"t"` / `"f"`
/// - integers and floats render as decimal text
/// - `Text` passes its bytes through in text format
/// - `Bytes` passes through in binary format (the caller declared the
///   payload opaque; text-escaping it would corrupt it)
/// - `Json` renders as compact JSON text
/// - `Array` has no wire parameter mapping and is rejected
pub fn encode_text(value: &Value) -> Result<WireParam, Error> {
    let param = match value {
        Value::Null => WireParam::null(),
        Value::Bool(v) => WireParam::text(oid::BOOL, if *v { "t" } else { "f" }),
        Value::SmallInt(v) => WireParam::text(oid::INT2, v.to_string()),
        Value::Int(v) => WireParam::text(oid::INT4, v.to_string()),
        Value::BigInt(v) => WireParam::text(oid::INT8, v.to_string()),
        Value::Float(v) => WireParam::text(oid::FLOAT4, float4_text(*v)),
        Value::Double(v) => WireParam::text(oid::FLOAT8, float8_text(*v)),
        Value::Text(v) => WireParam::text(oid::TEXT, v.as_str()),
        Value::Bytes(v) => WireParam::binary(oid::BYTEA, v.clone()),
        Value::Json(v) => WireParam::text(oid::JSON, v.to_string()),
        Value::Array(_) => return Err(unsupported(value)),
    };
    Ok(param)
}

/// Encode a value as a binary-format parameter.
///
/// Multi-byte values are emitted in network order: native bytes are
/// reversed when `order` is [`ByteOrder::Little`], so `order` must describe
/// the running host (see [`ByteOrder::host`]). Integers map to the wire
/// integer type of their width, floats to their IEEE-754 bit pattern.
/// `Text`, `Bytes`, and `Json` pass their bytes through; `Array` is
/// rejected as in the text encoder.
pub fn encode_binary(value: &Value, order: ByteOrder) -> Result<WireParam, Error> {
    let param = match value {
        Value::Null => WireParam::null(),
        Value::Bool(v) => WireParam::binary(oid::BOOL, vec![u8::from(*v)]),
        Value::SmallInt(v) => WireParam::binary(oid::INT2, network_bytes(v.to_ne_bytes(), order)),
        Value::Int(v) => WireParam::binary(oid::INT4, network_bytes(v.to_ne_bytes(), order)),
        Value::BigInt(v) => WireParam::binary(oid::INT8, network_bytes(v.to_ne_bytes(), order)),
        Value::Float(v) => WireParam::binary(oid::FLOAT4, network_bytes(v.to_ne_bytes(), order)),
        Value::Double(v) => WireParam::binary(oid::FLOAT8, network_bytes(v.to_ne_bytes(), order)),
        Value::Text(v) => WireParam::binary(oid::TEXT, v.as_str()),
        Value::Bytes(v) => WireParam::binary(oid::BYTEA, v.clone()),
        Value::Json(v) => WireParam::binary(oid::JSON, v.to_string()),
        Value::Array(_) => return Err(unsupported(value)),
    };
    Ok(param)
}

/// Reorder native bytes into network (big-endian) order.
fn network_bytes<const N: usize>(native: [u8; N], order: ByteOrder) -> Vec<u8> {
    let mut bytes = native;
    if order.is_little() {
        bytes.reverse();
    }
    bytes.to_vec()
}

fn float4_text(v: f32) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else {
        v.to_string()
    }
}

fn float8_text(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else {
        v.to_string()
    }
}

fn unsupported(value: &Value) -> Error {
    Error::UnsupportedParameterType(ParameterError {
        value_type: value.type_name(),
        index: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_code() {
        assert_eq!(Format::Text.code(), 0);
        assert_eq!(Format::Binary.code(), 1);
        assert_eq!(Format::from_code(0), Format::Text);
        assert_eq!(Format::from_code(1), Format::Binary);
    }

    #[test]
    fn test_null_param() {
        let param = encode_text(&Value::Null).unwrap();
        assert!(param.is_null());
        assert_eq!(param.type_oid, oid::UNKNOWN);
        assert_eq!(param.len(), 0);

        let param = encode_binary(&Value::Null, ByteOrder::host()).unwrap();
        assert!(param.is_null());
    }

    #[test]
    fn test_text_bool() {
        let param = encode_text(&Value::Bool(true)).unwrap();
        assert_eq!(param.type_oid, oid::BOOL);
        assert_eq!(param.format, Format::Text);
        assert_eq!(param.data.as_deref(), Some(b"t".as_slice()));

        let param = encode_text(&Value::Bool(false)).unwrap();
        assert_eq!(param.data.as_deref(), Some(b"f".as_slice()));
    }

    #[test]
    fn test_text_integers() {
        let param = encode_text(&Value::SmallInt(-7)).unwrap();
        assert_eq!(param.type_oid, oid::INT2);
        assert_eq!(param.data.as_deref(), Some(b"-7".as_slice()));

        let param = encode_text(&Value::Int(42)).unwrap();
        assert_eq!(param.type_oid, oid::INT4);
        assert_eq!(param.data.as_deref(), Some(b"42".as_slice()));

        let param = encode_text(&Value::BigInt(i64::MIN)).unwrap();
        assert_eq!(param.type_oid, oid::INT8);
        assert_eq!(
            param.data.as_deref(),
            Some(b"-9223372036854775808".as_slice())
        );
    }

    #[test]
    fn test_text_floats() {
        let param = encode_text(&Value::Double(1.5)).unwrap();
        assert_eq!(param.type_oid, oid::FLOAT8);
        assert_eq!(param.data.as_deref(), Some(b"1.5".as_slice()));

        let param = encode_text(&Value::Double(f64::NAN)).unwrap();
        assert_eq!(param.data.as_deref(), Some(b"NaN".as_slice()));

        let param = encode_text(&Value::Float(f32::INFINITY)).unwrap();
        assert_eq!(param.type_oid, oid::FLOAT4);
        assert_eq!(param.data.as_deref(), Some(b"Infinity".as_slice()));

        let param = encode_text(&Value::Double(f64::NEG_INFINITY)).unwrap();
        assert_eq!(param.data.as_deref(), Some(b"-Infinity".as_slice()));
    }

    #[test]
    fn test_text_string_passthrough() {
        let param = encode_text(&Value::Text("it's".to_string())).unwrap();
        assert_eq!(param.type_oid, oid::TEXT);
        assert_eq!(param.format, Format::Text);
        assert_eq!(param.data.as_deref(), Some(b"it's".as_slice()));

        // Empty string is a zero-length value, not NULL.
        let param = encode_text(&Value::Text(String::new())).unwrap();
        assert!(!param.is_null());
        assert!(param.is_empty());
    }

    #[test]
    fn test_text_bytes_use_binary_format() {
        let payload = vec![0x00, 0xFF, 0x10];
        let param = encode_text(&Value::Bytes(payload.clone())).unwrap();
        assert_eq!(param.type_oid, oid::BYTEA);
        assert_eq!(param.format, Format::Binary);
        assert_eq!(param.data, Some(payload));
    }

    #[test]
    fn test_text_json_compact() {
        let json = serde_json::json!({"a": 1, "b": [true, null]});
        let param = encode_text(&Value::Json(json)).unwrap();
        assert_eq!(param.type_oid, oid::JSON);
        assert_eq!(
            param.data.as_deref(),
            Some(br#"{"a":1,"b":[true,null]}"#.as_slice())
        );
    }

    #[test]
    fn test_array_rejected() {
        let array = Value::Array(vec![Value::Int(1)]);

        let err = encode_text(&array).unwrap_err();
        assert!(matches!(err, Error::UnsupportedParameterType(_)));
        assert!(err.to_string().contains("ARRAY"));

        let err = encode_binary(&array, ByteOrder::host()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedParameterType(_)));
    }

    #[test]
    fn test_binary_bool() {
        let param = encode_binary(&Value::Bool(true), ByteOrder::host()).unwrap();
        assert_eq!(param.format, Format::Binary);
        assert_eq!(param.data.as_deref(), Some([1u8].as_slice()));

        let param = encode_binary(&Value::Bool(false), ByteOrder::host()).unwrap();
        assert_eq!(param.data.as_deref(), Some([0u8].as_slice()));
    }

    #[test]
    fn test_binary_int_network_order() {
        // The same bytes must come out on any host.
        let param = encode_binary(&Value::Int(1), ByteOrder::host()).unwrap();
        assert_eq!(param.type_oid, oid::INT4);
        assert_eq!(param.data.as_deref(), Some([0, 0, 0, 1].as_slice()));

        let param = encode_binary(&Value::SmallInt(258), ByteOrder::host()).unwrap();
        assert_eq!(param.type_oid, oid::INT2);
        assert_eq!(param.data.as_deref(), Some([1, 2].as_slice()));

        let param = encode_binary(&Value::BigInt(-1), ByteOrder::host()).unwrap();
        assert_eq!(param.type_oid, oid::INT8);
        assert_eq!(param.data.as_deref(), Some([0xFF; 8].as_slice()));
    }

    #[test]
    fn test_binary_floats_bit_pattern() {
        let param = encode_binary(&Value::Float(1.5), ByteOrder::host()).unwrap();
        assert_eq!(param.type_oid, oid::FLOAT4);
        assert_eq!(param.data, Some(1.5f32.to_be_bytes().to_vec()));

        let param = encode_binary(&Value::Double(-2.25), ByteOrder::host()).unwrap();
        assert_eq!(param.type_oid, oid::FLOAT8);
        assert_eq!(param.data, Some((-2.25f64).to_be_bytes().to_vec()));
    }

    #[test]
    fn test_binary_passthrough() {
        let param = encode_binary(&Value::Text("abc".to_string()), ByteOrder::host()).unwrap();
        assert_eq!(param.type_oid, oid::TEXT);
        assert_eq!(param.data.as_deref(), Some(b"abc".as_slice()));

        let param =
            encode_binary(&Value::Bytes(vec![9, 8, 7]), ByteOrder::host()).unwrap();
        assert_eq!(param.type_oid, oid::BYTEA);
        assert_eq!(param.data.as_deref(), Some([9, 8, 7].as_slice()));
    }
}
