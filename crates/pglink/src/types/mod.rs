//! PostgreSQL type mapping between host values and wire form.
//!
//! This module provides:
//! - OID constants for the built-in types the driver understands
//! - Encoding of [`Value`]s into wire parameters (text and binary)
//! - Decoding of reported columns into [`Value`]s, with a registry of
//!   structured decoders for types that deserve more than raw text
//!
//! # Example
//!
//! ```rust,ignore
//! use pglink::types::{Codec, Format, oid};
//!
//! let codec = Codec::new();
//! let value = codec.decode(oid::INT4, Format::Text, Some(b"42"))?;
//! assert_eq!(value, Value::Int(42));
//! ```

pub mod decode;
pub mod encode;
pub mod oid;

use std::collections::HashMap;
use std::fmt;

use pglink_core::error::Result;
use pglink_core::value::Value;

use crate::config::ByteOrder;

pub use decode::{decode_json, decode_raw};
pub use encode::{Format, WireParam, encode_binary, encode_text};

type StructuredDecoder = Box<dyn Fn(&[u8]) -> Result<Value> + Send + Sync>;

/// The value codec attached to a connection.
///
/// Holds the byte order used for binary parameter encoding and the
/// structured decoders consulted for text-format columns whose OID has
/// no built-in mapping. Out of the box `json` and `jsonb` decode into
/// [`Value::Json`]; everything else unclaimed falls back to
/// [`decode_raw`].
pub struct Codec {
    byte_order: ByteOrder,
    decoders: HashMap<u32, StructuredDecoder>,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec {
    /// Create a codec with host byte order and the built-in JSON decoders.
    #[must_use]
    pub fn new() -> Self {
        Self::configured(ByteOrder::host(), true)
    }

    pub(crate) fn configured(byte_order: ByteOrder, structured_json: bool) -> Self {
        let mut codec = Self {
            byte_order,
            decoders: HashMap::new(),
        };
        if structured_json {
            codec.register_decoder(oid::JSON, decode::decode_json);
            codec.register_decoder(oid::JSONB, decode::decode_json);
        }
        codec
    }

    /// The byte order binary parameters are encoded with.
    #[must_use]
    pub const fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Register a structured decoder for an OID, replacing any existing one.
    ///
    /// A registered decoder owns its OID completely: if it fails, the
    /// column fails to decode rather than degrading to raw text.
    pub fn register_decoder<F>(&mut self, type_oid: u32, decoder: F)
    where
        F: Fn(&[u8]) -> Result<Value> + Send + Sync + 'static,
    {
        self.decoders.insert(type_oid, Box::new(decoder));
    }

    /// Is a structured decoder registered for this OID?
    #[must_use]
    pub fn has_decoder(&self, type_oid: u32) -> bool {
        self.decoders.contains_key(&type_oid)
    }

    /// Encode a parameter in text format.
    pub fn encode_text(&self, value: &Value) -> Result<WireParam> {
        encode::encode_text(value)
    }

    /// Encode a parameter in binary format using this codec's byte order.
    pub fn encode_binary(&self, value: &Value) -> Result<WireParam> {
        encode::encode_binary(value, self.byte_order)
    }

    /// Decode one reported column into a host value.
    ///
    /// `data` is `None` exactly when the server reported SQL NULL; an
    /// empty slice is a real empty value and decodes as such. Binary
    /// format columns pass through as [`Value::Bytes`] unchanged.
    pub fn decode(&self, type_oid: u32, format: Format, data: Option<&[u8]>) -> Result<Value> {
        let Some(data) = data else {
            return Ok(Value::Null);
        };
        if format == Format::Binary {
            return Ok(Value::Bytes(data.to_vec()));
        }
        match type_oid {
            oid::BOOL => Ok(decode::decode_bool_text(data)),
            oid::INT2 | oid::INT4 | oid::INT8 => decode::decode_integer_text(type_oid, data),
            oid::FLOAT4 | oid::FLOAT8 => decode::decode_float_text(type_oid, data),
            _ => match self.decoders.get(&type_oid) {
                Some(decoder) => decoder(data).map_err(|err| tag_type_oid(err, type_oid)),
                None => Ok(decode::decode_raw(data)),
            },
        }
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("byte_order", &self.byte_order)
            .field("decoders", &self.decoders.len())
            .finish()
    }
}

/// Stamp the column's OID onto a protocol error that lacks one.
fn tag_type_oid(err: pglink_core::Error, type_oid: u32) -> pglink_core::Error {
    match err {
        pglink_core::Error::Protocol(mut protocol) => {
            protocol.type_oid.get_or_insert(type_oid);
            pglink_core::Error::Protocol(protocol)
        }
        other => other,
    }
}
