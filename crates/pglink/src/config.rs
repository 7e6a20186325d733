//! Codec configuration.
//!
//! A [`Codec`] is built once, up front, from [`CodecOptions`] and then
//! shared by a connection and every result it produces. The only knobs
//! are the host byte order used for binary parameter encoding and
//! whether JSON columns decode structurally.

use crate::types::Codec;

/// Byte order of the host producing binary parameters.
///
/// Binary encoding always emits network (big-endian) byte order on the
/// wire; this setting tells the codec which way the host's native
/// integers lie so it knows whether to swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Big,
    Little,
}

impl Default for ByteOrder {
    fn default() -> Self {
        Self::host()
    }
}

impl ByteOrder {
    /// The byte order this build is running on.
    #[must_use]
    pub const fn host() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        }
    }

    #[must_use]
    pub const fn is_little(self) -> bool {
        matches!(self, ByteOrder::Little)
    }

    #[must_use]
    pub const fn is_big(self) -> bool {
        matches!(self, ByteOrder::Big)
    }
}

/// Builder for a [`Codec`].
///
/// # Example
///
/// ```rust,ignore
/// use pglink::config::{ByteOrder, CodecOptions};
///
/// let codec = CodecOptions::new()
///     .byte_order(ByteOrder::host())
///     .structured_json(false)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct CodecOptions {
    byte_order: ByteOrder,
    structured_json: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            byte_order: ByteOrder::host(),
            structured_json: true,
        }
    }
}

impl CodecOptions {
    /// Create options with the defaults: host byte order, structured JSON on.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host byte order used when encoding binary parameters.
    #[must_use]
    pub const fn byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Enable or disable the built-in `json`/`jsonb` decoders.
    ///
    /// When disabled, JSON columns arrive as raw text like any other
    /// unregistered type.
    #[must_use]
    pub const fn structured_json(mut self, structured_json: bool) -> Self {
        self.structured_json = structured_json;
        self
    }

    /// Build the codec.
    #[must_use]
    pub fn build(self) -> Codec {
        Codec::configured(self.byte_order, self.structured_json)
    }
}
