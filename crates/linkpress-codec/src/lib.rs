//! Reversible payload transforms for linkpress frames.
//!
//! A codec maps a byte sequence to a self-describing encoded form and back:
//! `decode(encode(p)) == p` for every payload up to the configured maximum.
//! Encoding never promises to shrink the payload — zlib framing makes small
//! payloads grow — so callers must size buffers from the encoded length.

pub mod deflate;
pub mod envelope;
pub mod error;
pub mod null;

pub use deflate::{looks_encoded, DeflateCodec};
pub use error::{CodecError, Result};
pub use null::NullCodec;

/// Default maximum payload size: 64 KiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 64 * 1024;

/// A reversible transform over a byte sequence.
///
/// Object safe so devices can hold `Box<dyn Codec>` and swap transforms
/// without recompiling the framing pipeline.
pub trait Codec {
    /// Transform `payload` into its encoded form.
    fn encode(&self, payload: &[u8]) -> Result<Vec<u8>>;

    /// Recover the original payload from `encode` output.
    ///
    /// Fails with [`CodecError::CorruptPayload`] if the input was not
    /// produced by `encode` (truncated, mangled, or foreign bytes).
    fn decode(&self, payload: &[u8]) -> Result<Vec<u8>>;

    /// Short codec name for traces.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codecs_are_object_safe() {
        let codecs: Vec<Box<dyn Codec>> =
            vec![Box::new(DeflateCodec::new()), Box::new(NullCodec::new())];
        for codec in &codecs {
            let encoded = codec.encode(b"swappable").unwrap();
            assert_eq!(codec.decode(&encoded).unwrap(), b"swappable");
        }
    }

    #[test]
    fn cross_codec_decode_fails_cleanly() {
        // A null-encoded body is not a zlib stream; the deflate codec must
        // report corruption, not panic or return garbage.
        let null = NullCodec::new();
        let deflate = DeflateCodec::new();
        let encoded = null.encode(&[0x55; 80]).unwrap();
        assert!(deflate.decode(&encoded).is_err());
    }
}
