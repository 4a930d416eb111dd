//! Zlib payload transform via flate2.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::envelope::{self, MAGIC};
use crate::error::{CodecError, Result};
use crate::{Codec, DEFAULT_MAX_PAYLOAD};

/// Reversible zlib transform with a self-describing envelope.
///
/// Encoded payloads carry the envelope magic and the original length ahead
/// of the zlib stream, so the decode side can validate its input
/// independently of the link-header tag. Output is not guaranteed to be
/// smaller than the input; small payloads typically grow.
#[derive(Debug, Clone)]
pub struct DeflateCodec {
    level: Compression,
    max_payload: usize,
}

impl DeflateCodec {
    pub fn new() -> Self {
        Self {
            level: Compression::best(),
            max_payload: DEFAULT_MAX_PAYLOAD,
        }
    }

    /// Set the zlib compression level (0-9, clamped).
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Compression::new(level.min(9));
        self
    }

    /// Bound the size of payloads this codec will encode or reproduce.
    pub fn with_max_payload(mut self, max_payload: usize) -> Self {
        self.max_payload = max_payload;
        self
    }
}

impl Default for DeflateCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for DeflateCodec {
    fn encode(&self, payload: &[u8]) -> Result<Vec<u8>> {
        if payload.len() > self.max_payload {
            return Err(CodecError::PayloadTooLarge {
                size: payload.len(),
                max: self.max_payload,
            });
        }

        let mut out = envelope::begin(payload.len());
        let mut enc = ZlibEncoder::new(&mut out, self.level);
        enc.write_all(payload)
            .and_then(|_| enc.finish().map(|_| ()))
            .map_err(|_| CodecError::CorruptPayload("zlib encode failed"))?;
        Ok(out)
    }

    fn decode(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let (original_len, stream) = envelope::open(payload, self.max_payload)?;

        // Bound the read at one byte past the declared length so an
        // overlong stream is detected instead of silently truncated.
        let mut out = Vec::with_capacity(original_len);
        let mut dec = ZlibDecoder::new(stream).take(original_len as u64 + 1);
        dec.read_to_end(&mut out)
            .map_err(|_| CodecError::CorruptPayload("zlib stream does not inflate"))?;

        if out.len() != original_len {
            return Err(CodecError::CorruptPayload(
                "inflated size does not match declared length",
            ));
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "deflate"
    }
}

/// True if `payload` starts with the encode envelope magic.
pub fn looks_encoded(payload: &[u8]) -> bool {
    payload.len() >= MAGIC.len() && payload[..MAGIC.len()] == MAGIC
}
