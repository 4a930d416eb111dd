//! Identity transform, useful for tests and ratio baselines.

use crate::envelope;
use crate::error::{CodecError, Result};
use crate::{Codec, DEFAULT_MAX_PAYLOAD};

/// A codec that stores the payload verbatim inside the standard envelope.
///
/// Satisfies the same contract as the real transforms — including the
/// decode-side validation — while guaranteeing the "encoded" output is
/// always envelope-size larger than the input.
#[derive(Debug, Clone)]
pub struct NullCodec {
    max_payload: usize,
}

impl NullCodec {
    pub fn new() -> Self {
        Self {
            max_payload: DEFAULT_MAX_PAYLOAD,
        }
    }

    pub fn with_max_payload(mut self, max_payload: usize) -> Self {
        self.max_payload = max_payload;
        self
    }
}

impl Default for NullCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for NullCodec {
    fn encode(&self, payload: &[u8]) -> Result<Vec<u8>> {
        if payload.len() > self.max_payload {
            return Err(CodecError::PayloadTooLarge {
                size: payload.len(),
                max: self.max_payload,
            });
        }
        let mut out = envelope::begin(payload.len());
        out.extend_from_slice(payload);
        Ok(out)
    }

    fn decode(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let (declared, body) = envelope::open(payload, self.max_payload)?;
        if body.len() != declared {
            return Err(CodecError::CorruptPayload(
                "body length does not match declared length",
            ));
        }
        Ok(body.to_vec())
    }

    fn name(&self) -> &'static str {
        "null"
    }
}
