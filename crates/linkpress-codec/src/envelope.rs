//! Self-describing envelope shared by all codecs.
//!
//! Every encoded payload starts with a 2-byte magic and the original
//! payload length (u32 LE). The receive side validates both before touching
//! the transformed bytes, so a mistagged or damaged payload is rejected
//! without consulting the link header.

use crate::error::{CodecError, Result};

/// Envelope magic: "LZ" (0x4C 0x5A).
pub const MAGIC: [u8; 2] = [0x4C, 0x5A];

/// Envelope size: magic (2) + original length (4).
pub const HEADER_SIZE: usize = 6;

/// Start an encode buffer: magic + declared original length.
pub fn begin(original_len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_SIZE + original_len / 2);
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&(original_len as u32).to_le_bytes());
    out
}

/// Validate the envelope and return the declared length and the body.
pub fn open(payload: &[u8], max_payload: usize) -> Result<(usize, &[u8])> {
    if payload.len() < HEADER_SIZE {
        return Err(CodecError::CorruptPayload("shorter than envelope header"));
    }
    if payload[..2] != MAGIC {
        return Err(CodecError::CorruptPayload("envelope magic mismatch"));
    }

    let declared = u32::from_le_bytes([payload[2], payload[3], payload[4], payload[5]]) as usize;
    if declared > max_payload {
        return Err(CodecError::PayloadTooLarge {
            size: declared,
            max: max_payload,
        });
    }

    Ok((declared, &payload[HEADER_SIZE..]))
}
