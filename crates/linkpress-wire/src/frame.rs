//! The on-wire frame value.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::Result;
use crate::link::LinkHeader;

/// A complete link-layer frame: link header + body.
///
/// Cheap to clone; the backing buffer is shared. Frames are values — every
/// rewrite produces a new frame rather than mutating shared state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Bytes,
}

impl Frame {
    /// Wrap raw wire bytes as a frame. No validation is performed.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Build a frame from a link header and the body beneath it.
    pub fn build(link: LinkHeader, body: &[u8]) -> Self {
        let mut buf = BytesMut::with_capacity(LinkHeader::SIZE + body.len());
        link.encode(&mut buf);
        buf.put_slice(body);
        Self {
            bytes: buf.freeze(),
        }
    }

    /// Total wire size of the frame.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Parse the link header without consuming the frame.
    pub fn peek_link(&self) -> Result<LinkHeader> {
        LinkHeader::decode(&self.bytes)
    }

    /// Split the frame into its link header and the body beneath it.
    pub fn split_link(&self) -> Result<(LinkHeader, Bytes)> {
        let link = self.peek_link()?;
        Ok((link, self.bytes.slice(LinkHeader::SIZE..)))
    }

    /// The raw wire bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the frame, yielding the backing buffer.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
