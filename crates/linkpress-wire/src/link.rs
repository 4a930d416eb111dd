//! Link header and the closed protocol-tag set.
//!
//! The link header is a 2-byte big-endian protocol tag, PPP style. The tag
//! space is closed: four values, one plain/compressed pair per upper-layer
//! protocol family. The tag alone determines both the upper-layer protocol
//! and whether the payload must be decoded on receipt.

use bytes::BufMut;

use crate::error::{Result, WireError};

/// Plain network-protocol (IPv4) tag.
pub const TAG_NET: u16 = 0x0021;
/// Compressed variant of the network-protocol tag.
pub const TAG_NET_COMPRESSED: u16 = 0x4021;
/// Plain secondary-protocol (IPv6) tag.
pub const TAG_SECONDARY: u16 = 0x0057;
/// Compressed variant of the secondary-protocol tag.
pub const TAG_SECONDARY_COMPRESSED: u16 = 0x4057;

/// Upper-layer protocol number for the network family.
pub const UPPER_NET: u16 = 0x0800;
/// Upper-layer protocol number for the secondary family.
pub const UPPER_SECONDARY: u16 = 0x86DD;

/// A value from the closed link-layer protocol tag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkProtocol {
    /// Plain network protocol.
    Net,
    /// Network protocol, payload compressed.
    NetCompressed,
    /// Plain secondary protocol.
    Secondary,
    /// Secondary protocol, payload compressed.
    SecondaryCompressed,
}

impl LinkProtocol {
    /// Parse a wire tag. Tags outside the closed set are rejected.
    pub fn from_wire(tag: u16) -> Result<Self> {
        match tag {
            TAG_NET => Ok(LinkProtocol::Net),
            TAG_NET_COMPRESSED => Ok(LinkProtocol::NetCompressed),
            TAG_SECONDARY => Ok(LinkProtocol::Secondary),
            TAG_SECONDARY_COMPRESSED => Ok(LinkProtocol::SecondaryCompressed),
            other => Err(WireError::UnsupportedProtocol(other)),
        }
    }

    /// The wire tag for this protocol.
    pub fn to_wire(self) -> u16 {
        match self {
            LinkProtocol::Net => TAG_NET,
            LinkProtocol::NetCompressed => TAG_NET_COMPRESSED,
            LinkProtocol::Secondary => TAG_SECONDARY,
            LinkProtocol::SecondaryCompressed => TAG_SECONDARY_COMPRESSED,
        }
    }

    /// Map an upper-layer protocol number to its plain link tag.
    pub fn from_upper(proto: u16) -> Result<Self> {
        match proto {
            UPPER_NET => Ok(LinkProtocol::Net),
            UPPER_SECONDARY => Ok(LinkProtocol::Secondary),
            other => Err(WireError::UnsupportedUpperProtocol(other)),
        }
    }

    /// The upper-layer protocol number this tag maps to.
    ///
    /// Both members of a plain/compressed pair map to the same number.
    pub fn upper(self) -> u16 {
        match self {
            LinkProtocol::Net | LinkProtocol::NetCompressed => UPPER_NET,
            LinkProtocol::Secondary | LinkProtocol::SecondaryCompressed => UPPER_SECONDARY,
        }
    }

    /// True for the compressed member of a pair.
    pub fn is_compressed(self) -> bool {
        matches!(
            self,
            LinkProtocol::NetCompressed | LinkProtocol::SecondaryCompressed
        )
    }

    /// The compressed member of this tag's pair.
    pub fn compressed(self) -> Self {
        match self {
            LinkProtocol::Net | LinkProtocol::NetCompressed => LinkProtocol::NetCompressed,
            LinkProtocol::Secondary | LinkProtocol::SecondaryCompressed => {
                LinkProtocol::SecondaryCompressed
            }
        }
    }

    /// The plain member of this tag's pair.
    pub fn plain(self) -> Self {
        match self {
            LinkProtocol::Net | LinkProtocol::NetCompressed => LinkProtocol::Net,
            LinkProtocol::Secondary | LinkProtocol::SecondaryCompressed => LinkProtocol::Secondary,
        }
    }

    /// Human-readable tag name.
    pub fn name(self) -> &'static str {
        match self {
            LinkProtocol::Net => "NET",
            LinkProtocol::NetCompressed => "NET+Z",
            LinkProtocol::Secondary => "SEC",
            LinkProtocol::SecondaryCompressed => "SEC+Z",
        }
    }
}

/// The outermost per-frame header: just the protocol tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkHeader {
    pub protocol: LinkProtocol,
}

impl LinkHeader {
    /// Serialized size in bytes.
    pub const SIZE: usize = 2;

    pub fn new(protocol: LinkProtocol) -> Self {
        Self { protocol }
    }

    /// Append the serialized header to `dst`.
    pub fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u16(self.protocol.to_wire());
    }

    /// Parse a link header from the front of `src` without consuming it.
    pub fn decode(src: &[u8]) -> Result<Self> {
        if src.len() < Self::SIZE {
            return Err(WireError::MalformedFrame {
                needed: Self::SIZE,
                have: src.len(),
            });
        }
        let tag = u16::from_be_bytes([src[0], src[1]]);
        Ok(Self {
            protocol: LinkProtocol::from_wire(tag)?,
        })
    }
}
