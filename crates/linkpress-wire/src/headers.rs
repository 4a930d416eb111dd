//! Fixed-size sub-headers enclosed by the link header.
//!
//! The chain order is network, then transport, then sequencing, then the
//! application payload. The network and transport headers both carry a
//! declared-length field; those are recomputed from the actual payload on
//! every encode, never copied through.

use bytes::BufMut;

use crate::error::{Result, WireError};

fn check_len(src: &[u8], needed: usize) -> Result<()> {
    if src.len() < needed {
        return Err(WireError::MalformedFrame {
            needed,
            have: src.len(),
        });
    }
    Ok(())
}

/// IPv4-shaped network header, fixed 20 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkHeader {
    pub dscp: u8,
    pub ident: u16,
    pub flags_frag: u16,
    pub ttl: u8,
    pub protocol: u8,
    pub src: u32,
    pub dst: u32,
    /// Declared total length as observed on the wire. Recomputed on encode.
    pub total_len: u16,
    /// Header checksum as observed on the wire. Recomputed on encode.
    pub checksum: u16,
}

/// Version 4, IHL 5 (no options).
const VERSION_IHL: u8 = 0x45;

impl NetworkHeader {
    /// Serialized size in bytes.
    pub const SIZE: usize = 20;

    /// Protocol number of the transport header this chain carries.
    pub const PROTO_TRANSPORT: u8 = 17;

    pub fn new(src: u32, dst: u32) -> Self {
        Self {
            dscp: 0,
            ident: 0,
            flags_frag: 0,
            ttl: 64,
            protocol: Self::PROTO_TRANSPORT,
            src,
            dst,
            total_len: 0,
            checksum: 0,
        }
    }

    /// Append the serialized header, declaring `below_len` bytes beneath it.
    ///
    /// The total-length field and the header checksum are computed here from
    /// the actual sizes, regardless of what `total_len`/`checksum` hold.
    pub fn encode(&self, below_len: usize, dst: &mut impl BufMut) -> Result<()> {
        let total = total_field(Self::SIZE, below_len)?;

        let mut hdr = [0u8; Self::SIZE];
        hdr[0] = VERSION_IHL;
        hdr[1] = self.dscp;
        hdr[2..4].copy_from_slice(&total.to_be_bytes());
        hdr[4..6].copy_from_slice(&self.ident.to_be_bytes());
        hdr[6..8].copy_from_slice(&self.flags_frag.to_be_bytes());
        hdr[8] = self.ttl;
        hdr[9] = self.protocol;
        // bytes 10..12 stay zero for the checksum computation
        hdr[12..16].copy_from_slice(&self.src.to_be_bytes());
        hdr[16..20].copy_from_slice(&self.dst.to_be_bytes());

        let sum = header_checksum(&hdr);
        hdr[10..12].copy_from_slice(&sum.to_be_bytes());

        dst.put_slice(&hdr);
        Ok(())
    }

    /// Parse a network header from the front of `src` without consuming it.
    pub fn decode(src: &[u8]) -> Result<Self> {
        check_len(src, Self::SIZE)?;
        Ok(Self {
            dscp: src[1],
            total_len: u16::from_be_bytes([src[2], src[3]]),
            ident: u16::from_be_bytes([src[4], src[5]]),
            flags_frag: u16::from_be_bytes([src[6], src[7]]),
            ttl: src[8],
            protocol: src[9],
            checksum: u16::from_be_bytes([src[10], src[11]]),
            src: u32::from_be_bytes([src[12], src[13], src[14], src[15]]),
            dst: u32::from_be_bytes([src[16], src[17], src[18], src[19]]),
        })
    }
}

/// UDP-shaped transport header, fixed 8 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportHeader {
    pub src_port: u16,
    pub dst_port: u16,
    /// Declared length as observed on the wire. Recomputed on encode.
    pub length: u16,
    /// Carried opaque, not validated by this layer.
    pub checksum: u16,
}

impl TransportHeader {
    /// Serialized size in bytes.
    pub const SIZE: usize = 8;

    pub fn new(src_port: u16, dst_port: u16) -> Self {
        Self {
            src_port,
            dst_port,
            length: 0,
            checksum: 0,
        }
    }

    /// Append the serialized header, declaring `below_len` bytes beneath it.
    pub fn encode(&self, below_len: usize, dst: &mut impl BufMut) -> Result<()> {
        let length = total_field(Self::SIZE, below_len)?;
        dst.put_u16(self.src_port);
        dst.put_u16(self.dst_port);
        dst.put_u16(length);
        dst.put_u16(self.checksum);
        Ok(())
    }

    /// Parse a transport header from the front of `src` without consuming it.
    pub fn decode(src: &[u8]) -> Result<Self> {
        check_len(src, Self::SIZE)?;
        Ok(Self {
            src_port: u16::from_be_bytes([src[0], src[1]]),
            dst_port: u16::from_be_bytes([src[2], src[3]]),
            length: u16::from_be_bytes([src[4], src[5]]),
            checksum: u16::from_be_bytes([src[6], src[7]]),
        })
    }
}

/// Sequencing header, fixed 12 bytes: sequence number + send timestamp.
///
/// Carries no length field, so it passes through rebuilds untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeqHeader {
    pub seq: u32,
    pub ts_nanos: u64,
}

impl SeqHeader {
    /// Serialized size in bytes.
    pub const SIZE: usize = 12;

    pub fn new(seq: u32, ts_nanos: u64) -> Self {
        Self { seq, ts_nanos }
    }

    /// Append the serialized header to `dst`.
    pub fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u32(self.seq);
        dst.put_u64(self.ts_nanos);
    }

    /// Parse a sequencing header from the front of `src` without consuming it.
    pub fn decode(src: &[u8]) -> Result<Self> {
        check_len(src, Self::SIZE)?;
        Ok(Self {
            seq: u32::from_be_bytes([src[0], src[1], src[2], src[3]]),
            ts_nanos: u64::from_be_bytes([
                src[4], src[5], src[6], src[7], src[8], src[9], src[10], src[11],
            ]),
        })
    }
}

fn total_field(header_size: usize, below_len: usize) -> Result<u16> {
    let total = header_size + below_len;
    u16::try_from(total).map_err(|_| WireError::Oversize {
        len: total,
        max: u16::MAX as usize,
    })
}

/// Ones'-complement checksum over the 20 header bytes, checksum field zeroed.
fn header_checksum(hdr: &[u8; NetworkHeader::SIZE]) -> u16 {
    let mut sum: u32 = 0;
    for pair in hdr.chunks_exact(2) {
        sum += u32::from(u16::from_be_bytes([pair[0], pair[1]]));
    }
    while sum > 0xFFFF {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    !(sum as u16)
}
