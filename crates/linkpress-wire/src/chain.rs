//! Ordered strip/rebuild of the sub-headers under the link header.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, WireError};
use crate::headers::{NetworkHeader, SeqHeader, TransportHeader};

/// The ordered sub-headers enclosing the application payload.
///
/// Strip order is network, transport, sequencing; rebuild re-adds them in
/// reverse. The two declared-length fields (network total length, transport
/// length) are recomputed from the actual payload on every rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderChain {
    pub network: NetworkHeader,
    pub transport: TransportHeader,
    pub seq: SeqHeader,
}

impl HeaderChain {
    /// Combined serialized size of all three sub-headers.
    pub const SIZE: usize = NetworkHeader::SIZE + TransportHeader::SIZE + SeqHeader::SIZE;

    /// Remove all sub-headers from `body`, in encapsulation order.
    ///
    /// `body` is the frame with the link header already removed. Returns the
    /// parsed headers and the remaining raw payload. Fails with
    /// [`WireError::MalformedFrame`] if the buffer cannot hold the full
    /// chain.
    pub fn strip(mut body: Bytes) -> Result<(Self, Bytes)> {
        if body.len() < Self::SIZE {
            return Err(WireError::MalformedFrame {
                needed: Self::SIZE,
                have: body.len(),
            });
        }

        let network = NetworkHeader::decode(&body)?;
        body.advance(NetworkHeader::SIZE);

        let transport = TransportHeader::decode(&body)?;
        body.advance(TransportHeader::SIZE);

        let seq = SeqHeader::decode(&body)?;
        body.advance(SeqHeader::SIZE);

        Ok((
            Self {
                network,
                transport,
                seq,
            },
            body,
        ))
    }

    /// Re-add the sub-headers around `payload`, recomputing length fields.
    ///
    /// The result is the frame body below the link header. Exact inverse of
    /// [`HeaderChain::strip`] when the payload length is unchanged.
    pub fn rebuild(&self, payload: &[u8]) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(Self::SIZE + payload.len());

        let seq_and_payload = SeqHeader::SIZE + payload.len();
        self.network
            .encode(TransportHeader::SIZE + seq_and_payload, &mut buf)?;
        self.transport.encode(seq_and_payload, &mut buf)?;
        self.seq.encode(&mut buf);
        buf.put_slice(payload);

        Ok(buf.freeze())
    }
}
