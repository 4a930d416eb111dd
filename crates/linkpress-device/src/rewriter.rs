//! The compression-aware framing pipeline.
//!
//! Outbound: peek the link tag; if the device compresses and the tag is in
//! the compressible set, strip the header chain, encode the raw payload,
//! rebuild the chain with recomputed lengths, and re-tag the link header
//! with the compressed variant. Inbound is the exact mirror. Everything
//! else passes through untouched, so layers above see unmodified frames.

use bytes::Bytes;
use linkpress_codec::Codec;
use linkpress_wire::{Frame, HeaderChain, LinkHeader, LinkProtocol};

use crate::error::Result;

/// A received frame after link-header processing.
#[derive(Debug)]
pub struct Inbound {
    /// Frame body with the link header removed and, when decoding ran, the
    /// header chain restored around the recovered payload.
    pub body: Bytes,
    /// Upper-layer protocol number recovered from the link tag.
    pub upper_protocol: u16,
    /// True when the payload was decoded back to its original form.
    pub expanded: bool,
}

/// Rewrites frames between their plain and compressed wire forms.
pub struct FrameRewriter {
    codec: Box<dyn Codec>,
}

impl FrameRewriter {
    pub fn new(codec: Box<dyn Codec>) -> Self {
        Self { codec }
    }

    pub fn codec_name(&self) -> &'static str {
        self.codec.name()
    }

    /// True if frames tagged `protocol` are eligible for encoding.
    ///
    /// Only the plain network-protocol family is compressed on send; the
    /// secondary family's compressed tag exists for the receive side.
    fn compressible(protocol: LinkProtocol) -> bool {
        protocol == LinkProtocol::Net
    }

    /// Produce the frame to enqueue for `frame` handed down by the upper
    /// layer.
    ///
    /// Returns the frame unchanged unless `compress` is set and the link
    /// tag is compressible. A frame too short to hold the full header chain
    /// is rejected before the codec is consulted.
    pub fn rewrite_for_send(&self, frame: &Frame, compress: bool) -> Result<Frame> {
        let (link, body) = frame.split_link()?;
        if !compress || !Self::compressible(link.protocol) {
            return Ok(frame.clone());
        }

        let (chain, payload) = HeaderChain::strip(body)?;
        let encoded = self.codec.encode(&payload)?;
        let rebuilt = chain.rebuild(&encoded)?;

        tracing::trace!(
            codec = self.codec.name(),
            tag = link.protocol.compressed().name(),
            raw = payload.len(),
            encoded = encoded.len(),
            "encoded outbound payload"
        );
        Ok(Frame::build(
            LinkHeader::new(link.protocol.compressed()),
            &rebuilt,
        ))
    }

    /// Restore a frame arriving from the medium.
    ///
    /// A compressed tag with decoding enabled reverses the send rewrite
    /// exactly. A compressed tag with decoding disabled passes through with
    /// only the link header removed — nothing recomputed — and still
    /// reports the tag's upper-layer protocol; the misconfiguration is the
    /// deployment's to resolve.
    pub fn rewrite_for_receive(&self, frame: &Frame, decompress: bool) -> Result<Inbound> {
        let (link, body) = frame.split_link()?;
        let upper_protocol = link.protocol.upper();

        if !link.protocol.is_compressed() || !decompress {
            return Ok(Inbound {
                body,
                upper_protocol,
                expanded: false,
            });
        }

        let (chain, payload) = HeaderChain::strip(body)?;
        let decoded = self.codec.decode(&payload)?;
        let rebuilt = chain.rebuild(&decoded)?;

        tracing::trace!(
            codec = self.codec.name(),
            encoded = payload.len(),
            raw = decoded.len(),
            "decoded inbound payload"
        );
        Ok(Inbound {
            body: rebuilt,
            upper_protocol,
            expanded: true,
        })
    }
}
