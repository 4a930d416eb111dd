//! Link-layer frame format for linkpress.
//!
//! A frame is a 2-byte link header (protocol tag) followed by a fixed chain
//! of sub-headers — network, transport, sequencing — and the application
//! payload. The protocol tag space is closed: a plain/compressed pair per
//! upper-layer protocol family, so the tag alone tells a receiver whether
//! the payload must be decoded.
//!
//! Total frame length always equals the sum of the header sizes plus the
//! payload length, and the declared-length fields inside the chain are
//! recomputed whenever the payload size changes.

pub mod chain;
pub mod error;
pub mod frame;
pub mod headers;
pub mod link;

pub use chain::HeaderChain;
pub use error::{Result, WireError};
pub use frame::Frame;
pub use headers::{NetworkHeader, SeqHeader, TransportHeader};
pub use link::{
    LinkHeader, LinkProtocol, TAG_NET, TAG_NET_COMPRESSED, TAG_SECONDARY,
    TAG_SECONDARY_COMPRESSED, UPPER_NET, UPPER_SECONDARY,
};
