//! Transparent link-layer payload compression for point-to-point links.
//!
//! linkpress puts a compression-aware framing pipeline between a
//! network-layer sender/receiver and a finite-bandwidth point-to-point
//! medium. Eligible outbound payloads are run through a reversible codec
//! and re-tagged in the link header; the receiving device restores them
//! before delivery, so the layers above never observe the transform.
//!
//! # Crate Structure
//!
//! - [`wire`] — Frame format, protocol tags, header chain strip/rebuild
//! - [`codec`] — Reversible payload transforms (zlib, identity)
//! - [`device`] — The link device, rewriter, and transmit state machine
//! - [`sim`] — Logical-time scheduler, channel, and error models

/// Re-export wire types.
pub mod wire {
    pub use linkpress_wire::*;
}

/// Re-export codec types.
pub mod codec {
    pub use linkpress_codec::*;
}

/// Re-export device types.
pub mod device {
    pub use linkpress_device::*;
}

/// Re-export simulation collaborators.
pub mod sim {
    pub use linkpress_sim::*;
}
