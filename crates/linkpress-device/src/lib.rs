//! Compression-aware point-to-point link device.
//!
//! The device sits between a network-layer sender/receiver and a
//! point-to-point medium. Outbound frames whose protocol tag is in the
//! compressible set have their application payload run through a reversible
//! codec, with the header chain rebuilt around the result and the link
//! header re-tagged; inbound frames are restored symmetrically. Layers
//! above never see the transform.
//!
//! Everything is single-threaded and event-driven: `send`, `receive`, and
//! scheduled completion callbacks each run to completion, and waiting is
//! always a future callback, never an in-line block.

pub mod addr;
pub mod device;
pub mod error;
pub mod machine;
pub mod queue;
pub mod rewriter;
pub mod traits;

pub use addr::LinkAddress;
pub use device::{Device, DeviceConfig, LinkStats};
pub use error::{DeviceError, DropReason, Result};
pub use machine::{TransmitMachine, TxState, TxTiming};
pub use queue::DropTailQueue;
pub use rewriter::{FrameRewriter, Inbound};
pub use traits::{Channel, ErrorModel, ReceiveCallback, Scheduler, TxQueue};
