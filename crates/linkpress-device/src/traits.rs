//! Collaborator seams consumed by the device.
//!
//! The device owns none of these concerns. It pulls frames from a
//! [`TxQueue`], pushes them onto a [`Channel`], asks an [`ErrorModel`]
//! about inbound damage, and realizes all waiting by handing callbacks to a
//! [`Scheduler`]. Implementations live outside this crate (see
//! `linkpress-sim`), except for the default drop-tail queue.

use std::time::Duration;

use bytes::Bytes;
use linkpress_wire::Frame;

use crate::addr::LinkAddress;

/// FIFO transmit queue with an overflow policy.
pub trait TxQueue {
    /// Accept a frame for later transmission. False means overflow: the
    /// frame was refused and the caller must treat it as dropped.
    fn enqueue(&mut self, frame: Frame) -> bool;

    /// Remove the next frame in FIFO order, if any.
    fn dequeue(&mut self) -> Option<Frame>;

    /// Frames currently held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The transmission medium between two devices.
pub trait Channel {
    /// Start carrying `frame` from `source`; the bits occupy the wire for
    /// `tx_time`. False if the medium refuses, e.g. the peer half is not
    /// attached yet.
    fn begin_transmission(&self, frame: Frame, source: LinkAddress, tx_time: Duration) -> bool;

    /// The address of the device across the link from `local`, once both
    /// halves are attached.
    fn peer_address(&self, local: LinkAddress) -> Option<LinkAddress>;
}

/// Decides whether an inbound frame arrived damaged.
///
/// Consulted exactly once per inbound frame, before any header processing.
pub trait ErrorModel {
    fn is_corrupt(&mut self, frame: &Frame) -> bool;
}

/// Fire-and-forget timed callbacks.
///
/// There is no cancellation: a scheduled callback always fires, and anyone
/// whose state may be gone by then checks at fire time.
pub trait Scheduler {
    fn schedule_after(&self, delay: Duration, callback: Box<dyn FnOnce()>);
}

/// Upper-layer delivery: restored frame body, upper-layer protocol number,
/// and the remote device's address.
pub type ReceiveCallback = Box<dyn FnMut(Bytes, u16, LinkAddress)>;
