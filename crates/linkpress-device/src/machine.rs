//! Single-slot transmit state machine.

use std::time::Duration;

use linkpress_wire::Frame;

/// Transmit readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    Ready,
    Busy,
}

/// How long a transmission occupies the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxTiming {
    /// Time the bits occupy the wire.
    pub tx_time: Duration,
    /// `tx_time` plus the interframe gap; schedule completion after this.
    pub complete_after: Duration,
}

/// Tracks the single in-flight frame.
///
/// The machine is pure bookkeeping: it owns the transmit slot and computes
/// timings, while the device does the scheduling and channel calls. It
/// never touches the codec — rewriting happened once, at enqueue time.
///
/// Starting a transmission while busy, or completing one while ready, is an
/// invariant break and panics.
#[derive(Debug)]
pub struct TransmitMachine {
    state: TxState,
    slot: Option<Frame>,
    data_rate_bps: u64,
    interframe_gap: Duration,
}

impl TransmitMachine {
    pub fn new(data_rate_bps: u64, interframe_gap: Duration) -> Self {
        assert!(data_rate_bps > 0, "data rate must be non-zero");
        Self {
            state: TxState::Ready,
            slot: None,
            data_rate_bps,
            interframe_gap,
        }
    }

    pub fn state(&self) -> TxState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == TxState::Ready
    }

    /// The frame currently on the wire, if any.
    pub fn in_flight(&self) -> Option<&Frame> {
        self.slot.as_ref()
    }

    /// Serialization time for `bytes` at the configured data rate.
    pub fn tx_time(&self, bytes: usize) -> Duration {
        let bits = bytes as u128 * 8;
        let nanos = bits * 1_000_000_000 / self.data_rate_bps as u128;
        Duration::from_nanos(nanos as u64)
    }

    /// Occupy the slot with `frame` and return its timing.
    ///
    /// # Panics
    ///
    /// Panics if the machine is busy — the caller failed to gate on
    /// [`TransmitMachine::is_ready`].
    pub fn begin(&mut self, frame: Frame) -> TxTiming {
        assert!(
            self.state == TxState::Ready,
            "must be ready to start a transmission"
        );
        let tx_time = self.tx_time(frame.len());
        self.state = TxState::Busy;
        self.slot = Some(frame);
        TxTiming {
            tx_time,
            complete_after: tx_time + self.interframe_gap,
        }
    }

    /// Release the slot and return the frame that finished.
    ///
    /// # Panics
    ///
    /// Panics if no transmission is in progress.
    pub fn complete(&mut self) -> Frame {
        assert!(
            self.state == TxState::Busy,
            "must be busy to complete a transmission"
        );
        self.state = TxState::Ready;
        self.slot
            .take()
            .unwrap_or_else(|| unreachable!("busy machine always holds a frame"))
    }
}
