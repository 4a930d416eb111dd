//! The link device: framing pipeline + transmit machine + collaborators.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use bytes::Bytes;
use linkpress_codec::Codec;
use linkpress_wire::{Frame, LinkHeader, LinkProtocol};
use tracing::{debug, error, trace, warn};

use crate::addr::LinkAddress;
use crate::error::DropReason;
use crate::machine::TransmitMachine;
use crate::rewriter::FrameRewriter;
use crate::traits::{Channel, ErrorModel, ReceiveCallback, Scheduler, TxQueue};

/// Per-device configuration, fixed at construction.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// This device's link address.
    pub address: LinkAddress,
    /// Maximum upper-layer payload size accepted by `send`.
    pub mtu: usize,
    /// Link data rate in bits per second.
    pub data_rate_bps: u64,
    /// Idle time inserted after each frame transmission.
    pub interframe_gap: Duration,
    /// Encode eligible outbound payloads.
    pub compress: bool,
    /// Decode compressed-tagged inbound payloads.
    pub decompress: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            address: LinkAddress::BROADCAST,
            mtu: 1500,
            // The original link default.
            data_rate_bps: 32_768,
            interframe_gap: Duration::ZERO,
            compress: false,
            decompress: false,
        }
    }
}

/// Frame and byte counters, in place of wired-up trace sinks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub tx_frames: u64,
    pub tx_bytes: u64,
    pub tx_dropped: u64,
    pub rx_frames: u64,
    pub rx_bytes: u64,
    pub rx_dropped: u64,
    /// Inbound frames the error model flagged at the medium; a subset of
    /// `rx_dropped`, separate from codec decode failures.
    pub rx_corrupt: u64,
    /// Outbound frames accepted for transmission with a compressed tag.
    pub compressed_out: u64,
    /// Inbound frames whose payload was decoded back to original form.
    pub expanded_in: u64,
}

/// A point-to-point link device with transparent payload compression.
///
/// All work happens synchronously inside `send`, `receive`, or a scheduled
/// completion callback; nothing blocks and nothing runs in parallel.
/// Constructed behind `Rc<RefCell<...>>` so completion events can find the
/// device again — or notice it is gone and fire as no-ops.
pub struct Device {
    config: DeviceConfig,
    rewriter: FrameRewriter,
    machine: TransmitMachine,
    queue: Box<dyn TxQueue>,
    scheduler: Box<dyn Scheduler>,
    channel: Option<Rc<dyn Channel>>,
    error_model: Option<Box<dyn ErrorModel>>,
    rx_callback: Option<ReceiveCallback>,
    link_up: bool,
    stats: LinkStats,
    self_ref: Weak<RefCell<Device>>,
}

impl Device {
    /// Build a device from its configuration and collaborators.
    pub fn new(
        config: DeviceConfig,
        codec: Box<dyn Codec>,
        queue: Box<dyn TxQueue>,
        scheduler: Box<dyn Scheduler>,
    ) -> Rc<RefCell<Self>> {
        Rc::new_cyclic(|weak| {
            RefCell::new(Self {
                machine: TransmitMachine::new(config.data_rate_bps, config.interframe_gap),
                rewriter: FrameRewriter::new(codec),
                config,
                queue,
                scheduler,
                channel: None,
                error_model: None,
                rx_callback: None,
                link_up: false,
                stats: LinkStats::default(),
                self_ref: weak.clone(),
            })
        })
    }

    pub fn address(&self) -> LinkAddress {
        self.config.address
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    pub fn is_link_up(&self) -> bool {
        self.link_up
    }

    /// True while a frame occupies the transmit slot.
    pub fn is_transmitting(&self) -> bool {
        !self.machine.is_ready()
    }

    /// One-time configuration toggle: encode eligible outbound payloads.
    pub fn enable_compression(&mut self) {
        self.config.compress = true;
    }

    /// One-time configuration toggle: decode compressed inbound payloads.
    pub fn enable_decompression(&mut self) {
        self.config.decompress = true;
    }

    pub fn set_error_model(&mut self, model: Box<dyn ErrorModel>) {
        self.error_model = Some(model);
    }

    /// Install the upper-layer delivery callback.
    ///
    /// The callback runs inside the device's own event processing; a reply
    /// on the same device must go through the scheduler, not re-enter it
    /// directly.
    pub fn set_receive_callback(&mut self, callback: ReceiveCallback) {
        self.rx_callback = Some(callback);
    }

    /// Attach the device to its medium. The link is up from this point.
    pub fn attach(&mut self, channel: Rc<dyn Channel>) {
        self.channel = Some(channel);
        self.link_up = true;
        debug!(address = %self.config.address, "link up");
    }

    /// Hand a payload down for transmission.
    ///
    /// Returns false when the frame was dropped (link down, oversize,
    /// malformed, queue overflow, or medium refusal); per-frame failures
    /// never propagate as errors.
    pub fn send(&mut self, payload: Bytes, _dest: LinkAddress, protocol: u16) -> bool {
        if !self.link_up {
            self.note_tx_drop(DropReason::LinkDown);
            return false;
        }
        if payload.len() > self.config.mtu {
            self.note_tx_drop(DropReason::OversizePayload);
            return false;
        }

        let link_protocol = match LinkProtocol::from_upper(protocol) {
            Ok(p) => p,
            Err(err) => {
                // Deployment bug, not a runtime condition: make it loud.
                error!(protocol, %err, "send with unassigned upper-layer protocol");
                debug_assert!(false, "unassigned upper-layer protocol {protocol:#06x}");
                self.note_tx_drop(DropReason::UnsupportedProtocol);
                return false;
            }
        };

        let frame = Frame::build(LinkHeader::new(link_protocol), &payload);
        let frame = match self.rewriter.rewrite_for_send(&frame, self.config.compress) {
            Ok(frame) => frame,
            Err(err) => {
                self.note_tx_drop(err.drop_reason());
                return false;
            }
        };

        let compressed = frame
            .peek_link()
            .map(|link| link.protocol.is_compressed())
            .unwrap_or(false);

        if !self.queue.enqueue(frame) {
            self.note_tx_drop(DropReason::QueueOverflow);
            return false;
        }
        if compressed {
            self.stats.compressed_out += 1;
        }

        // If the machine is idle, pull the frame straight back out and put
        // it on the wire.
        if self.machine.is_ready() {
            let next = match self.queue.dequeue() {
                Some(frame) => frame,
                None => return true,
            };
            return self.transmit_start(next);
        }
        true
    }

    /// Deliver a frame arriving from the medium.
    pub fn receive(&mut self, frame: Frame) {
        if let Some(model) = self.error_model.as_mut() {
            if model.is_corrupt(&frame) {
                self.stats.rx_corrupt += 1;
                self.note_rx_drop(DropReason::CorruptPayload);
                return;
            }
        }

        let inbound = match self
            .rewriter
            .rewrite_for_receive(&frame, self.config.decompress)
        {
            Ok(inbound) => inbound,
            Err(err) => {
                let reason = err.drop_reason();
                if reason == DropReason::UnsupportedProtocol {
                    error!(%err, "inbound frame with tag outside the closed set");
                    debug_assert!(false, "inbound tag outside the closed set");
                }
                self.note_rx_drop(reason);
                return;
            }
        };

        self.stats.rx_frames += 1;
        self.stats.rx_bytes += frame.len() as u64;
        if inbound.expanded {
            self.stats.expanded_in += 1;
        }

        let remote = self
            .channel
            .as_ref()
            .and_then(|ch| ch.peer_address(self.config.address))
            .unwrap_or(LinkAddress::BROADCAST);

        trace!(
            address = %self.config.address,
            protocol = inbound.upper_protocol,
            bytes = inbound.body.len(),
            "frame up"
        );
        if let Some(callback) = self.rx_callback.as_mut() {
            callback(inbound.body, inbound.upper_protocol, remote);
        }
    }

    /// Begin physical transmission of `frame`.
    ///
    /// The machine must be ready; rewriting already happened at enqueue
    /// time, so the frame goes out exactly as stored.
    fn transmit_start(&mut self, frame: Frame) -> bool {
        let timing = self.machine.begin(frame.clone());

        let weak = self.self_ref.clone();
        self.scheduler.schedule_after(
            timing.complete_after,
            Box::new(move || {
                // The device may be gone by the time this fires; a stale
                // completion is a no-op.
                if let Some(device) = weak.upgrade() {
                    device.borrow_mut().transmit_complete();
                }
            }),
        );

        let Some(channel) = self.channel.as_ref() else {
            self.note_tx_drop(DropReason::ChannelRefused);
            return false;
        };
        let accepted = channel.begin_transmission(frame, self.config.address, timing.tx_time);
        if !accepted {
            self.note_tx_drop(DropReason::ChannelRefused);
        }
        accepted
    }

    /// Completion event: release the slot and start the next queued frame.
    fn transmit_complete(&mut self) {
        let frame = self.machine.complete();
        self.stats.tx_frames += 1;
        self.stats.tx_bytes += frame.len() as u64;
        trace!(address = %self.config.address, bytes = frame.len(), "tx complete");

        if let Some(next) = self.queue.dequeue() {
            self.transmit_start(next);
        }
    }

    fn note_tx_drop(&mut self, reason: DropReason) {
        self.stats.tx_dropped += 1;
        warn!(address = %self.config.address, reason = reason.as_str(), "tx drop");
    }

    fn note_rx_drop(&mut self, reason: DropReason) {
        self.stats.rx_dropped += 1;
        warn!(address = %self.config.address, reason = reason.as_str(), "rx drop");
    }
}

#[cfg(test)]
mod tests {
    use linkpress_codec::DeflateCodec;
    use linkpress_wire::{HeaderChain, NetworkHeader, SeqHeader, TransportHeader, UPPER_NET};

    use super::*;
    use crate::queue::DropTailQueue;

    /// Scheduler double: records callbacks, fires them on demand.
    #[derive(Clone, Default)]
    struct ManualScheduler {
        pending: Rc<RefCell<Vec<(Duration, Box<dyn FnOnce()>)>>>,
    }

    impl ManualScheduler {
        fn fire_next(&self) -> bool {
            let next = self.pending.borrow_mut().pop();
            match next {
                Some((_, callback)) => {
                    callback();
                    true
                }
                None => false,
            }
        }

        fn pending_count(&self) -> usize {
            self.pending.borrow().len()
        }
    }

    impl Scheduler for ManualScheduler {
        fn schedule_after(&self, delay: Duration, callback: Box<dyn FnOnce()>) {
            self.pending.borrow_mut().push((delay, callback));
        }
    }

    /// Channel double: remembers every frame put on the wire.
    #[derive(Default)]
    struct RecordingChannel {
        sent: RefCell<Vec<Frame>>,
        refuse: bool,
    }

    impl Channel for RecordingChannel {
        fn begin_transmission(
            &self,
            frame: Frame,
            _source: LinkAddress,
            _tx_time: Duration,
        ) -> bool {
            if self.refuse {
                return false;
            }
            self.sent.borrow_mut().push(frame);
            true
        }

        fn peer_address(&self, _local: LinkAddress) -> Option<LinkAddress> {
            Some(LinkAddress::new([2, 0, 0, 0, 0, 2]))
        }
    }

    struct AlwaysCorrupt;

    impl ErrorModel for AlwaysCorrupt {
        fn is_corrupt(&mut self, _frame: &Frame) -> bool {
            true
        }
    }

    fn upper_payload(len: usize) -> Bytes {
        let chain = HeaderChain {
            network: NetworkHeader::new(1, 2),
            transport: TransportHeader::new(49152, 9),
            seq: SeqHeader::new(0, 0),
        };
        chain.rebuild(&vec![0x33; len]).unwrap()
    }

    fn device_with(
        config: DeviceConfig,
        queue_capacity: usize,
    ) -> (Rc<RefCell<Device>>, ManualScheduler, Rc<RecordingChannel>) {
        let scheduler = ManualScheduler::default();
        let device = Device::new(
            config,
            Box::new(DeflateCodec::new()),
            Box::new(DropTailQueue::new(queue_capacity)),
            Box::new(scheduler.clone()),
        );
        let channel = Rc::new(RecordingChannel::default());
        device
            .borrow_mut()
            .attach(Rc::clone(&channel) as Rc<dyn Channel>);
        (device, scheduler, channel)
    }

    #[test]
    fn send_starts_transmission_when_idle() {
        let (device, scheduler, channel) = device_with(DeviceConfig::default(), 8);

        let ok = device
            .borrow_mut()
            .send(upper_payload(64), LinkAddress::BROADCAST, UPPER_NET);
        assert!(ok);
        assert_eq!(channel.sent.borrow().len(), 1);
        assert_eq!(scheduler.pending_count(), 1);
        assert!(!device.borrow().machine.is_ready());
    }

    #[test]
    fn busy_device_queues_then_drains_on_completion() {
        let (device, scheduler, channel) = device_with(DeviceConfig::default(), 8);

        for _ in 0..3 {
            assert!(device
                .borrow_mut()
                .send(upper_payload(64), LinkAddress::BROADCAST, UPPER_NET));
        }
        // Only the first went to the wire; two are queued.
        assert_eq!(channel.sent.borrow().len(), 1);

        assert!(scheduler.fire_next());
        assert_eq!(channel.sent.borrow().len(), 2);
        assert!(scheduler.fire_next());
        assert_eq!(channel.sent.borrow().len(), 3);

        // Final completion leaves the machine idle with nothing queued.
        assert!(scheduler.fire_next());
        assert!(device.borrow().machine.is_ready());
        assert_eq!(device.borrow().stats().tx_frames, 3);
    }

    #[test]
    fn link_down_drops_before_framing() {
        let scheduler = ManualScheduler::default();
        let device = Device::new(
            DeviceConfig::default(),
            Box::new(DeflateCodec::new()),
            Box::new(DropTailQueue::default()),
            Box::new(scheduler),
        );

        let ok = device
            .borrow_mut()
            .send(upper_payload(16), LinkAddress::BROADCAST, UPPER_NET);
        assert!(!ok);
        assert_eq!(device.borrow().stats().tx_dropped, 1);
    }

    #[test]
    fn oversize_payload_dropped() {
        let config = DeviceConfig {
            mtu: 100,
            ..DeviceConfig::default()
        };
        let (device, _, channel) = device_with(config, 8);

        let ok = device
            .borrow_mut()
            .send(upper_payload(200), LinkAddress::BROADCAST, UPPER_NET);
        assert!(!ok);
        assert!(channel.sent.borrow().is_empty());
    }

    #[test]
    fn queue_overflow_reports_drop_and_keeps_state() {
        let (device, scheduler, channel) = device_with(DeviceConfig::default(), 1);

        // First occupies the machine, second fills the queue slot.
        assert!(device
            .borrow_mut()
            .send(upper_payload(64), LinkAddress::BROADCAST, UPPER_NET));
        assert!(device
            .borrow_mut()
            .send(upper_payload(64), LinkAddress::BROADCAST, UPPER_NET));

        let ok = device
            .borrow_mut()
            .send(upper_payload(64), LinkAddress::BROADCAST, UPPER_NET);
        assert!(!ok);
        assert_eq!(device.borrow().stats().tx_dropped, 1);
        // Transmit state unchanged: still one frame on the wire, one queued.
        assert_eq!(channel.sent.borrow().len(), 1);
        assert_eq!(scheduler.pending_count(), 1);
    }

    #[test]
    fn corrupt_inbound_never_reaches_callback() {
        let (device, _, _) = device_with(DeviceConfig::default(), 8);

        let delivered = Rc::new(RefCell::new(0u32));
        let seen = Rc::clone(&delivered);
        device.borrow_mut().set_error_model(Box::new(AlwaysCorrupt));
        device
            .borrow_mut()
            .set_receive_callback(Box::new(move |_, _, _| {
                *seen.borrow_mut() += 1;
            }));

        let frame = Frame::build(
            LinkHeader::new(LinkProtocol::Net),
            upper_payload(32).as_ref(),
        );
        device.borrow_mut().receive(frame);

        assert_eq!(*delivered.borrow(), 0);
        assert_eq!(device.borrow().stats().rx_dropped, 1);
        assert_eq!(device.borrow().stats().rx_corrupt, 1);
        assert_eq!(device.borrow().stats().rx_frames, 0);
    }

    #[test]
    fn medium_corruption_counted_apart_from_decode_failure() {
        // Same outcome (frame dropped), different cause; the counters must
        // tell them apart.
        let config = DeviceConfig {
            decompress: true,
            ..DeviceConfig::default()
        };

        let (flagged, _, _) = device_with(config.clone(), 8);
        flagged.borrow_mut().set_error_model(Box::new(AlwaysCorrupt));
        flagged.borrow_mut().receive(Frame::build(
            LinkHeader::new(LinkProtocol::Net),
            upper_payload(32).as_ref(),
        ));

        // Compressed tag over a payload that was never encoded: the decode
        // path rejects it.
        let (garbled, _, _) = device_with(config, 8);
        garbled.borrow_mut().receive(Frame::build(
            LinkHeader::new(LinkProtocol::NetCompressed),
            upper_payload(32).as_ref(),
        ));

        let a = flagged.borrow().stats();
        let b = garbled.borrow().stats();
        assert_eq!((a.rx_dropped, a.rx_corrupt), (1, 1));
        assert_eq!((b.rx_dropped, b.rx_corrupt), (1, 0));
        assert_ne!(a, b);
    }

    #[test]
    fn overflow_dropped_frames_not_counted_compressed() {
        let config = DeviceConfig {
            compress: true,
            ..DeviceConfig::default()
        };
        let (device, _, _) = device_with(config, 1);

        // First occupies the machine, second fills the queue slot, third
        // overflows before it can count as compressed output.
        for _ in 0..2 {
            assert!(device
                .borrow_mut()
                .send(upper_payload(64), LinkAddress::BROADCAST, UPPER_NET));
        }
        assert!(!device
            .borrow_mut()
            .send(upper_payload(64), LinkAddress::BROADCAST, UPPER_NET));

        let stats = device.borrow().stats();
        assert_eq!(stats.tx_dropped, 1);
        assert_eq!(stats.compressed_out, 2);
    }

    #[test]
    fn receive_reports_protocol_and_remote() {
        let (device, _, _) = device_with(DeviceConfig::default(), 8);

        let seen: Rc<RefCell<Option<(u16, LinkAddress)>>> = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        device
            .borrow_mut()
            .set_receive_callback(Box::new(move |_, protocol, remote| {
                *sink.borrow_mut() = Some((protocol, remote));
            }));

        let frame = Frame::build(
            LinkHeader::new(LinkProtocol::Net),
            upper_payload(32).as_ref(),
        );
        device.borrow_mut().receive(frame);

        let (protocol, remote) = seen.borrow().unwrap();
        assert_eq!(protocol, UPPER_NET);
        assert_eq!(remote, LinkAddress::new([2, 0, 0, 0, 0, 2]));
    }

    #[test]
    fn stale_completion_is_noop() {
        let (device, scheduler, _) = device_with(DeviceConfig::default(), 8);
        assert!(device
            .borrow_mut()
            .send(upper_payload(64), LinkAddress::BROADCAST, UPPER_NET));

        drop(device);
        // The completion event still fires; it must find nothing to do.
        assert!(scheduler.fire_next());
    }

    #[test]
    fn channel_refusal_counts_as_tx_drop() {
        let scheduler = ManualScheduler::default();
        let device = Device::new(
            DeviceConfig::default(),
            Box::new(DeflateCodec::new()),
            Box::new(DropTailQueue::default()),
            Box::new(scheduler.clone()),
        );
        let channel = Rc::new(RecordingChannel {
            refuse: true,
            ..RecordingChannel::default()
        });
        device
            .borrow_mut()
            .attach(Rc::clone(&channel) as Rc<dyn Channel>);

        let ok = device
            .borrow_mut()
            .send(upper_payload(64), LinkAddress::BROADCAST, UPPER_NET);
        assert!(!ok);
        assert_eq!(device.borrow().stats().tx_dropped, 1);
        // Completion still scheduled; the machine recovers through it.
        assert!(scheduler.fire_next());
        assert!(device.borrow().machine.is_ready());
    }
}
