//! End-to-end scenarios across two devices on a simulated link.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use bytes::Bytes;
use linkpress::codec::{Codec, DeflateCodec};
use linkpress::device::{
    Channel, Device, DeviceConfig, DropTailQueue, FrameRewriter, LinkAddress,
};
use linkpress::sim::{EventScheduler, ListErrorModel, PointToPointChannel};
use linkpress::wire::{
    Frame, HeaderChain, LinkHeader, LinkProtocol, NetworkHeader, SeqHeader, TransportHeader,
    TAG_NET, TAG_NET_COMPRESSED, TAG_SECONDARY, TAG_SECONDARY_COMPRESSED, UPPER_NET,
};

const ADDR_A: LinkAddress = LinkAddress([2, 0, 0, 0, 0, 1]);
const ADDR_B: LinkAddress = LinkAddress([2, 0, 0, 0, 0, 2]);

/// Channel wrapper that records every frame put on the wire.
struct TapChannel {
    inner: Rc<PointToPointChannel>,
    frames: RefCell<Vec<Frame>>,
}

impl TapChannel {
    fn new(inner: Rc<PointToPointChannel>) -> Rc<Self> {
        Rc::new(Self {
            inner,
            frames: RefCell::new(Vec::new()),
        })
    }
}

impl Channel for TapChannel {
    fn begin_transmission(&self, frame: Frame, source: LinkAddress, tx_time: Duration) -> bool {
        self.frames.borrow_mut().push(frame.clone());
        self.inner.begin_transmission(frame, source, tx_time)
    }

    fn peer_address(&self, local: LinkAddress) -> Option<LinkAddress> {
        self.inner.peer_address(local)
    }
}

struct Link {
    scheduler: EventScheduler,
    sender: Rc<RefCell<Device>>,
    receiver: Rc<RefCell<Device>>,
    tap: Rc<TapChannel>,
    delivered: Rc<RefCell<Vec<(Bytes, u16, LinkAddress)>>>,
}

fn make_device(
    scheduler: &EventScheduler,
    address: LinkAddress,
    queue_capacity: usize,
) -> Rc<RefCell<Device>> {
    let config = DeviceConfig {
        address,
        ..DeviceConfig::default()
    };
    Device::new(
        config,
        Box::new(DeflateCodec::new()),
        Box::new(DropTailQueue::new(queue_capacity)),
        Box::new(scheduler.clone()),
    )
}

fn make_link(queue_capacity: usize) -> Link {
    let scheduler = EventScheduler::new();
    let channel = PointToPointChannel::new(scheduler.clone(), Duration::from_millis(1));
    let sender = make_device(&scheduler, ADDR_A, queue_capacity);
    let receiver = make_device(&scheduler, ADDR_B, queue_capacity);
    channel.attach(&sender);
    channel.attach(&receiver);

    // Interpose the tap on the sender's side of the wire.
    let tap = TapChannel::new(Rc::clone(&channel));
    sender
        .borrow_mut()
        .attach(Rc::clone(&tap) as Rc<dyn Channel>);

    let delivered = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&delivered);
    receiver
        .borrow_mut()
        .set_receive_callback(Box::new(move |body, protocol, remote| {
            sink.borrow_mut().push((body, protocol, remote));
        }));

    Link {
        scheduler,
        sender,
        receiver,
        tap,
        delivered,
    }
}

fn upper_packet(payload: &[u8]) -> Bytes {
    let chain = HeaderChain {
        network: NetworkHeader::new(0x0A00_0001, 0x0A00_0002),
        transport: TransportHeader::new(49152, 9),
        seq: SeqHeader::new(1, 42),
    };
    chain.rebuild(payload).unwrap()
}

fn wire_tag(frame: &Frame) -> u16 {
    u16::from_be_bytes([frame.as_bytes()[0], frame.as_bytes()[1]])
}

#[test]
fn codec_roundtrip_across_sizes() {
    let codec = DeflateCodec::new();
    for size in 1..128usize {
        let payload: Vec<u8> = (0..size).map(|i| (i * 7 % 256) as u8).collect();
        assert_eq!(codec.decode(&codec.encode(&payload).unwrap()).unwrap(), payload);
    }
    let max = vec![0xA5u8; 64 * 1024];
    assert_eq!(codec.decode(&codec.encode(&max).unwrap()).unwrap(), max);
}

#[test]
fn rewrite_roundtrip_restores_frames_exactly() {
    let rewriter = FrameRewriter::new(Box::new(DeflateCodec::new()));
    for size in [1usize, 40, 200, 1024] {
        let payload: Vec<u8> = (0..size).map(|i| (i % 13) as u8).collect();
        let frame = Frame::build(
            LinkHeader::new(LinkProtocol::Net),
            upper_packet(&payload).as_ref(),
        );

        let wire = rewriter.rewrite_for_send(&frame, true).unwrap();
        let inbound = rewriter.rewrite_for_receive(&wire, true).unwrap();

        let (_, original_body) = frame.split_link().unwrap();
        assert_eq!(inbound.body, original_body);

        // Length fields must match actual lengths at every stage.
        let (wire_chain, wire_payload) = HeaderChain::strip(wire.split_link().unwrap().1).unwrap();
        assert_eq!(
            wire_chain.transport.length as usize,
            TransportHeader::SIZE + SeqHeader::SIZE + wire_payload.len()
        );
        let (restored_chain, restored_payload) = HeaderChain::strip(inbound.body.clone()).unwrap();
        assert_eq!(
            restored_chain.transport.length as usize,
            TransportHeader::SIZE + SeqHeader::SIZE + restored_payload.len()
        );
        assert_eq!(restored_payload.as_ref(), payload.as_slice());
    }
}

#[test]
fn compressed_sends_stay_inside_the_closed_tag_set() {
    let link = make_link(100);
    link.sender.borrow_mut().enable_compression();
    link.receiver.borrow_mut().enable_decompression();

    for size in [1usize, 64, 200, 1000] {
        let text: Vec<u8> = b"abc".iter().copied().cycle().take(size).collect();
        let noise: Vec<u8> = (0..size).map(|i| (i * 31 % 256) as u8).collect();
        for payload in [text, noise] {
            assert!(link
                .sender
                .borrow_mut()
                .send(upper_packet(&payload), ADDR_B, UPPER_NET));
        }
        link.scheduler.run();
    }

    let closed = [
        TAG_NET,
        TAG_NET_COMPRESSED,
        TAG_SECONDARY,
        TAG_SECONDARY_COMPRESSED,
    ];
    let frames = link.tap.frames.borrow();
    assert!(!frames.is_empty());
    for frame in frames.iter() {
        assert!(closed.contains(&wire_tag(frame)));
    }
}

#[test]
fn no_double_start_while_busy() {
    let link = make_link(100);

    for _ in 0..3 {
        assert!(link
            .sender
            .borrow_mut()
            .send(upper_packet(&[1u8; 64]), ADDR_B, UPPER_NET));
    }

    // All three were accepted, but only one reached the wire: the machine
    // went busy on the first and the rest sat in the queue.
    assert_eq!(link.tap.frames.borrow().len(), 1);
    assert!(link.sender.borrow().is_transmitting());

    link.scheduler.run();
    assert_eq!(link.tap.frames.borrow().len(), 3);
    assert!(!link.sender.borrow().is_transmitting());
    assert_eq!(link.delivered.borrow().len(), 3);
}

#[test]
fn corrupt_frame_never_reaches_upper_layer() {
    let link = make_link(100);
    link.receiver
        .borrow_mut()
        .set_error_model(Box::new(ListErrorModel::new([0])));

    for _ in 0..2 {
        assert!(link
            .sender
            .borrow_mut()
            .send(upper_packet(&[9u8; 100]), ADDR_B, UPPER_NET));
    }
    link.scheduler.run();

    assert_eq!(link.delivered.borrow().len(), 1);
    let stats = link.receiver.borrow().stats();
    assert_eq!(stats.rx_dropped, 1);
    assert_eq!(stats.rx_corrupt, 1);
    assert_eq!(stats.rx_frames, 1);
}

#[test]
fn scenario_a_compression_disabled_is_byte_transparent() {
    let link = make_link(100);
    let payload = vec![0x42u8; 64];
    let upper = upper_packet(&payload);

    assert!(link
        .sender
        .borrow_mut()
        .send(upper.clone(), ADDR_B, UPPER_NET));
    link.scheduler.run();

    let frames = link.tap.frames.borrow();
    assert_eq!(wire_tag(&frames[0]), TAG_NET);
    // Body below the link header is the untouched upper-layer packet.
    assert_eq!(&frames[0].as_bytes()[2..], upper.as_ref());

    let delivered = link.delivered.borrow();
    let (body, protocol, remote) = &delivered[0];
    assert_eq!(body, &upper);
    assert_eq!(*protocol, UPPER_NET);
    assert_eq!(*remote, ADDR_A);
}

#[test]
fn scenario_b_compressed_frame_carries_recomputed_lengths() {
    let link = make_link(100);
    link.sender.borrow_mut().enable_compression();
    link.receiver.borrow_mut().enable_decompression();

    // Highly repetitive 200-byte payload, sure to shrink under zlib.
    let payload = vec![b'z'; 200];
    let upper = upper_packet(&payload);
    assert!(link
        .sender
        .borrow_mut()
        .send(upper.clone(), ADDR_B, UPPER_NET));
    link.scheduler.run();

    let frames = link.tap.frames.borrow();
    assert_eq!(wire_tag(&frames[0]), TAG_NET_COMPRESSED);

    let (chain, encoded) = HeaderChain::strip(frames[0].split_link().unwrap().1).unwrap();
    assert!(encoded.len() < 200);
    // Declared lengths describe the encoded payload, not the original 200.
    assert_eq!(
        chain.transport.length as usize,
        TransportHeader::SIZE + SeqHeader::SIZE + encoded.len()
    );
    assert_eq!(
        chain.network.total_len as usize,
        HeaderChain::SIZE + encoded.len()
    );

    // And the receiver still sees the original bytes.
    let delivered = link.delivered.borrow();
    assert_eq!(delivered[0].0, upper);
    assert_eq!(link.sender.borrow().stats().compressed_out, 1);
    assert_eq!(link.receiver.borrow().stats().expanded_in, 1);
}

#[test]
fn scenario_c_decompression_disabled_passes_wire_form_through() {
    let link = make_link(100);
    link.sender.borrow_mut().enable_compression();
    // Receiver deliberately left with decompression off.

    let payload = vec![b'q'; 300];
    assert!(link
        .sender
        .borrow_mut()
        .send(upper_packet(&payload), ADDR_B, UPPER_NET));
    link.scheduler.run();

    let frames = link.tap.frames.borrow();
    assert_eq!(wire_tag(&frames[0]), TAG_NET_COMPRESSED);

    let delivered = link.delivered.borrow();
    let (body, protocol, _) = &delivered[0];
    // Only the link header was removed; the payload is still encoded, yet
    // the reported protocol is the tag's upper-layer mapping.
    assert_eq!(body.as_ref(), &frames[0].as_bytes()[2..]);
    assert_eq!(*protocol, UPPER_NET);
    assert_eq!(link.receiver.borrow().stats().expanded_in, 0);
}

#[test]
fn scenario_d_queue_overflow_drops_without_state_change() {
    let link = make_link(1);

    // First send occupies the wire, second fills the single queue slot.
    assert!(link
        .sender
        .borrow_mut()
        .send(upper_packet(&[1u8; 64]), ADDR_B, UPPER_NET));
    assert!(link
        .sender
        .borrow_mut()
        .send(upper_packet(&[2u8; 64]), ADDR_B, UPPER_NET));

    let frames_before = link.tap.frames.borrow().len();
    let ok = link
        .sender
        .borrow_mut()
        .send(upper_packet(&[3u8; 64]), ADDR_B, UPPER_NET);
    assert!(!ok);
    assert_eq!(link.sender.borrow().stats().tx_dropped, 1);
    // Transmit state unchanged: still mid-frame, nothing new on the wire.
    assert!(link.sender.borrow().is_transmitting());
    assert_eq!(link.tap.frames.borrow().len(), frames_before);

    link.scheduler.run();
    assert_eq!(link.delivered.borrow().len(), 2);
}
