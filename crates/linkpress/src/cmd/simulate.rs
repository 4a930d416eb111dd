use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use clap::ValueEnum;
use linkpress_codec::DeflateCodec;
use linkpress_device::{Device, DeviceConfig, DropTailQueue, LinkAddress};
use linkpress_sim::{EventScheduler, ListErrorModel, PointToPointChannel};
use linkpress_wire::{HeaderChain, NetworkHeader, SeqHeader, TransportHeader, UPPER_NET};

use crate::cmd::SimulateArgs;
use crate::exit::{self, CliError, CliResult};
use crate::output::{print_report, OutputFormat, SimReport};

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum Fill {
    /// Repeating ASCII text; compresses well.
    Text,
    /// Byte counter; compresses poorly.
    Cycle,
}

pub fn run(args: SimulateArgs, format: OutputFormat) -> CliResult<i32> {
    if args.payload_size == 0 {
        return Err(CliError::new(exit::USAGE, "payload size must be non-zero"));
    }
    if args.payload_size > 1500 - HeaderChain::SIZE {
        return Err(CliError::new(
            exit::DATA_INVALID,
            format!(
                "payload size {} exceeds what fits under the default MTU",
                args.payload_size
            ),
        ));
    }

    let scheduler = EventScheduler::new();
    let channel =
        PointToPointChannel::new(scheduler.clone(), Duration::from_millis(args.delay_ms));

    let sender = build_device(&args, &scheduler, [2, 0, 0, 0, 0, 1]);
    let receiver = build_device(&args, &scheduler, [2, 0, 0, 0, 0, 2]);
    channel.attach(&sender);
    channel.attach(&receiver);

    if args.compress {
        sender.borrow_mut().enable_compression();
    }
    if !args.no_decompress {
        receiver.borrow_mut().enable_decompression();
    }
    if !args.corrupt.is_empty() {
        receiver
            .borrow_mut()
            .set_error_model(Box::new(ListErrorModel::new(args.corrupt.iter().copied())));
    }

    let delivered = Rc::new(RefCell::new(0u64));
    let sink = Rc::clone(&delivered);
    receiver
        .borrow_mut()
        .set_receive_callback(Box::new(move |_, _, _| {
            *sink.borrow_mut() += 1;
        }));

    let payload = fill_payload(args.fill, args.payload_size);
    let dest = receiver.borrow().address();
    let mut accepted = 0u64;
    for seq in 0..args.count {
        let chain = HeaderChain {
            network: NetworkHeader::new(0x0A00_0001, 0x0A00_0002),
            transport: TransportHeader::new(49152, 9),
            seq: SeqHeader::new(seq as u32, scheduler.now().as_nanos() as u64),
        };
        let upper = chain
            .rebuild(&payload)
            .map_err(|err| CliError::new(exit::DATA_INVALID, err.to_string()))?;
        if sender.borrow_mut().send(upper, dest, UPPER_NET) {
            accepted += 1;
        }
    }

    scheduler.run();

    let report = SimReport {
        payload_bytes: args.payload_size,
        frames_requested: args.count,
        frames_accepted: accepted,
        frames_delivered: *delivered.borrow(),
        elapsed_ms: scheduler.now().as_millis(),
        sender: sender.borrow().stats().into(),
        receiver: receiver.borrow().stats().into(),
    };
    print_report(&report, format);
    Ok(exit::SUCCESS)
}

fn build_device(
    args: &SimulateArgs,
    scheduler: &EventScheduler,
    octets: [u8; 6],
) -> Rc<RefCell<Device>> {
    let config = DeviceConfig {
        address: LinkAddress::new(octets),
        data_rate_bps: args.data_rate,
        interframe_gap: Duration::from_micros(args.gap_us),
        ..DeviceConfig::default()
    };
    Device::new(
        config,
        Box::new(DeflateCodec::new()),
        Box::new(DropTailQueue::new(args.queue_capacity)),
        Box::new(scheduler.clone()),
    )
}

fn fill_payload(fill: Fill, size: usize) -> Vec<u8> {
    match fill {
        Fill::Text => b"the quick brown fox jumps over the lazy dog "
            .iter()
            .copied()
            .cycle()
            .take(size)
            .collect(),
        Fill::Cycle => (0..size).map(|i| (i % 251) as u8).collect(),
    }
}
