use clap::{Args, Subcommand};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod simulate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a two-device link simulation and report stats.
    Simulate(SimulateArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Simulate(args) => simulate::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Number of payloads to send.
    #[arg(long, default_value_t = 10)]
    pub count: u64,

    /// Application payload size in bytes.
    #[arg(long, default_value_t = 512)]
    pub payload_size: usize,

    /// Payload fill: "text" compresses well, "cycle" poorly.
    #[arg(long, value_enum, default_value = "text")]
    pub fill: simulate::Fill,

    /// Enable payload compression on the sender.
    #[arg(long)]
    pub compress: bool,

    /// Disable payload decompression on the receiver.
    #[arg(long)]
    pub no_decompress: bool,

    /// Link data rate in bits per second.
    #[arg(long, default_value_t = 32_768)]
    pub data_rate: u64,

    /// One-way propagation delay in milliseconds.
    #[arg(long, default_value_t = 2)]
    pub delay_ms: u64,

    /// Interframe gap in microseconds.
    #[arg(long, default_value_t = 0)]
    pub gap_us: u64,

    /// Transmit queue capacity in frames.
    #[arg(long, default_value_t = 100)]
    pub queue_capacity: usize,

    /// Inbound frame indices the receiver's error model corrupts.
    #[arg(long, value_delimiter = ',')]
    pub corrupt: Vec<u64>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Print only the version number.
    #[arg(long)]
    pub short: bool,
}
