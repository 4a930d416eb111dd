use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use linkpress_device::LinkStats;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
pub struct StatsOutput {
    pub tx_frames: u64,
    pub tx_bytes: u64,
    pub tx_dropped: u64,
    pub rx_frames: u64,
    pub rx_bytes: u64,
    pub rx_dropped: u64,
    pub rx_corrupt: u64,
    pub compressed_out: u64,
    pub expanded_in: u64,
}

impl From<LinkStats> for StatsOutput {
    fn from(stats: LinkStats) -> Self {
        Self {
            tx_frames: stats.tx_frames,
            tx_bytes: stats.tx_bytes,
            tx_dropped: stats.tx_dropped,
            rx_frames: stats.rx_frames,
            rx_bytes: stats.rx_bytes,
            rx_dropped: stats.rx_dropped,
            rx_corrupt: stats.rx_corrupt,
            compressed_out: stats.compressed_out,
            expanded_in: stats.expanded_in,
        }
    }
}

#[derive(Serialize)]
pub struct SimReport {
    pub payload_bytes: usize,
    pub frames_requested: u64,
    pub frames_accepted: u64,
    pub frames_delivered: u64,
    pub elapsed_ms: u128,
    pub sender: StatsOutput,
    pub receiver: StatsOutput,
}

pub fn print_report(report: &SimReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["", "SENDER", "RECEIVER"]);
            for (label, tx, rx) in [
                ("frames out", report.sender.tx_frames, report.receiver.tx_frames),
                ("bytes out", report.sender.tx_bytes, report.receiver.tx_bytes),
                ("tx dropped", report.sender.tx_dropped, report.receiver.tx_dropped),
                ("frames in", report.sender.rx_frames, report.receiver.rx_frames),
                ("bytes in", report.sender.rx_bytes, report.receiver.rx_bytes),
                ("rx dropped", report.sender.rx_dropped, report.receiver.rx_dropped),
                ("rx corrupt", report.sender.rx_corrupt, report.receiver.rx_corrupt),
                (
                    "compressed out",
                    report.sender.compressed_out,
                    report.receiver.compressed_out,
                ),
                (
                    "expanded in",
                    report.sender.expanded_in,
                    report.receiver.expanded_in,
                ),
            ] {
                table.add_row(vec![label.to_string(), tx.to_string(), rx.to_string()]);
            }
            println!("{table}");
            println!(
                "delivered {}/{} frames of {} payload bytes in {} ms simulated",
                report.frames_delivered,
                report.frames_requested,
                report.payload_bytes,
                report.elapsed_ms
            );
        }
        OutputFormat::Pretty => {
            println!(
                "requested={} accepted={} delivered={} payload={}B elapsed={}ms tx_bytes={} rx_dropped={}",
                report.frames_requested,
                report.frames_accepted,
                report.frames_delivered,
                report.payload_bytes,
                report.elapsed_ms,
                report.sender.tx_bytes,
                report.receiver.rx_dropped
            );
        }
    }
}
