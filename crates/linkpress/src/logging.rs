use clap::ValueEnum;
use tracing::level_filters::LevelFilter;

/// Environment override for the log filter; wins over `--log-level`.
const LOG_ENV: &str = "LINKPRESS_LOG";

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

fn resolve_filter(env_value: Option<String>, level: LogLevel) -> LevelFilter {
    env_value
        .and_then(|value| value.parse().ok())
        .unwrap_or_else(|| level.filter())
}

/// Install the stderr subscriber for this process.
///
/// Timestamps are suppressed: events here are keyed to simulated time, and
/// wall-clock stamps only mislead.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let filter = resolve_filter(std::env::var(LOG_ENV).ok(), level);

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(filter)
        .with_ansi(false)
        .with_target(false)
        .without_time();

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}
