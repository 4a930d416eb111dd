use linkpress_codec::CodecError;
use linkpress_wire::WireError;

/// Errors surfaced by the device pipeline.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Frame parsing or building failed.
    #[error("wire error: {0}")]
    Wire(#[from] WireError),

    /// Payload transform failed.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

pub type Result<T> = std::result::Result<T, DeviceError>;

/// Why a frame was dropped instead of forwarded.
///
/// Per-frame conditions only; they are counted, traced, and swallowed.
/// Invariant breaks (transmitting while busy) are not drops — they panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The device is not attached to a channel.
    LinkDown,
    /// The payload exceeds the device MTU.
    OversizePayload,
    /// The buffer is shorter than the declared header sizes.
    MalformedFrame,
    /// The error model flagged the frame, or codec decode failed.
    CorruptPayload,
    /// The transmit queue refused the frame.
    QueueOverflow,
    /// The medium refused the transmission.
    ChannelRefused,
    /// The protocol tag or number is outside the closed set.
    UnsupportedProtocol,
}

impl DropReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DropReason::LinkDown => "link-down",
            DropReason::OversizePayload => "oversize-payload",
            DropReason::MalformedFrame => "malformed-frame",
            DropReason::CorruptPayload => "corrupt-payload",
            DropReason::QueueOverflow => "queue-overflow",
            DropReason::ChannelRefused => "channel-refused",
            DropReason::UnsupportedProtocol => "unsupported-protocol",
        }
    }
}

impl DeviceError {
    /// Classify an error as a drop reason for stats and traces.
    pub fn drop_reason(&self) -> DropReason {
        match self {
            DeviceError::Wire(WireError::MalformedFrame { .. })
            | DeviceError::Wire(WireError::Oversize { .. }) => DropReason::MalformedFrame,
            DeviceError::Wire(WireError::UnsupportedProtocol(_))
            | DeviceError::Wire(WireError::UnsupportedUpperProtocol(_)) => {
                DropReason::UnsupportedProtocol
            }
            DeviceError::Codec(CodecError::CorruptPayload(_))
            | DeviceError::Codec(CodecError::PayloadTooLarge { .. }) => DropReason::CorruptPayload,
        }
    }
}
