/// Errors that can occur while transforming payloads.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The input does not parse as a previously encoded payload.
    ///
    /// Distinct from medium-level corruption so drops can be attributed
    /// correctly in traces.
    #[error("corrupt payload: {0}")]
    CorruptPayload(&'static str),

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, CodecError>;
