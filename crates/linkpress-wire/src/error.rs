/// Errors that can occur while parsing or building frames.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The buffer is shorter than the declared header sizes.
    #[error("malformed frame (need {needed} bytes, have {have})")]
    MalformedFrame { needed: usize, have: usize },

    /// The link-header protocol tag is outside the closed tag set.
    ///
    /// This is a configuration error, not a per-frame condition: a peer
    /// emitting unknown tags is misdeployed.
    #[error("unsupported link protocol tag {0:#06x}")]
    UnsupportedProtocol(u16),

    /// The upper-layer protocol number has no link-layer tag assigned.
    #[error("no link tag assigned for upper-layer protocol {0:#06x}")]
    UnsupportedUpperProtocol(u16),

    /// A declared-length field cannot represent the actual payload size.
    #[error("frame too large for length field ({len} bytes, max {max})")]
    Oversize { len: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, WireError>;
