//! Device identity on the link.

use std::fmt;

/// A 6-byte MAC-style link address.
///
/// Point-to-point links need no address resolution; the address exists so
/// the upper-layer callback can name the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkAddress(pub [u8; 6]);

impl LinkAddress {
    /// The all-ones broadcast address.
    pub const BROADCAST: LinkAddress = LinkAddress([0xFF; 6]);

    pub fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for LinkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}
