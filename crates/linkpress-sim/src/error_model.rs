//! Deterministic receive-side error models.

use std::collections::HashSet;

use linkpress_device::ErrorModel;
use linkpress_wire::Frame;

/// Never flags anything.
#[derive(Debug, Default)]
pub struct NoErrorModel;

impl ErrorModel for NoErrorModel {
    fn is_corrupt(&mut self, _frame: &Frame) -> bool {
        false
    }
}

/// Flags inbound frames by arrival index (0-based).
///
/// Deterministic by construction, so tests can assert exactly which frames
/// are lost without seeding a random source.
#[derive(Debug)]
pub struct ListErrorModel {
    corrupt: HashSet<u64>,
    seen: u64,
}

impl ListErrorModel {
    pub fn new(indices: impl IntoIterator<Item = u64>) -> Self {
        Self {
            corrupt: indices.into_iter().collect(),
            seen: 0,
        }
    }

    /// Frames inspected so far.
    pub fn seen(&self) -> u64 {
        self.seen
    }
}

impl ErrorModel for ListErrorModel {
    fn is_corrupt(&mut self, _frame: &Frame) -> bool {
        let index = self.seen;
        self.seen += 1;
        self.corrupt.contains(&index)
    }
}
