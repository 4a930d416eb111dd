//! Default bounded FIFO transmit queue.

use std::collections::VecDeque;

use linkpress_wire::Frame;

use crate::traits::TxQueue;

/// Drop-tail queue: refuses new frames once `capacity` frames are held.
#[derive(Debug)]
pub struct DropTailQueue {
    frames: VecDeque<Frame>,
    capacity: usize,
}

impl DropTailQueue {
    /// Default capacity, in frames.
    pub const DEFAULT_CAPACITY: usize = 100;

    pub fn new(capacity: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(capacity.min(Self::DEFAULT_CAPACITY)),
            capacity,
        }
    }
}

impl Default for DropTailQueue {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl TxQueue for DropTailQueue {
    fn enqueue(&mut self, frame: Frame) -> bool {
        if self.frames.len() >= self.capacity {
            return false;
        }
        self.frames.push_back(frame);
        true
    }

    fn dequeue(&mut self) -> Option<Frame> {
        self.frames.pop_front()
    }

    fn len(&self) -> usize {
        self.frames.len()
    }
}
