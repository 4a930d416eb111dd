//! Logical-time event scheduler.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;
use std::time::Duration;

use linkpress_device::Scheduler;

struct Event {
    at: Duration,
    seq: u64,
    callback: Box<dyn FnOnce()>,
}

// Min-heap by (time, insertion order): ties fire in schedule order.
impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.at, other.seq).cmp(&(self.at, self.seq))
    }
}

#[derive(Default)]
struct Inner {
    now: Duration,
    next_seq: u64,
    heap: BinaryHeap<Event>,
}

/// Single-threaded logical clock driving timed callbacks.
///
/// Cloning yields another handle to the same clock. Events are
/// fire-and-forget: there is no cancellation, matching the device's
/// expectation that stale events fire as no-ops.
#[derive(Clone, Default)]
pub struct EventScheduler {
    inner: Rc<RefCell<Inner>>,
}

impl EventScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current logical time.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Run events until the heap empties. Returns the number processed.
    pub fn run(&self) -> usize {
        let mut processed = 0;
        while self.step() {
            processed += 1;
        }
        processed
    }

    /// Run events scheduled at or before `deadline`.
    pub fn run_until(&self, deadline: Duration) -> usize {
        let mut processed = 0;
        loop {
            let due = {
                let inner = self.inner.borrow();
                matches!(inner.heap.peek(), Some(event) if event.at <= deadline)
            };
            if !due || !self.step() {
                break;
            }
            processed += 1;
        }
        processed
    }

    /// Pop and run the earliest event, advancing the clock to it.
    fn step(&self) -> bool {
        // The borrow must end before the callback runs; callbacks schedule
        // new events through this same handle.
        let event = {
            let mut inner = self.inner.borrow_mut();
            match inner.heap.pop() {
                Some(event) => {
                    inner.now = event.at;
                    event
                }
                None => return false,
            }
        };
        (event.callback)();
        true
    }
}

impl Scheduler for EventScheduler {
    fn schedule_after(&self, delay: Duration, callback: Box<dyn FnOnce()>) {
        let mut inner = self.inner.borrow_mut();
        let at = inner.now + delay;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.heap.push(Event { at, seq, callback });
    }
}
