//! In-memory point-to-point medium.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use linkpress_device::{Channel, Device, LinkAddress, Scheduler};
use linkpress_wire::Frame;
use tracing::debug;

use crate::scheduler::EventScheduler;

struct Endpoint {
    address: LinkAddress,
    device: Weak<RefCell<Device>>,
}

/// A two-device wire with a fixed propagation delay.
///
/// `begin_transmission` models the sender's serialization time plus the
/// propagation delay: the peer's `receive` runs at
/// `now + tx_time + delay`. Transmission is refused while the peer half is
/// not attached.
pub struct PointToPointChannel {
    scheduler: EventScheduler,
    delay: Duration,
    endpoints: RefCell<Vec<Endpoint>>,
}

impl PointToPointChannel {
    pub fn new(scheduler: EventScheduler, delay: Duration) -> Rc<Self> {
        Rc::new(Self {
            scheduler,
            delay,
            endpoints: RefCell::new(Vec::with_capacity(2)),
        })
    }

    /// Attach a device to this channel and bring its link up.
    ///
    /// # Panics
    ///
    /// Panics if two devices are already attached, or if the device's
    /// address collides with the already-attached peer.
    pub fn attach(self: &Rc<Self>, device: &Rc<RefCell<Device>>) {
        let address = device.borrow().address();
        {
            let mut endpoints = self.endpoints.borrow_mut();
            assert!(
                endpoints.len() < 2,
                "point-to-point channel carries exactly two devices"
            );
            assert!(
                endpoints.iter().all(|ep| ep.address != address),
                "both devices on a link must have distinct addresses"
            );
            endpoints.push(Endpoint {
                address,
                device: Rc::downgrade(device),
            });
        }
        device
            .borrow_mut()
            .attach(Rc::clone(self) as Rc<dyn Channel>);
        debug!(%address, "device attached to channel");
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Channel for PointToPointChannel {
    fn begin_transmission(&self, frame: Frame, source: LinkAddress, tx_time: Duration) -> bool {
        let endpoints = self.endpoints.borrow();
        let Some(peer) = endpoints.iter().find(|ep| ep.address != source) else {
            return false;
        };

        let device = peer.device.clone();
        self.scheduler.schedule_after(
            tx_time + self.delay,
            Box::new(move || {
                // A torn-down peer just loses the frame on the floor.
                if let Some(device) = device.upgrade() {
                    device.borrow_mut().receive(frame);
                }
            }),
        );
        true
    }

    fn peer_address(&self, local: LinkAddress) -> Option<LinkAddress> {
        self.endpoints
            .borrow()
            .iter()
            .find(|ep| ep.address != local)
            .map(|ep| ep.address)
    }
}
