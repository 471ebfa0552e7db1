//! Station connection event bits.
//!
//! The connection state is published on a shared [`EventGroup`] as two bits:
//! [`CONNECTED_BIT`] and [`FAIL_BIT`]. At most one of the two is set at
//! steady state; both are clear while a connection attempt is in flight.

use std::sync::Arc;
use std::time::Duration;

use log::debug;

use super::sync::{EventBits, EventGroup};

/// Set once the station has associated and obtained an IP address.
pub const CONNECTED_BIT: EventBits = 1 << 0;

/// Set once the connection attempt has been given up on.
pub const FAIL_BIT: EventBits = 1 << 1;

/// Publisher/observer handle for the station event bits.
///
/// Clones share the same underlying event group, so one clone can publish
/// from the connection supervisor while others wait.
#[derive(Clone, Debug, Default)]
pub struct StationEvents {
    group: Arc<EventGroup>,
}

impl StationEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// The underlying event group, for callers that want to combine the
    /// station bits with waits of their own. Shared ownership; dropping the
    /// returned handle never invalidates other waiters.
    pub fn group(&self) -> Arc<EventGroup> {
        Arc::clone(&self.group)
    }

    /// Mark a connection attempt in flight: both bits clear.
    pub fn connecting(&self) {
        self.group.clear(CONNECTED_BIT | FAIL_BIT);
        debug!("station events: connecting");
    }

    /// Publish a successful connection. Clears FAIL in the same step.
    pub fn publish_connected(&self) {
        self.group.replace(FAIL_BIT, CONNECTED_BIT);
        debug!("station events: connected");
    }

    /// Publish a given-up connection. Clears CONNECTED in the same step.
    pub fn publish_failed(&self) {
        self.group.replace(CONNECTED_BIT, FAIL_BIT);
        debug!("station events: failed");
    }

    /// Non-blocking snapshot of the CONNECTED bit.
    pub fn is_connected(&self) -> bool {
        self.group.get() & CONNECTED_BIT != 0
    }

    /// Non-blocking snapshot of the FAIL bit.
    pub fn is_failed(&self) -> bool {
        self.group.get() & FAIL_BIT != 0
    }

    /// Block until the connection outcome is known or `timeout` elapses.
    ///
    /// Returns `true` only if CONNECTED was observed within the window.
    /// A FAIL publication ends the wait early rather than running out the
    /// clock, but still reports `false`. `None` waits forever;
    /// `Some(Duration::ZERO)` checks the current snapshot only.
    pub fn wait_connected(&self, timeout: Option<Duration>) -> bool {
        let bits = self.group.wait_any(CONNECTED_BIT | FAIL_BIT, timeout);
        bits & CONNECTED_BIT != 0
    }
}
