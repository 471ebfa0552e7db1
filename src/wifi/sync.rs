//! Multi-bit event group.
//!
//! A FreeRTOS-style synchronization primitive: a word of flag bits that
//! threads can set, clear and wait on. Waiters block until any (or all) of
//! the bits they care about are set, or until a timeout elapses.

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Flag word type. Bits are caller-defined.
pub type EventBits = u32;

/// A shared flag word with blocking waits.
///
/// Many threads may set, clear and wait concurrently. Waits return the flag
/// snapshot observed at wake-up, so a caller can tell which bit ended the
/// wait.
#[derive(Debug, Default)]
pub struct EventGroup {
    bits: Mutex<EventBits>,
    wakeup: Condvar,
}

impl EventGroup {
    /// Create an event group with all bits clear.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the given bits and wake all waiters. Returns the new flag word.
    pub fn set(&self, bits: EventBits) -> EventBits {
        let mut cur = self.lock();
        *cur |= bits;
        self.wakeup.notify_all();
        *cur
    }

    /// Clear the given bits. Returns the new flag word.
    pub fn clear(&self, bits: EventBits) -> EventBits {
        let mut cur = self.lock();
        *cur &= !bits;
        *cur
    }

    /// Clear and set bits in one step, then wake all waiters.
    ///
    /// The combined update is atomic with respect to other threads: no
    /// observer can see both the old and new bits at once.
    pub fn replace(&self, clear: EventBits, set: EventBits) -> EventBits {
        let mut cur = self.lock();
        *cur &= !clear;
        *cur |= set;
        self.wakeup.notify_all();
        *cur
    }

    /// Snapshot the current flag word.
    pub fn get(&self) -> EventBits {
        *self.lock()
    }

    /// Block until any of `bits` is set, or `timeout` elapses.
    ///
    /// `None` waits forever; `Some(Duration::ZERO)` is a non-blocking
    /// snapshot check. Returns the flag word observed when the wait ended;
    /// on timeout none of the requested bits will be set in it.
    pub fn wait_any(&self, bits: EventBits, timeout: Option<Duration>) -> EventBits {
        self.wait(bits, false, timeout)
    }

    /// Block until all of `bits` are set, or `timeout` elapses.
    pub fn wait_all(&self, bits: EventBits, timeout: Option<Duration>) -> EventBits {
        self.wait(bits, true, timeout)
    }

    fn wait(
        &self,
        bits: EventBits,
        require_all: bool,
        timeout: Option<Duration>,
    ) -> EventBits {
        let satisfied = |cur: EventBits| {
            if require_all {
                cur & bits == bits
            } else {
                cur & bits != 0
            }
        };

        let mut cur = self.lock();
        match timeout {
            None => {
                while !satisfied(*cur) {
                    cur = self
                        .wakeup
                        .wait(cur)
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                }
                *cur
            }
            Some(limit) => {
                let deadline = Instant::now() + limit;
                while !satisfied(*cur) {
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    let (guard, _) = self
                        .wakeup
                        .wait_timeout(cur, deadline - now)
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                    cur = guard;
                }
                *cur
            }
        }
    }

    // Flag updates are trivial, so a poisoned mutex still holds a usable word.
    fn lock(&self) -> MutexGuard<'_, EventBits> {
        self.bits
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    const BIT_A: EventBits = 1 << 0;
    const BIT_B: EventBits = 1 << 1;

    #[test]
    fn test_set_get_clear() {
        let group = EventGroup::new();
        assert_eq!(group.get(), 0);
        assert_eq!(group.set(BIT_A), BIT_A);
        assert_eq!(group.set(BIT_B), BIT_A | BIT_B);
        assert_eq!(group.clear(BIT_A), BIT_B);
        assert_eq!(group.get(), BIT_B);
    }

    #[test]
    fn test_replace_is_combined() {
        let group = EventGroup::new();
        group.set(BIT_A);
        let after = group.replace(BIT_A, BIT_B);
        assert_eq!(after, BIT_B);
    }

    #[test]
    fn test_wait_any_returns_immediately_when_set() {
        let group = EventGroup::new();
        group.set(BIT_B);
        let bits = group.wait_any(BIT_A | BIT_B, Some(Duration::from_secs(5)));
        assert_ne!(bits & BIT_B, 0);
    }

    #[test]
    fn test_wait_any_zero_timeout_is_snapshot() {
        let group = EventGroup::new();
        let bits = group.wait_any(BIT_A, Some(Duration::ZERO));
        assert_eq!(bits & BIT_A, 0);

        group.set(BIT_A);
        let bits = group.wait_any(BIT_A, Some(Duration::ZERO));
        assert_ne!(bits & BIT_A, 0);
    }

    #[test]
    fn test_wait_any_times_out_without_bits() {
        let group = EventGroup::new();
        let start = Instant::now();
        let bits = group.wait_any(BIT_A, Some(Duration::from_millis(30)));
        assert_eq!(bits & BIT_A, 0);
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_wait_any_wakes_on_set_from_other_thread() {
        let group = Arc::new(EventGroup::new());
        let setter = Arc::clone(&group);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            setter.set(BIT_A);
        });
        let bits = group.wait_any(BIT_A, Some(Duration::from_secs(5)));
        assert_ne!(bits & BIT_A, 0);
        handle.join().unwrap();
    }

    #[test]
    fn test_wait_forever_wakes_on_set() {
        let group = Arc::new(EventGroup::new());
        let setter = Arc::clone(&group);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            setter.set(BIT_B);
        });
        let bits = group.wait_any(BIT_B, None);
        assert_ne!(bits & BIT_B, 0);
        handle.join().unwrap();
    }

    #[test]
    fn test_wait_all_requires_every_bit() {
        let group = EventGroup::new();
        group.set(BIT_A);
        let bits = group.wait_all(BIT_A | BIT_B, Some(Duration::from_millis(30)));
        assert_ne!(bits & BIT_A, 0);
        assert_eq!(bits & BIT_B, 0);

        group.set(BIT_B);
        let bits = group.wait_all(BIT_A | BIT_B, Some(Duration::from_secs(5)));
        assert_eq!(bits & (BIT_A | BIT_B), BIT_A | BIT_B);
    }
}
