//! Millisecond clocks for scheduling
//!
//! Timestamps are `u32` milliseconds that wrap around after about 49 days.
//! Deadlines are compared with [`is_due`], which stays correct across the
//! wrap as long as a deadline is never more than ~24 days away.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic millisecond counter.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

/// `true` once `now` has reached `deadline`, tolerating wraparound.
///
/// # Example
/// ```
/// use rtttl::clock::is_due;
///
/// assert!(is_due(100, 100));
/// assert!(!is_due(99, 100));
/// assert!(is_due(5, u32::MAX - 5));
/// ```
pub fn is_due(now: u32, deadline: u32) -> bool {
    now.wrapping_sub(deadline) as i32 >= 0
}

/// Wall clock counting from its creation.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u32 {
        // Truncation is the intended wraparound
        self.origin.elapsed().as_millis() as u32
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u32>>,
}

impl ManualClock {
    pub fn starting_at(now: u32) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
        }
    }

    pub fn set(&self, now: u32) {
        self.now.set(now);
    }

    pub fn advance(&self, millis: u32) {
        self.now.set(self.now.get().wrapping_add(millis));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_due_across_wrap() {
        let deadline = u32::MAX - 10;
        assert!(!is_due(u32::MAX - 11, deadline));
        assert!(is_due(u32::MAX, deadline));
        assert!(is_due(0, deadline));
        assert!(is_due(20, deadline));
    }

    #[test]
    fn test_manual_clock_shared() {
        let clock = ManualClock::starting_at(10);
        let handle = clock.clone();
        handle.advance(5);
        assert_eq!(clock.now_ms(), 15);
        handle.set(u32::MAX);
        handle.advance(2);
        assert_eq!(clock.now_ms(), 1);
    }
}
