//! Delay before taking a screenshot

use std::thread;
use std::time::Duration;

/// Remaining whole seconds of a countdown, highest first
///
/// `Countdown::new(3)` yields 3, 2, 1.
#[derive(Clone, Debug)]
pub struct Countdown {
    remaining: u32,
}

impl Countdown {
    pub fn new(seconds: u32) -> Self {
        Self { remaining: seconds }
    }
}

impl Iterator for Countdown {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.remaining;
        self.remaining -= 1;
        Some(current)
    }
}

/// Block for `seconds`, calling `on_tick` with the remaining time once per second
pub fn wait(seconds: u32, mut on_tick: impl FnMut(u32)) {
    for remaining in Countdown::new(seconds) {
        on_tick(remaining);
        thread::sleep(Duration::from_secs(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_values() {
        assert_eq!(Countdown::new(3).collect::<Vec<_>>(), vec![3, 2, 1]);
        assert_eq!(Countdown::new(0).count(), 0);
    }

    #[test]
    fn test_zero_delay_returns_immediately() {
        let mut ticks = 0;
        wait(0, |_| ticks += 1);
        assert_eq!(ticks, 0);
    }
}
