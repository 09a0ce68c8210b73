use std::fmt;
use std::ops::Add;
use std::time::Duration;

/// A point on the scheduler's logical clock.
///
/// Virtual time starts at the scheduler's configured start time and only
/// moves forward when a macrotask fires (or when the clock is advanced
/// explicitly). It has no relation to wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct VirtualTime(Duration);

impl VirtualTime {
    /// The scheduler epoch.
    pub const ZERO: VirtualTime = VirtualTime(Duration::ZERO);

    /// Creates an instant `millis` milliseconds after the epoch.
    pub const fn from_millis(millis: u64) -> Self {
        VirtualTime(Duration::from_millis(millis))
    }

    /// Time elapsed since the epoch.
    pub const fn since_epoch(self) -> Duration {
        self.0
    }

    /// Whole milliseconds elapsed since the epoch.
    pub fn as_millis(self) -> u128 {
        self.0.as_millis()
    }

    /// Time elapsed from `earlier` to `self`, or zero if `earlier` is later.
    pub fn saturating_duration_since(self, earlier: VirtualTime) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<Duration> for VirtualTime {
    type Output = VirtualTime;

    fn add(self, delay: Duration) -> VirtualTime {
        VirtualTime(self.0.saturating_add(delay))
    }
}

impl fmt::Display for VirtualTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adding_a_delay_moves_forward() {
        let t = VirtualTime::from_millis(100) + Duration::from_millis(50);

        assert_eq!(t, VirtualTime::from_millis(150));
        assert_eq!(t.to_string(), "150ms");
    }

    #[test]
    fn duration_since_saturates() {
        let early = VirtualTime::from_millis(10);
        let late = VirtualTime::from_millis(40);

        assert_eq!(late.saturating_duration_since(early), Duration::from_millis(30));
        assert_eq!(early.saturating_duration_since(late), Duration::ZERO);
    }
}
