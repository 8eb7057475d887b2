//! # Fibonacci Backoff
//!
//! Requeue delays for objects whose reconciliation keeps failing. Delays
//! grow along the Fibonacci sequence, which is gentler than doubling:
//! with a 15s minimum and 600s cap the sequence is
//! 15s, 15s, 30s, 45s, 75s, 120s, 195s, 315s, 510s, 600s, 600s, ...

use std::time::Duration;

/// Fibonacci backoff calculator, one per failing object.
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    min_secs: u64,
    prev_secs: u64,
    current_secs: u64,
    max_secs: u64,
}

impl FibonacciBackoff {
    /// Sequence starting at `min_secs` (twice) and capped at `max_secs`.
    #[must_use]
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            min_secs,
            prev_secs: 0,
            current_secs: min_secs.min(max_secs),
            max_secs,
        }
    }

    /// Returns the current delay and advances the sequence.
    pub fn next_backoff_seconds(&mut self) -> u64 {
        let result = self.current_secs;
        let next = self.prev_secs.saturating_add(self.current_secs);
        self.prev_secs = self.current_secs;
        self.current_secs = next.min(self.max_secs);
        result
    }

    #[must_use]
    pub fn next_backoff(&mut self) -> Duration {
        Duration::from_secs(self.next_backoff_seconds())
    }

    /// Back to the start of the sequence.
    pub fn reset(&mut self) {
        self.prev_secs = 0;
        self.current_secs = self.min_secs.min(self.max_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fibonacci_backoff_sequence() {
        let mut backoff = FibonacciBackoff::new(15, 600);
        let delays: Vec<u64> = (0..12).map(|_| backoff.next_backoff_seconds()).collect();
        assert_eq!(
            delays,
            [15, 15, 30, 45, 75, 120, 195, 315, 510, 600, 600, 600]
        );
    }

    #[test]
    fn test_fibonacci_backoff_reset() {
        let mut backoff = FibonacciBackoff::new(1, 10);
        assert_eq!(backoff.next_backoff_seconds(), 1);
        assert_eq!(backoff.next_backoff_seconds(), 1);
        assert_eq!(backoff.next_backoff_seconds(), 2);
        assert_eq!(backoff.next_backoff_seconds(), 3);

        backoff.reset();

        assert_eq!(backoff.next_backoff(), Duration::from_secs(1));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(1));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(2));
    }

    #[test]
    fn test_min_above_max_is_capped() {
        let mut backoff = FibonacciBackoff::new(60, 10);
        assert_eq!(backoff.next_backoff_seconds(), 10);
        assert_eq!(backoff.next_backoff_seconds(), 10);
    }
}
