//! Counting of candidates passing and failing a selection
//!
//! Candidates may be evaluated from several threads at once, so the counters
//! are atomic and shared by reference.

use std::{
    fmt,
    sync::atomic::{AtomicUsize, Ordering},
};

/// Number of candidates which passed and failed a selection
#[derive(Debug, Default)]
pub struct PassFailTally {
    nr_pass: AtomicUsize,
    nr_fail: AtomicUsize,
}
//
impl PassFailTally {
    /// Start with no candidate counted
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one candidate
    pub fn record(&self, passed: bool) {
        let counter = if passed { &self.nr_pass } else { &self.nr_fail };
        // Counters are only read once all candidates have been recorded
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Add the counts of another tally to ours
    pub fn merge(&self, other: &PassFailTally) {
        self.nr_pass.fetch_add(other.nr_pass(), Ordering::Relaxed);
        self.nr_fail.fetch_add(other.nr_fail(), Ordering::Relaxed);
    }

    /// Number of candidates which passed
    pub fn nr_pass(&self) -> usize {
        self.nr_pass.load(Ordering::Relaxed)
    }

    /// Number of candidates which failed
    pub fn nr_fail(&self) -> usize {
        self.nr_fail.load(Ordering::Relaxed)
    }

    /// Number of candidates counted
    pub fn total(&self) -> usize {
        self.nr_pass() + self.nr_fail()
    }
}

impl fmt::Display for PassFailTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "nr eles pass {} / {}", self.nr_pass(), self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn counts_and_display() {
        let tally = PassFailTally::new();
        tally.record(true);
        tally.record(false);
        tally.record(true);
        assert_eq!(tally.nr_pass(), 2);
        assert_eq!(tally.nr_fail(), 1);
        assert_eq!(tally.to_string(), "nr eles pass 2 / 3");

        let other = PassFailTally::new();
        other.record(false);
        tally.merge(&other);
        assert_eq!(tally.total(), 4);
    }

    #[test]
    fn concurrent_recording() {
        let tally = PassFailTally::new();
        thread::scope(|scope| {
            for worker in 0..4 {
                let tally = &tally;
                scope.spawn(move || {
                    for candidate in 0..1000 {
                        tally.record((candidate + worker) % 4 == 0);
                    }
                });
            }
        });
        assert_eq!(tally.nr_pass(), 1000);
        assert_eq!(tally.nr_fail(), 3000);
    }
}
