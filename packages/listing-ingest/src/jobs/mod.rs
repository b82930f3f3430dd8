//! Job generation and scheduling.
//!
//! - `JobGenerator` expands a search into its ordered cross product of jobs
//! - `Scheduler` runs the queue one job at a time with politeness pacing and
//!   grows it with continuation jobs as pages report more results

pub mod generator;
pub mod scheduler;

pub use generator::{craigslist_url, facebook_url, JobGenerator};
pub use scheduler::{JobHandler, JobOutcome, Scheduler, SchedulerReport};

/// Monotonic job id source for one run.
///
/// Ids start at 1 and are never handed out twice.
#[derive(Debug, Clone)]
pub struct JidCounter {
    next: u64,
}

impl Default for JidCounter {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl JidCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next id.
    pub fn next_jid(&mut self) -> u64 {
        let jid = self.next;
        self.next += 1;
        jid
    }

    /// The id the next call to `next_jid` returns.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jid_counter_is_strictly_increasing() {
        let mut jids = JidCounter::new();
        assert_eq!(jids.peek(), 1);
        let taken: Vec<u64> = (0..4).map(|_| jids.next_jid()).collect();
        assert_eq!(taken, vec![1, 2, 3, 4]);
        assert_eq!(jids.peek(), 5);
    }
}
