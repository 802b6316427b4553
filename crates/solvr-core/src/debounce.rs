//! Debounced remote checks (username availability and the like).
//!
//! A [`Debouncer`] is a plain state machine over caller-supplied instants:
//! feed it inputs, poll it, and it hands out at most one [`QueryTicket`]
//! per settled input. Results are only accepted for the newest ticket.

use std::time::{Duration, Instant};

use tracing::debug;

/// Default quiet period for interactive checks.
pub const DEFAULT_QUIET: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket<Q> {
    seq: u64,
    pub query: Q,
}

#[derive(Debug, Clone)]
pub struct Debouncer<Q> {
    quiet: Duration,
    pending: Option<(Q, Instant)>,
    seq: u64,
    issued: bool,
}

impl<Q: Clone + PartialEq> Debouncer<Q> {
    #[must_use]
    pub const fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            seq: 0,
            issued: false,
        }
    }

    /// Record a new input value. Re-entering the current value keeps its
    /// timer; anything else restarts it and invalidates outstanding tickets.
    pub fn input(&mut self, value: Q, now: Instant) {
        if self.pending.as_ref().is_some_and(|(current, _)| *current == value) {
            return;
        }
        self.seq += 1;
        self.issued = false;
        self.pending = Some((value, now));
    }

    /// The query to run, once the input has been stable for the quiet
    /// period. Yields at most once per input.
    pub fn poll(&mut self, now: Instant) -> Option<QueryTicket<Q>> {
        if self.issued {
            return None;
        }
        let (value, since) = self.pending.as_ref()?;
        if now.saturating_duration_since(*since) < self.quiet {
            return None;
        }
        self.issued = true;
        debug!(seq = self.seq, "debounced query ready");
        Some(QueryTicket {
            seq: self.seq,
            query: value.clone(),
        })
    }

    /// Accept `result` only if `ticket` is still the newest.
    pub fn resolve<R>(&self, ticket: &QueryTicket<Q>, result: R) -> Option<R> {
        if ticket.seq == self.seq {
            Some(result)
        } else {
            debug!(seq = ticket.seq, current = self.seq, "dropping stale query result");
            None
        }
    }

    /// Forget the input; every outstanding ticket goes stale.
    pub fn clear(&mut self) {
        self.seq += 1;
        self.pending = None;
        self.issued = false;
    }
}

impl<Q: Clone + PartialEq> Default for Debouncer<Q> {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(300);

    #[test]
    fn fires_once_after_quiet_period() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(QUIET);
        d.input("ali", t0);
        assert!(d.poll(t0 + Duration::from_millis(100)).is_none());
        let ticket = d.poll(t0 + QUIET).unwrap();
        assert_eq!(ticket.query, "ali");
        assert!(d.poll(t0 + QUIET * 3).is_none());
    }

    #[test]
    fn typing_restarts_the_timer() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(QUIET);
        d.input("al", t0);
        d.input("ali", t0 + Duration::from_millis(200));
        assert!(d.poll(t0 + QUIET).is_none());
        assert_eq!(
            d.poll(t0 + Duration::from_millis(500)).map(|t| t.query),
            Some("ali")
        );
    }

    #[test]
    fn same_value_keeps_the_timer() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(QUIET);
        d.input("ali", t0);
        d.input("ali", t0 + Duration::from_millis(200));
        assert!(d.poll(t0 + QUIET).is_some());
    }

    #[test]
    fn newer_input_makes_result_stale() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(QUIET);
        d.input("ali", t0);
        let old = d.poll(t0 + QUIET).unwrap();
        d.input("alice", t0 + QUIET);
        assert_eq!(d.resolve(&old, true), None);

        let fresh = d.poll(t0 + QUIET * 2).unwrap();
        assert_eq!(d.resolve(&fresh, false), Some(false));
    }

    #[test]
    fn clear_invalidates() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(QUIET);
        d.input(1_u32, t0);
        let ticket = d.poll(t0 + QUIET).unwrap();
        d.clear();
        assert!(d.resolve(&ticket, ()).is_none());
        assert!(d.poll(t0 + QUIET * 5).is_none());
    }
}
