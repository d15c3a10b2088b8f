//! Tick-driven deferred work.
//!
//! Delayed steps of a round (finishing a roll, revealing the opponent) are
//! queued here with the [`RoundToken`] that was current when they were
//! scheduled. The scheduler only keeps time; deciding whether a task is stale
//! is left to the owner, which compares the token against its own.

use serde::{Deserialize, Serialize};

/// Identifies the round and roll a piece of deferred work belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RoundToken {
    pub round: u64,
    pub roll: u64,
}

impl RoundToken {
    pub fn new(round: u64, roll: u64) -> Self {
        Self { round, roll }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SchedulerStats {
    pub scheduled: u64,
    pub fired: u64,
    pub cancelled: u64,
}

#[derive(Debug, Clone)]
struct Scheduled<T> {
    due: f64,
    seq: u64,
    token: RoundToken,
    task: T,
}

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: f64,
    next_seq: u64,
    queue: Vec<Scheduled<T>>,
    stats: SchedulerStats,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: 0.0,
            next_seq: 0,
            queue: Vec::new(),
            stats: SchedulerStats::default(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds elapsed since the scheduler was created.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    pub fn schedule(&mut self, delay: f32, token: RoundToken, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.stats.scheduled += 1;
        self.queue.push(Scheduled {
            due: self.now + f64::from(delay.max(0.0)),
            seq,
            token,
            task,
        });
    }

    /// Moves time forward and returns the tasks that came due, oldest first.
    pub fn advance(&mut self, dt: f32) -> Vec<(RoundToken, T)> {
        self.now += f64::from(dt.max(0.0));
        let now = self.now;
        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.queue.drain(..).partition(|s| s.due <= now + 1e-9);
        self.queue = rest;
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));
        self.stats.fired += due.len() as u64;
        due.into_iter().map(|s| (s.token, s.task)).collect()
    }

    /// Drops every pending task; returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.queue.len();
        self.queue.clear();
        self.stats.cancelled += n as u64;
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_fire_in_due_order_once() {
        let mut s = Scheduler::new();
        let t = RoundToken::new(1, 1);
        s.schedule(0.5, t, "reveal");
        s.schedule(0.1, t, "finish");
        assert!(s.advance(0.05).is_empty());
        assert_eq!(s.advance(0.05), vec![(t, "finish")]);
        assert_eq!(s.pending(), 1);
        assert_eq!(s.advance(1.0), vec![(t, "reveal")]);
        assert!(s.advance(1.0).is_empty());
        assert_eq!(s.stats().fired, 2);
    }

    #[test]
    fn simultaneous_tasks_keep_insertion_order() {
        let mut s = Scheduler::new();
        let t = RoundToken::default();
        s.schedule(0.0, t, 1);
        s.schedule(0.0, t, 2);
        assert_eq!(s.advance(0.0), vec![(t, 1), (t, 2)]);
    }

    #[test]
    fn cancel_all_empties_the_queue() {
        let mut s = Scheduler::new();
        s.schedule(1.0, RoundToken::new(2, 3), ());
        s.schedule(2.0, RoundToken::new(2, 3), ());
        assert_eq!(s.cancel_all(), 2);
        assert!(s.advance(5.0).is_empty());
        assert_eq!(s.stats().cancelled, 2);
    }
}
