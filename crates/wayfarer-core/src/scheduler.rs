//! A virtual-time queue of delayed tasks.
//!
//! The scheduler never looks at a wall clock. Callers move time forward with
//! [`Scheduler::advance`] and receive every task that came due, ordered by
//! due time and then by scheduling order.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Handle returned by [`Scheduler::schedule`], used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_seq: u64,
    queue: BTreeMap<(Duration, u64), T>,
    due_by_seq: HashMap<u64, Duration>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            queue: BTreeMap::new(),
            due_by_seq: HashMap::new(),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, delay: Duration, task: T) -> TaskHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        let due = self.now + delay;
        self.queue.insert((due, seq), task);
        self.due_by_seq.insert(seq, due);
        TaskHandle(seq)
    }

    /// Removes a pending task. Returns it if it had not fired yet.
    pub fn cancel(&mut self, handle: TaskHandle) -> Option<T> {
        let due = self.due_by_seq.remove(&handle.0)?;
        self.queue.remove(&(due, handle.0))
    }

    /// Drops every pending task, returning how many were removed.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.queue.len();
        self.queue.clear();
        self.due_by_seq.clear();
        count
    }

    /// Moves time forward by `by` and drains the tasks that came due.
    pub fn advance(&mut self, by: Duration) -> Vec<T> {
        self.now += by;
        let mut fired = Vec::new();
        while let Some(entry) = self.queue.first_entry() {
            let (due, seq) = *entry.key();
            if due > self.now {
                break;
            }
            fired.push(entry.remove());
            self.due_by_seq.remove(&seq);
        }
        fired
    }

    /// Time remaining until the earliest pending task, if any.
    pub fn next_due_in(&self) -> Option<Duration> {
        self.queue
            .keys()
            .next()
            .map(|(due, _)| due.saturating_sub(self.now))
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_tasks_fire_in_due_order() {
        let mut sched = Scheduler::new();
        sched.schedule(ms(1500), "arrive");
        sched.schedule(ms(50), "snap");

        assert!(sched.advance(ms(49)).is_empty());
        assert_eq!(sched.advance(ms(1)), vec!["snap"]);
        assert_eq!(sched.advance(ms(2000)), vec!["arrive"]);
        assert!(sched.is_idle());
    }

    #[test]
    fn test_same_due_time_keeps_insertion_order() {
        let mut sched = Scheduler::new();
        sched.schedule(ms(10), 1);
        sched.schedule(ms(10), 2);
        sched.schedule(ms(10), 3);
        assert_eq!(sched.advance(ms(10)), vec![1, 2, 3]);
    }

    #[test]
    fn test_delay_is_relative_to_current_time() {
        let mut sched = Scheduler::new();
        sched.advance(ms(100));
        sched.schedule(ms(50), "later");
        assert_eq!(sched.next_due_in(), Some(ms(50)));
        assert!(sched.advance(ms(49)).is_empty());
        assert_eq!(sched.advance(ms(1)), vec!["later"]);
        assert_eq!(sched.now(), ms(150));
    }

    #[test]
    fn test_cancel_removes_only_that_task() {
        let mut sched = Scheduler::new();
        let a = sched.schedule(ms(10), "a");
        sched.schedule(ms(20), "b");

        assert_eq!(sched.cancel(a), Some("a"));
        assert_eq!(sched.cancel(a), None);
        assert_eq!(sched.pending(), 1);
        assert_eq!(sched.advance(ms(30)), vec!["b"]);
    }

    #[test]
    fn test_cancel_after_fire_is_none() {
        let mut sched = Scheduler::new();
        let a = sched.schedule(ms(10), "a");
        sched.advance(ms(10));
        assert_eq!(sched.cancel(a), None);
    }

    #[test]
    fn test_cancel_all() {
        let mut sched = Scheduler::new();
        sched.schedule(ms(10), ());
        sched.schedule(ms(20), ());
        assert_eq!(sched.cancel_all(), 2);
        assert!(sched.advance(ms(100)).is_empty());
        assert_eq!(sched.next_due_in(), None);
    }
}
