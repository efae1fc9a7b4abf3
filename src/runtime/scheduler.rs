use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerCommand<K, E> {
    /// Replace whatever is scheduled under `key` with `event`, due after `delay`.
    Debounce { key: K, delay: Duration, event: E },
    /// Drop whatever is scheduled under `key`. No-op when nothing is.
    Cancel { key: K },
}

#[derive(Debug, Clone)]
struct DelayedTask<K, E> {
    due_at: Instant,
    order: u64,
    key: K,
    event: E,
}

/// Keyed one-shot timers driven by an explicit clock.
///
/// At most one task is live per key; rescheduling drops the previous one.
#[derive(Debug)]
pub struct Scheduler<K, E> {
    delayed: Vec<DelayedTask<K, E>>,
    next_order: u64,
}

impl<K, E> Default for Scheduler<K, E> {
    fn default() -> Self {
        Self {
            delayed: Vec::new(),
            next_order: 0,
        }
    }
}

impl<K: Eq, E> Scheduler<K, E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, command: SchedulerCommand<K, E>, now: Instant) {
        match command {
            SchedulerCommand::Debounce { key, delay, event } => {
                self.delayed.retain(|task| task.key != key);
                let order = self.next_order;
                self.next_order = self.next_order.wrapping_add(1);
                self.delayed.push(DelayedTask {
                    due_at: now + delay,
                    order,
                    key,
                    event,
                });
            }
            SchedulerCommand::Cancel { key } => {
                self.delayed.retain(|task| task.key != key);
            }
        }
    }

    /// Removes and returns every task due at `now`, earliest first.
    pub fn drain_ready(&mut self, now: Instant) -> Vec<E> {
        let mut due = Vec::new();
        let mut idx = 0usize;
        while idx < self.delayed.len() {
            if self.delayed[idx].due_at <= now {
                due.push(self.delayed.swap_remove(idx));
            } else {
                idx += 1;
            }
        }

        due.sort_by_key(|task| (task.due_at, task.order));
        due.into_iter().map(|task| task.event).collect()
    }

    pub fn poll_timeout(&self, now: Instant, default_timeout: Duration) -> Duration {
        match self.next_due() {
            Some(due_at) => due_at.saturating_duration_since(now).min(default_timeout),
            None => default_timeout,
        }
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.delayed.iter().map(|task| task.due_at).min()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.delayed.iter().any(|task| &task.key == key)
    }

    pub fn pending_count(&self) -> usize {
        self.delayed.len()
    }
}
