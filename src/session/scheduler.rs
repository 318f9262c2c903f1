use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Recurring one-second timer owned by a session. Every schedule returns a
/// fresh id so fires from a cancelled timer can be told apart.
pub trait Scheduler {
    fn schedule_every_second(&mut self) -> TimerId;
    fn cancel(&mut self, id: TimerId);
}

/// Records scheduling without any clock; tests drive `tick()` themselves.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    active: HashSet<TimerId>,
    cancelled: Vec<TimerId>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.active.contains(&id)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn cancelled(&self) -> &[TimerId] {
        &self.cancelled
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_every_second(&mut self) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.active.insert(id);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if self.active.remove(&id) {
            self.cancelled.push(id);
        }
    }
}

/// Tokio-backed timers. Each timer is a task that posts its id on the
/// shared channel once per second until aborted.
pub struct TokioScheduler {
    next_id: u64,
    tx: UnboundedSender<TimerId>,
    tasks: HashMap<TimerId, JoinHandle<()>>,
}

impl TokioScheduler {
    /// Must be called from within a tokio runtime.
    pub fn new() -> (Self, UnboundedReceiver<TimerId>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                next_id: 0,
                tx,
                tasks: HashMap::new(),
            },
            rx,
        )
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_every_second(&mut self) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let tx = self.tx.clone();
        let period = Duration::from_secs(1);
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if tx.send(id).is_err() {
                    break;
                }
            }
        });
        self.tasks.insert(id, handle);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(handle) = self.tasks.remove(&id) {
            handle.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_scheduler_hands_out_fresh_ids() {
        let mut scheduler = ManualScheduler::new();
        let first = scheduler.schedule_every_second();
        scheduler.cancel(first);
        let second = scheduler.schedule_every_second();

        assert_ne!(first, second);
        assert!(!scheduler.is_active(first));
        assert!(scheduler.is_active(second));
        assert_eq!(scheduler.cancelled(), &[first]);

        scheduler.cancel(first);
        assert_eq!(scheduler.cancelled().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_timer_fires_every_second_until_cancelled() {
        let (mut scheduler, mut rx) = TokioScheduler::new();
        let id = scheduler.schedule_every_second();

        tokio::time::advance(Duration::from_millis(1001)).await;
        assert_eq!(rx.recv().await, Some(id));
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(rx.recv().await, Some(id));

        scheduler.cancel(id);
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_secs(3)).await;
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }
}
