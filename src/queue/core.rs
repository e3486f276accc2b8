//! # Queue core: bookkeeping, admission loop and readiness watchers.
//!
//! ```text
//! enqueue ──► pending (FIFO) ──admit()──► active ──watcher──► Executing ──settle()──► removed
//!                 ▲                          │                    │
//!                 └────── clear() drops ─────┘          stop() never interrupts
//! ```
//!
//! ## Rules
//! - Every mutation of `pending`/`active` happens under the state lock, in
//!   `enqueue`, `admit`, `readiness`, `settle`, `clear`; never from task code.
//! - An item is in exactly one of {pending, active} until it settles or is cleared.
//! - `active.len() <= concurrency` after every `admit()`.
//! - The job is taken under the state lock, after confirming the item is active
//!   and the queue is running. That is the only way a task body starts.
//! - The admission loop and all watchers of one run share a cancellation token;
//!   `stop()` cancels it.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::config::QueueConfig;
use super::context::QueueContext;
use super::item::{Item, Readiness};
use crate::events::{Bus, Event, EventKind};

#[derive(Default)]
pub(super) struct State {
    pub(super) pending: VecDeque<Arc<Item>>,
    pub(super) active: Vec<Arc<Item>>,
    /// `Some` while the admission loop runs.
    pub(super) run: Option<CancellationToken>,
}

impl State {
    fn contains(&self, id: u64) -> bool {
        self.is_active(id) || self.pending.iter().any(|i| i.id() == id)
    }

    fn is_active(&self, id: u64) -> bool {
        self.active.iter().any(|i| i.id() == id)
    }
}

/// Shared queue internals.
pub(super) struct Inner {
    pub(super) cfg: QueueConfig,
    pub(super) bus: Bus,
    pub(super) state: Mutex<State>,
    /// Wakes the admission loop.
    wake: Notify,
    next_id: AtomicU64,
}

impl Inner {
    pub(super) fn new(cfg: QueueConfig, bus: Bus) -> Self {
        Self {
            cfg,
            bus,
            state: Mutex::new(State::default()),
            wake: Notify::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub(super) fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Appends an item; spawns its watcher if the queue is running.
    pub(super) fn push(self: &Arc<Self>, item: Arc<Item>) {
        let run = {
            let mut st = self.state.lock();
            st.pending.push_back(Arc::clone(&item));
            st.run.clone()
        };
        self.bus
            .publish(Event::new(EventKind::ItemQueued).with_item(item.id()));

        if let Some(token) = run {
            self.spawn_watcher(item, token.child_token());
            self.wake.notify_one();
        }
    }

    /// Starts the admission loop; no-op while already running.
    pub(super) fn start(self: &Arc<Self>) {
        let (token, unstarted) = {
            let mut st = self.state.lock();
            if st.run.is_some() {
                return;
            }
            let token = CancellationToken::new();
            st.run = Some(token.clone());
            let unstarted: Vec<Arc<Item>> = st
                .pending
                .iter()
                .chain(st.active.iter())
                .filter(|i| i.is_unstarted())
                .cloned()
                .collect();
            (token, unstarted)
        };
        self.bus.publish(Event::new(EventKind::QueueStarted));

        let me = Arc::clone(self);
        let loop_token = token.clone();
        tokio::spawn(async move { me.admission_loop(loop_token).await });

        for item in unstarted {
            self.spawn_watcher(item, token.child_token());
        }
    }

    /// Halts admission and all readiness watchers. Running bodies continue.
    pub(super) fn stop(&self) {
        let (token, pending, active) = {
            let mut st = self.state.lock();
            let Some(token) = st.run.take() else {
                return;
            };
            (token, st.pending.len(), st.active.len())
        };
        token.cancel();
        self.bus
            .publish(Event::new(EventKind::QueueStopped).with_counts(pending, active));
    }

    /// Drops all bookkeeping. Unstarted jobs are dropped with their completion channel.
    pub(super) fn clear(&self) {
        let (pending, active) = {
            let mut st = self.state.lock();
            (std::mem::take(&mut st.pending), std::mem::take(&mut st.active))
        };
        self.bus.publish(
            Event::new(EventKind::QueueCleared).with_counts(pending.len(), active.len()),
        );

        for item in pending.iter().chain(active.iter()) {
            if item.take_job().is_some() {
                self.bus
                    .publish(Event::new(EventKind::ItemDiscarded).with_item(item.id()));
            }
            item.wake();
        }
    }

    pub(super) fn is_running(&self) -> bool {
        self.state.lock().run.is_some()
    }

    pub(super) fn contains(&self, id: u64) -> bool {
        self.state.lock().contains(id)
    }

    /// Removes a settled item from the active set and wakes the admission loop.
    pub(super) fn settle(&self, id: u64, failure: Option<&str>) {
        self.state.lock().active.retain(|i| i.id() != id);
        self.wake.notify_one();

        let ev = match failure {
            None => Event::new(EventKind::ItemCompleted),
            Some(reason) => Event::new(EventKind::ItemFailed).with_reason(reason),
        };
        self.bus.publish(ev.with_item(id));
    }

    /// Promotes pending items while there is room in the active set.
    fn admit(&self) {
        let promoted: Vec<Arc<Item>> = {
            let mut st = self.state.lock();
            if st.run.is_none() {
                return;
            }
            let mut promoted = Vec::new();
            while st.active.len() < self.cfg.concurrency {
                let Some(item) = st.pending.pop_front() else {
                    break;
                };
                st.active.push(Arc::clone(&item));
                promoted.push(item);
            }
            promoted
        };

        for item in promoted {
            self.bus
                .publish(Event::new(EventKind::ItemAdmitted).with_item(item.id()));
            item.wake();
        }
    }

    async fn admission_loop(self: Arc<Self>, token: CancellationToken) {
        let mut ticker = time::interval(self.cfg.next_actions_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            self.admit();
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
                _ = self.wake.notified() => {}
            }
        }
    }

    /// Decides, under the state lock, whether `item` may begin executing.
    fn readiness(&self, item: &Item) -> Readiness {
        let st = self.state.lock();
        if st.run.is_none() || !st.contains(item.id()) {
            return Readiness::Abandon;
        }
        if !st.is_active(item.id()) {
            return Readiness::Wait;
        }
        match item.take_job() {
            Some(job) => Readiness::Go(job),
            None => Readiness::Abandon,
        }
    }

    fn spawn_watcher(self: &Arc<Self>, item: Arc<Item>, token: CancellationToken) {
        let me = Arc::clone(self);
        tokio::spawn(async move { me.watch(item, token).await });
    }

    /// Waits until `item` is promoted, then runs it; exits early on stop/clear.
    async fn watch(self: Arc<Self>, item: Arc<Item>, token: CancellationToken) {
        loop {
            match self.readiness(&item) {
                Readiness::Go(job) => {
                    self.bus
                        .publish(Event::new(EventKind::ItemStarted).with_item(item.id()));
                    let ctx = QueueContext::new(item.id(), Arc::downgrade(&self));
                    drop(self);
                    job(ctx).await;
                    return;
                }
                Readiness::Abandon => return,
                Readiness::Wait => {}
            }
            tokio::select! {
                _ = token.cancelled() => return,
                _ = item.woken() => {}
                _ = time::sleep(self.cfg.action_interval) => {}
            }
        }
    }
}
