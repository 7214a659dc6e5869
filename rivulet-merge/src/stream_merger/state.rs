// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::serialized::SerializedDownstream;
use crate::{MergeOptions, PendingDemand};
use parking_lot::Mutex;
use rivulet_core::{add_demand, debug, trace, RivuletError, Signal, Subscriber, Subscription};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

enum Slot {
    /// Subscribed to, `on_subscribe` not seen yet
    Pending,
    Active(Arc<dyn Subscription>),
    Terminated,
}

struct UpstreamTable {
    slots: Vec<Slot>,
    /// Cumulative demand requested by the downstream so far.
    requested: u64,
    /// Set once the merge is over; no subscription is registered or requested from afterwards.
    closed: bool,
}

impl UpstreamTable {
    /// Closes the table and takes every live subscription out of it, except the one
    /// at `skip`. Each subscription can be taken only once.
    fn close(&mut self, skip: Option<usize>) -> Vec<Arc<dyn Subscription>> {
        self.closed = true;
        let mut live = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Slot::Active(subscription) = std::mem::replace(slot, Slot::Terminated) {
                if Some(index) != skip {
                    live.push(subscription);
                }
            }
        }
        live
    }
}

/// State shared by the merged subscription and every upstream adapter of one
/// active merge.
///
/// Adapters refer to their slot by index; this state never owns the adapters.
pub(crate) struct MergeState<T> {
    options: MergeOptions,
    downstream: SerializedDownstream<T>,
    upstreams: Mutex<UpstreamTable>,
    /// Upstreams that have not completed yet.
    remaining: AtomicUsize,
    /// Terminal latch: set by the single winner of error, completion or cancellation.
    terminated: AtomicBool,
    cancelled: AtomicBool,
}

impl<T> MergeState<T> {
    pub(crate) fn new(
        downstream: Arc<dyn Subscriber<T>>,
        upstream_count: usize,
        options: MergeOptions,
    ) -> Self {
        Self {
            options,
            downstream: SerializedDownstream::new(downstream),
            upstreams: Mutex::new(UpstreamTable {
                slots: (0..upstream_count).map(|_| Slot::Pending).collect(),
                requested: 0,
                closed: false,
            }),
            remaining: AtomicUsize::new(upstream_count),
            terminated: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
        }
    }

    pub(crate) fn downstream(&self) -> &SerializedDownstream<T> {
        &self.downstream
    }

    pub(crate) fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    /// Registers the subscription of upstream `index`.
    ///
    /// Under [`PendingDemand::Buffer`] the upstream immediately receives all demand
    /// requested so far. A subscription that arrives after the merge is over, or for
    /// a slot that is already taken, is cancelled.
    pub(crate) fn register(&self, index: usize, subscription: Arc<dyn Subscription>) {
        let flush = {
            let mut table = self.upstreams.lock();
            let (closed, requested) = (table.closed, table.requested);
            match table.slots.get_mut(index) {
                Some(slot) if !closed && matches!(slot, Slot::Pending) => {
                    *slot = Slot::Active(Arc::clone(&subscription));
                    Some(requested)
                }
                _ => None,
            }
        };

        match flush {
            Some(pending) => {
                trace!(upstream = index, "upstream registered");
                if pending > 0 && self.options.pending_demand_policy() == PendingDemand::Buffer {
                    debug!(upstream = index, demand = pending, "flushing buffered demand");
                    subscription.request(pending);
                }
            }
            None => {
                debug!(upstream = index, "rejecting late or duplicate upstream subscription");
                subscription.cancel();
            }
        }
    }

    pub(crate) fn next(&self, item: T) {
        if self.is_terminated() {
            trace!("merge terminated, dropping item");
            return;
        }
        self.downstream.emit(Signal::Next(item));
    }

    /// Fails the merge with `error` if no other terminal signal got there first.
    ///
    /// The upstream at `origin` already terminated and is not cancelled.
    pub(crate) fn fail(&self, origin: Option<usize>, error: RivuletError) {
        if self.terminated.swap(true, Ordering::AcqRel) {
            debug!(?origin, %error, "terminal signal already decided, absorbing error");
            return;
        }

        let live = self.upstreams.lock().close(origin);
        debug!(?origin, cancelled = live.len(), %error, "merge failed");
        for subscription in live {
            subscription.cancel();
        }
        self.downstream.emit(Signal::Error(error));
    }

    /// Marks upstream `index` complete and completes the merge once it was the last one.
    pub(crate) fn complete(&self, index: usize) {
        {
            let mut table = self.upstreams.lock();
            if !table.closed {
                if let Some(slot) = table.slots.get_mut(index) {
                    *slot = Slot::Terminated;
                }
            }
        }

        if self.remaining.fetch_sub(1, Ordering::AcqRel) != 1 {
            trace!(upstream = index, "upstream completed");
            return;
        }

        if self.terminated.swap(true, Ordering::AcqRel) {
            debug!("all upstreams completed after the merge terminated");
            return;
        }

        self.upstreams.lock().close(None);
        debug!("all upstreams completed");
        self.downstream.emit(Signal::Complete);
    }

    pub(crate) fn request(&self, n: u64) {
        if n == 0 {
            self.fail(None, RivuletError::InvalidDemand);
            return;
        }

        let live: Vec<Arc<dyn Subscription>> = {
            let mut table = self.upstreams.lock();
            if table.closed {
                return;
            }
            table.requested = add_demand(table.requested, n);
            table
                .slots
                .iter()
                .filter_map(|slot| match slot {
                    Slot::Active(subscription) => Some(Arc::clone(subscription)),
                    Slot::Pending | Slot::Terminated => None,
                })
                .collect()
        };

        trace!(demand = n, upstreams = live.len(), "fanning out demand");
        for subscription in live {
            subscription.request(n);
        }
    }

    pub(crate) fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }

        self.downstream.shutdown();
        self.terminated.store(true, Ordering::Release);

        let live = self.upstreams.lock().close(None);
        debug!(cancelled = live.len(), "merge cancelled by downstream");
        for subscription in live {
            subscription.cancel();
        }
    }
}
