// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use parking_lot::Mutex;
use rivulet_core::{RivuletError, Signal, Subscriber, Subscription};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::wait_until;

/// A subscriber that records everything it receives.
///
/// Besides the signals themselves it counts `on_subscribe` calls and callbacks that
/// overlapped another callback in progress, which a correctly serialized publisher
/// never causes.
pub struct RecordingSubscriber<T> {
    signals: Mutex<Vec<Signal<T>>>,
    subscription: Mutex<Option<Arc<dyn Subscription>>>,
    subscribes: AtomicUsize,
    received: AtomicUsize,
    in_callback: AtomicBool,
    overlaps: AtomicUsize,
    initial_request: u64,
    replenish: u64,
    cancel_after: Option<usize>,
}

impl<T: Send + 'static> RecordingSubscriber<T> {
    /// Records only; never requests anything on its own.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Self::build(0, 0, None)
    }

    /// Requests `n` as soon as it is subscribed.
    #[must_use]
    pub fn with_initial_request(n: u64) -> Arc<Self> {
        Self::build(n, 0, None)
    }

    /// Requests one item at a time, from inside `on_subscribe` and each `on_next`.
    #[must_use]
    pub fn one_by_one() -> Arc<Self> {
        Self::build(1, 1, None)
    }

    /// Requests `n` up front and cancels from inside `on_next` once `items` items
    /// have arrived.
    #[must_use]
    pub fn cancelling_after(items: usize, n: u64) -> Arc<Self> {
        Self::build(n, 0, Some(items))
    }

    fn build(initial_request: u64, replenish: u64, cancel_after: Option<usize>) -> Arc<Self> {
        Arc::new(Self {
            signals: Mutex::new(Vec::new()),
            subscription: Mutex::new(None),
            subscribes: AtomicUsize::new(0),
            received: AtomicUsize::new(0),
            in_callback: AtomicBool::new(false),
            overlaps: AtomicUsize::new(0),
            initial_request,
            replenish,
            cancel_after,
        })
    }

    /// Requests `n` through the recorded subscription.
    pub fn request(&self, n: u64) {
        if let Some(subscription) = self.subscription() {
            subscription.request(n);
        }
    }

    /// Cancels the recorded subscription.
    pub fn cancel(&self) {
        if let Some(subscription) = self.subscription() {
            subscription.cancel();
        }
    }

    #[must_use]
    pub fn subscribe_count(&self) -> usize {
        self.subscribes.load(Ordering::Acquire)
    }

    /// Number of callbacks that started while another one was still running.
    #[must_use]
    pub fn overlapping_calls(&self) -> usize {
        self.overlaps.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.received.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn completions(&self) -> usize {
        self.signals
            .lock()
            .iter()
            .filter(|s| matches!(s, Signal::Complete))
            .count()
    }

    /// Errors received, cloned.
    #[must_use]
    pub fn errors(&self) -> Vec<RivuletError> {
        self.signals
            .lock()
            .iter()
            .filter_map(|s| match s {
                Signal::Error(e) => Some(e.clone()),
                Signal::Next(_) | Signal::Complete => None,
            })
            .collect()
    }

    #[must_use]
    pub fn terminal_count(&self) -> usize {
        self.signals.lock().iter().filter(|s| s.is_terminal()).count()
    }

    /// Returns `true` if the last recorded signal is terminal and nothing else is.
    #[must_use]
    pub fn terminated_once_at_end(&self) -> bool {
        let signals = self.signals.lock();
        let terminals = signals.iter().filter(|s| s.is_terminal()).count();
        terminals == 1 && signals.last().is_some_and(Signal::is_terminal)
    }

    /// Blocks the current thread until a terminal signal arrives or `timeout` elapses.
    pub fn wait_for_terminal(&self, timeout: Duration) -> bool {
        wait_until(timeout, || self.terminal_count() > 0)
    }

    /// Blocks the current thread until `count` items arrived or `timeout` elapses.
    pub fn wait_for_items(&self, count: usize, timeout: Duration) -> bool {
        wait_until(timeout, || self.item_count() >= count)
    }

    fn subscription(&self) -> Option<Arc<dyn Subscription>> {
        self.subscription.lock().clone()
    }

    fn enter(&self) {
        if self.in_callback.swap(true, Ordering::AcqRel) {
            self.overlaps.fetch_add(1, Ordering::AcqRel);
        }
    }

    fn exit(&self) {
        self.in_callback.store(false, Ordering::Release);
    }
}

impl<T: Clone + Send + 'static> RecordingSubscriber<T> {
    /// Every signal received so far, in order.
    #[must_use]
    pub fn signals(&self) -> Vec<Signal<T>> {
        self.signals.lock().clone()
    }

    /// Items received so far, in order.
    #[must_use]
    pub fn items(&self) -> Vec<T> {
        self.signals
            .lock()
            .iter()
            .filter_map(|s| match s {
                Signal::Next(item) => Some(item.clone()),
                Signal::Error(_) | Signal::Complete => None,
            })
            .collect()
    }
}

impl<T: Send + 'static> Subscriber<T> for RecordingSubscriber<T> {
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        self.enter();
        self.subscribes.fetch_add(1, Ordering::AcqRel);
        *self.subscription.lock() = Some(Arc::clone(&subscription));
        self.exit();

        if self.initial_request > 0 {
            subscription.request(self.initial_request);
        }
    }

    fn on_next(&self, item: T) {
        self.enter();
        self.signals.lock().push(Signal::Next(item));
        let received = self.received.fetch_add(1, Ordering::AcqRel) + 1;
        self.exit();

        if self.cancel_after == Some(received) {
            self.cancel();
        } else if self.replenish > 0 {
            self.request(self.replenish);
        }
    }

    fn on_error(&self, error: RivuletError) {
        self.enter();
        self.signals.lock().push(Signal::Error(error));
        self.exit();
    }

    fn on_complete(&self) {
        self.enter();
        self.signals.lock().push(Signal::Complete);
        self.exit();
    }
}
