// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use parking_lot::Mutex;
use rivulet_core::{add_demand, Publisher, RivuletError, Subscriber, Subscription};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

struct Shared<T> {
    subscriber: Mutex<Option<Arc<dyn Subscriber<T>>>>,
    requests: Mutex<Vec<u64>>,
    cancellations: AtomicUsize,
    subscriptions: AtomicUsize,
    deferred: bool,
    delivered: AtomicBool,
}

struct ManualSubscription<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Send> Subscription for ManualSubscription<T> {
    fn request(&self, n: u64) {
        self.shared.requests.lock().push(n);
    }

    fn cancel(&self) {
        self.shared.cancellations.fetch_add(1, Ordering::AcqRel);
    }
}

/// A publisher driven entirely by the test.
///
/// Signals are forwarded straight to the subscriber from whichever thread calls
/// [`next`](Self::next), [`error`](Self::error) or [`complete`](Self::complete);
/// demand is recorded but not enforced, so tests can also play a misbehaving upstream.
///
/// Cloning yields another handle to the same publisher.
pub struct ManualPublisher<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Send + 'static> ManualPublisher<T> {
    /// A publisher that calls `on_subscribe` as soon as it is subscribed to.
    #[must_use]
    pub fn new() -> Self {
        Self::build(false)
    }

    /// A publisher that holds back `on_subscribe` until
    /// [`deliver_subscription`](Self::deliver_subscription) is called.
    #[must_use]
    pub fn deferred() -> Self {
        Self::build(true)
    }

    fn build(deferred: bool) -> Self {
        Self {
            shared: Arc::new(Shared {
                subscriber: Mutex::new(None),
                requests: Mutex::new(Vec::new()),
                cancellations: AtomicUsize::new(0),
                subscriptions: AtomicUsize::new(0),
                deferred,
                delivered: AtomicBool::new(false),
            }),
        }
    }

    /// Hands the subscriber its subscription. Only the first call has an effect.
    pub fn deliver_subscription(&self) {
        if self.shared.delivered.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(subscriber) = self.subscriber() {
            subscriber.on_subscribe(Arc::new(ManualSubscription {
                shared: Arc::clone(&self.shared),
            }));
        }
    }

    /// Calls `on_subscribe` again with a fresh subscription, violating the protocol.
    pub fn deliver_duplicate_subscription(&self) {
        if let Some(subscriber) = self.subscriber() {
            subscriber.on_subscribe(Arc::new(ManualSubscription {
                shared: Arc::clone(&self.shared),
            }));
        }
    }

    pub fn next(&self, item: T) {
        if let Some(subscriber) = self.subscriber() {
            subscriber.on_next(item);
        }
    }

    pub fn error(&self, error: RivuletError) {
        if let Some(subscriber) = self.subscriber() {
            subscriber.on_error(error);
        }
    }

    pub fn complete(&self) {
        if let Some(subscriber) = self.subscriber() {
            subscriber.on_complete();
        }
    }

    /// Every `request(n)` received, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<u64> {
        self.shared.requests.lock().clone()
    }

    /// Sum of all requests, saturating.
    #[must_use]
    pub fn total_requested(&self) -> u64 {
        self.shared
            .requests
            .lock()
            .iter()
            .fold(0, |total, n| add_demand(total, *n))
    }

    #[must_use]
    pub fn cancel_count(&self) -> usize {
        self.shared.cancellations.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_count() > 0
    }

    /// Number of times `subscribe` was called.
    #[must_use]
    pub fn subscribe_count(&self) -> usize {
        self.shared.subscriptions.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.subscribe_count() > 0
    }

    fn subscriber(&self) -> Option<Arc<dyn Subscriber<T>>> {
        self.shared.subscriber.lock().clone()
    }
}

impl<T: Send + 'static> Default for ManualPublisher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ManualPublisher<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Send + 'static> Publisher<T> for ManualPublisher<T> {
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        self.shared.subscriptions.fetch_add(1, Ordering::AcqRel);
        *self.shared.subscriber.lock() = Some(subscriber);
        if !self.shared.deferred {
            self.deliver_subscription();
        }
    }
}
