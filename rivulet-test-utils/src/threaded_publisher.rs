// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use parking_lot::{Condvar, Mutex};
use rivulet_core::{
    DemandCounter, EmptySubscription, Publisher, RivuletError, Subscriber, Subscription,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

struct Control {
    demand: DemandCounter,
    cancelled: AtomicBool,
    cancellations: AtomicUsize,
    wake: Mutex<()>,
    signal: Condvar,
}

impl Control {
    fn wait_for_demand(&self) -> bool {
        loop {
            if self.cancelled.load(Ordering::Acquire) {
                return false;
            }
            if self.demand.try_consume() {
                return true;
            }
            let mut guard = self.wake.lock();
            // Bounded wait: a notification may slip in between the checks and the lock.
            self.signal.wait_for(&mut guard, Duration::from_millis(1));
        }
    }
}

struct ThreadedSubscription {
    control: Arc<Control>,
}

impl Subscription for ThreadedSubscription {
    fn request(&self, n: u64) {
        self.control.demand.add(n);
        self.control.signal.notify_one();
    }

    fn cancel(&self) {
        self.control.cancellations.fetch_add(1, Ordering::AcqRel);
        self.control.cancelled.store(true, Ordering::Release);
        self.control.signal.notify_one();
    }
}

/// A single-subscription publisher emitting a fixed list of items from its own
/// OS thread, never exceeding granted demand.
///
/// The sequence ends with `on_complete`, or with `on_error` when built through
/// [`failing`](Self::failing). Cancellation stops the thread at the next item.
pub struct ThreadedPublisher<T> {
    items: Mutex<Option<Vec<T>>>,
    failure: Mutex<Option<RivuletError>>,
    control: Arc<Control>,
}

impl<T: Send + 'static> ThreadedPublisher<T> {
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self::build(items, None)
    }

    /// Emits `items`, then fails with `error`.
    #[must_use]
    pub fn failing(items: Vec<T>, error: RivuletError) -> Self {
        Self::build(items, Some(error))
    }

    fn build(items: Vec<T>, failure: Option<RivuletError>) -> Self {
        Self {
            items: Mutex::new(Some(items)),
            failure: Mutex::new(failure),
            control: Arc::new(Control {
                demand: DemandCounter::new(),
                cancelled: AtomicBool::new(false),
                cancellations: AtomicUsize::new(0),
                wake: Mutex::new(()),
                signal: Condvar::new(),
            }),
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.control.cancelled.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn cancel_count(&self) -> usize {
        self.control.cancellations.load(Ordering::Acquire)
    }
}

impl<T: Send + 'static> Publisher<T> for ThreadedPublisher<T> {
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        let Some(items) = self.items.lock().take() else {
            subscriber.on_subscribe(Arc::new(EmptySubscription));
            subscriber.on_error(RivuletError::AlreadySubscribed);
            return;
        };
        let failure = self.failure.lock().take();
        let control = Arc::clone(&self.control);

        subscriber.on_subscribe(Arc::new(ThreadedSubscription {
            control: Arc::clone(&control),
        }));

        thread::spawn(move || {
            for item in items {
                if !control.wait_for_demand() {
                    return;
                }
                subscriber.on_next(item);
            }
            if control.cancelled.load(Ordering::Acquire) {
                return;
            }
            match failure {
                Some(error) => subscriber.on_error(error),
                None => subscriber.on_complete(),
            }
        });
    }
}
