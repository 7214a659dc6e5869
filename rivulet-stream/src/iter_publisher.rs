// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use parking_lot::Mutex;
use rivulet_core::{
    debug, DemandCounter, EmptySubscription, Publisher, RivuletError, Subscriber, Subscription,
};
use std::iter::Peekable;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

type BoxIter<T> = Box<dyn Iterator<Item = T> + Send>;

/// A single-subscription publisher over an iterator.
///
/// Items are pulled from the iterator only as demand arrives, on the thread that
/// calls `request`. An exhausted iterator completes the subscriber even without
/// demand. A second subscriber is rejected with [`RivuletError::AlreadySubscribed`].
///
/// ```
/// use rivulet_core::Publisher;
/// use rivulet_stream::IterPublisher;
/// use rivulet_test_utils::RecordingSubscriber;
///
/// let publisher = IterPublisher::new(1..=3);
/// let subscriber = RecordingSubscriber::with_initial_request(2);
/// publisher.subscribe(subscriber.clone());
/// assert_eq!(subscriber.items(), vec![1, 2]);
///
/// subscriber.request(5);
/// assert_eq!(subscriber.items(), vec![1, 2, 3]);
/// assert_eq!(subscriber.completions(), 1);
/// ```
pub struct IterPublisher<T> {
    source: Mutex<Option<BoxIter<T>>>,
}

impl<T: Send + 'static> IterPublisher<T> {
    pub fn new<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Self {
            source: Mutex::new(Some(Box::new(items.into_iter()))),
        }
    }
}

impl<T: Send + 'static> Publisher<T> for IterPublisher<T> {
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        let Some(source) = self.source.lock().take() else {
            debug!("iterator publisher already consumed, rejecting subscriber");
            subscriber.on_subscribe(Arc::new(EmptySubscription));
            subscriber.on_error(RivuletError::AlreadySubscribed);
            return;
        };

        let subscription = Arc::new(IterSubscription {
            source: Mutex::new(source.peekable()),
            subscriber: Mutex::new(Some(Arc::clone(&subscriber))),
            demand: DemandCounter::new(),
            wip: AtomicUsize::new(0),
            invalid_demand: AtomicBool::new(false),
            finished: AtomicBool::new(false),
        });
        subscriber.on_subscribe(Arc::clone(&subscription) as Arc<dyn Subscription>);
        subscription.drain();
    }
}

struct IterSubscription<T> {
    source: Mutex<Peekable<BoxIter<T>>>,
    subscriber: Mutex<Option<Arc<dyn Subscriber<T>>>>,
    demand: DemandCounter,
    wip: AtomicUsize,
    /// Set by `request(0)`; the error is delivered by whichever thread drains.
    invalid_demand: AtomicBool,
    finished: AtomicBool,
}

impl<T: Send> IterSubscription<T> {
    /// Releases the subscriber exactly once; the caller delivers the terminal signal.
    fn finish(&self) -> Option<Arc<dyn Subscriber<T>>> {
        if self.finished.swap(true, Ordering::AcqRel) {
            return None;
        }
        self.subscriber.lock().take()
    }

    /// Emits as far as demand allows. Re-entrant calls from inside `on_next` only
    /// bump `wip`, so the outermost caller keeps emitting instead of recursing.
    fn drain(&self) {
        if self.wip.fetch_add(1, Ordering::AcqRel) != 0 {
            return;
        }

        let mut missed = 1;
        loop {
            while !self.finished.load(Ordering::Acquire) {
                if self.invalid_demand.load(Ordering::Acquire) {
                    if let Some(subscriber) = self.finish() {
                        subscriber.on_error(RivuletError::InvalidDemand);
                    }
                    break;
                }

                let mut source = self.source.lock();
                if source.peek().is_none() {
                    drop(source);
                    if let Some(subscriber) = self.finish() {
                        subscriber.on_complete();
                    }
                    break;
                }
                if !self.demand.try_consume() {
                    break;
                }
                let item = source.next();
                drop(source);

                let subscriber = self.subscriber.lock().clone();
                if let (Some(subscriber), Some(item)) = (subscriber, item) {
                    subscriber.on_next(item);
                }
            }

            let previous = self.wip.fetch_sub(missed, Ordering::AcqRel);
            missed = previous - missed;
            if missed == 0 {
                break;
            }
        }
    }
}

impl<T: Send> Subscription for IterSubscription<T> {
    fn request(&self, n: u64) {
        if n == 0 {
            debug!("request(0) on iterator subscription");
            self.invalid_demand.store(true, Ordering::Release);
        } else {
            self.demand.add(n);
        }
        self.drain();
    }

    fn cancel(&self) {
        if self.finish().is_some() {
            debug!("iterator subscription cancelled");
        }
    }
}
