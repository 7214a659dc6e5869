// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Serialized delivery to a single downstream subscriber.
//!
//! Signals may be emitted from any number of threads. Whichever thread finds the
//! gate idle becomes the drainer and delivers queued signals one at a time; every
//! other thread only enqueues and returns. A drainer that re-enters through the
//! downstream's own callbacks (`request` leading to a synchronous `on_next`) also
//! only enqueues, so delivery never recurses and never blocks on a lock held
//! across a callback.

use parking_lot::Mutex;
use rivulet_core::{trace, Signal, Subscriber, Subscription};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub(crate) struct SerializedDownstream<T> {
    downstream: Mutex<Option<Arc<dyn Subscriber<T>>>>,
    queue: Mutex<VecDeque<Signal<T>>>,
    wip: AtomicUsize,
    done: AtomicBool,
}

impl<T> SerializedDownstream<T> {
    pub(crate) fn new(downstream: Arc<dyn Subscriber<T>>) -> Self {
        Self {
            downstream: Mutex::new(Some(downstream)),
            queue: Mutex::new(VecDeque::new()),
            wip: AtomicUsize::new(0),
            done: AtomicBool::new(false),
        }
    }

    /// Claims the gate without draining. Signals emitted until [`release`](Self::release)
    /// are queued.
    pub(crate) fn hold(&self) {
        self.wip.fetch_add(1, Ordering::AcqRel);
    }

    /// Delivers `on_subscribe` directly. Only valid while the gate is held.
    pub(crate) fn deliver_subscription(&self, subscription: Arc<dyn Subscription>) {
        let downstream = self.downstream.lock().clone();
        if let Some(downstream) = downstream {
            downstream.on_subscribe(subscription);
        }
    }

    /// Gives up a claim taken with [`hold`](Self::hold), delivering whatever was queued.
    pub(crate) fn release(&self) {
        self.drain_loop(1);
    }

    pub(crate) fn emit(&self, signal: Signal<T>) {
        if self.done.load(Ordering::Acquire) {
            trace!("downstream closed, dropping signal");
            return;
        }
        self.queue.lock().push_back(signal);

        if self.wip.fetch_add(1, Ordering::AcqRel) == 0 {
            self.drain_loop(1);
        }
    }

    /// Stops all further delivery and releases the downstream.
    ///
    /// A delivery already running on another thread finishes; nothing new starts.
    pub(crate) fn shutdown(&self) {
        self.done.store(true, Ordering::Release);
        self.downstream.lock().take();
    }

    #[cfg(test)]
    pub(crate) fn is_shut_down(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    fn drain_loop(&self, mut missed: usize) {
        loop {
            while let Some(signal) = self.next_signal() {
                let Some(downstream) = self.downstream.lock().clone() else {
                    break;
                };
                if signal.is_terminal() {
                    // Nothing may follow a terminal signal, even if already queued.
                    self.shutdown();
                }
                signal.dispatch_to(&*downstream);
            }

            let previous = self.wip.fetch_sub(missed, Ordering::AcqRel);
            missed = previous - missed;
            if missed == 0 {
                break;
            }
        }
    }

    fn next_signal(&self) -> Option<Signal<T>> {
        let mut queue = self.queue.lock();
        if self.done.load(Ordering::Acquire) {
            queue.clear();
            return None;
        }
        queue.pop_front()
    }
}
