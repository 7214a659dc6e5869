// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::state::MergeState;
use rivulet_core::{debug, RivuletError, Subscriber, Subscription};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Forwards the signals of one upstream into the shared merge state.
pub(crate) struct UpstreamSubscriber<T> {
    index: usize,
    subscribed: AtomicBool,
    /// Per-upstream terminal guard, independent of the merge-wide latch.
    finished: AtomicBool,
    state: Arc<MergeState<T>>,
}

impl<T> UpstreamSubscriber<T> {
    pub(crate) fn new(index: usize, state: Arc<MergeState<T>>) -> Self {
        Self {
            index,
            subscribed: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            state,
        }
    }

    fn finish(&self) -> bool {
        !self.finished.swap(true, Ordering::AcqRel)
    }
}

impl<T: Send> Subscriber<T> for UpstreamSubscriber<T> {
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        if self.subscribed.swap(true, Ordering::AcqRel) {
            debug!(upstream = self.index, "duplicate on_subscribe, cancelling");
            subscription.cancel();
            return;
        }
        self.state.register(self.index, subscription);
    }

    fn on_next(&self, item: T) {
        if self.finished.load(Ordering::Acquire) {
            debug!(upstream = self.index, "on_next after terminal signal ignored");
            return;
        }
        self.state.next(item);
    }

    fn on_error(&self, error: RivuletError) {
        if !self.finish() {
            debug!(upstream = self.index, %error, "second terminal signal ignored");
            return;
        }
        self.state.fail(Some(self.index), error);
    }

    fn on_complete(&self) {
        if !self.finish() {
            debug!(upstream = self.index, "second terminal signal ignored");
            return;
        }
        self.state.complete(self.index);
    }
}
