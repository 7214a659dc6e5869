// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::state::MergeState;
use rivulet_core::Subscription;
use std::sync::Arc;

/// The subscription handed to the merge's downstream.
///
/// `request(n)` forwards the same `n` to every registered upstream; each upstream
/// honours its own demand, so the combined delivery may exceed `n`.
pub(crate) struct MergedSubscription<T> {
    state: Arc<MergeState<T>>,
}

impl<T> MergedSubscription<T> {
    pub(crate) fn new(state: Arc<MergeState<T>>) -> Self {
        Self { state }
    }
}

impl<T: Send> Subscription for MergedSubscription<T> {
    fn request(&self, n: u64) {
        self.state.request(n);
    }

    fn cancel(&self) {
        self.state.cancel();
    }
}
