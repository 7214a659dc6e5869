// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::Subscription;
use rivulet_error::RivuletError;
use std::sync::Arc;

/// Receiver side of a reactive stream.
///
/// A publisher calls `on_subscribe` exactly once, then `on_next` at most as many
/// times as demand was requested, then at most one of `on_error` / `on_complete`.
/// Calls are never made concurrently for a single subscriber.
pub trait Subscriber<T>: Send + Sync {
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>);

    fn on_next(&self, item: T);

    fn on_error(&self, error: RivuletError);

    fn on_complete(&self);
}
