// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// The link between one publisher and one subscriber.
///
/// Both methods may be called from any thread, including re-entrantly from inside
/// the subscriber's own callbacks, and must never block.
pub trait Subscription: Send + Sync {
    /// Grants `n` additional items of demand. Demand is cumulative.
    ///
    /// `n == 0` is a protocol violation; publishers answer it with
    /// `on_error(RivuletError::InvalidDemand)`.
    fn request(&self, n: u64);

    /// Stops future emissions. Idempotent.
    fn cancel(&self);
}

/// A subscription that ignores every call.
///
/// Handed to subscribers that are rejected before they can be served, so they
/// still receive `on_subscribe` ahead of their terminal signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptySubscription;

impl Subscription for EmptySubscription {
    fn request(&self, _n: u64) {}

    fn cancel(&self) {}
}
