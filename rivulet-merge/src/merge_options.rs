// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// What happens to demand requested before an upstream has delivered its subscription.
///
/// Upstreams call back with `on_subscribe` on their own schedule, so the downstream
/// may request items while some upstreams are not yet registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingDemand {
    /// Remember the cumulative demand and hand it to each upstream as soon as it
    /// registers. Every upstream ends up with exactly the demand the downstream
    /// requested, no matter when it subscribed.
    #[default]
    Buffer,
    /// Only upstreams already registered at the time of a `request` receive it.
    /// A late upstream stays idle until the downstream requests again.
    Discard,
}

/// Settings for a [`StreamMerger`](crate::StreamMerger).
///
/// ```
/// use rivulet_merge::{MergeOptions, PendingDemand};
///
/// let options = MergeOptions::default().pending_demand(PendingDemand::Discard);
/// assert_eq!(options.pending_demand_policy(), PendingDemand::Discard);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeOptions {
    pending_demand: PendingDemand,
}

impl MergeOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending_demand: PendingDemand::Buffer,
        }
    }

    /// Sets the policy for demand requested ahead of upstream registration.
    #[must_use]
    pub const fn pending_demand(mut self, policy: PendingDemand) -> Self {
        self.pending_demand = policy;
        self
    }

    #[must_use]
    pub const fn pending_demand_policy(&self) -> PendingDemand {
        self.pending_demand
    }
}
