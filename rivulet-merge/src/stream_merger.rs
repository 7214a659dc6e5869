// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Merging of several publishers into one.
//!
//! A [`StreamMerger`] republishes the items of all its upstream publishers to a
//! single subscriber as one interleaved sequence.
//!
//! ## Characteristics
//!
//! - **Lazy**: nothing is subscribed until the merger itself is subscribed to.
//! - **Single subscriber**: a second subscriber is rejected with
//!   [`RivuletError::AlreadySubscribed`].
//! - **Demand fan-out**: `request(n)` is forwarded unchanged to every upstream.
//! - **Fail fast**: the first upstream error is delivered verbatim and every other
//!   upstream is cancelled.
//! - **Complete on all**: the downstream completes only once every upstream has.
//! - **Serialized**: the downstream never sees two concurrent calls, whichever
//!   threads the upstreams emit on.
//!
//! Ordering is preserved per upstream; interleaving across upstreams is unspecified.
//!
//! ## Example
//!
//! ```
//! use rivulet_merge::StreamMerger;
//! use rivulet_stream::IterPublisher;
//! use rivulet_test_utils::RecordingSubscriber;
//! use rivulet_core::Publisher;
//!
//! let merger = StreamMerger::new(vec![
//!     IterPublisher::new(vec![1, 2]),
//!     IterPublisher::new(vec![3]),
//! ])
//! .unwrap();
//!
//! let subscriber = RecordingSubscriber::with_initial_request(u64::MAX);
//! merger.subscribe(subscriber.clone());
//!
//! let mut items = subscriber.items();
//! items.sort_unstable();
//! assert_eq!(items, vec![1, 2, 3]);
//! assert_eq!(subscriber.completions(), 1);
//! ```

mod merged_subscription;
mod state;
mod upstream;

use crate::MergeOptions;
use merged_subscription::MergedSubscription;
use rivulet_core::{
    debug, warn, EmptySubscription, Publisher, Result, RivuletError, Subscriber,
};
use state::MergeState;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use upstream::UpstreamSubscriber;

/// Smallest number of publishers a merger accepts.
pub const MIN_UPSTREAMS: usize = 2;

/// A publisher that merges a fixed set of upstream publishers.
///
/// See the [module documentation](self) for details.
pub struct StreamMerger<T> {
    upstreams: Vec<Arc<dyn Publisher<T>>>,
    options: MergeOptions,
    subscribed: AtomicBool,
}

impl<T: Send + 'static> StreamMerger<T> {
    /// Creates a merger over `publishers` with default [`MergeOptions`].
    ///
    /// # Errors
    ///
    /// Returns [`RivuletError::Configuration`] if fewer than two publishers are supplied.
    pub fn new<I, P>(publishers: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Publisher<T> + 'static,
    {
        Self::with_options(publishers, MergeOptions::default())
    }

    /// Creates a merger over `publishers` with the given options.
    ///
    /// # Errors
    ///
    /// Returns [`RivuletError::Configuration`] if fewer than two publishers are supplied.
    pub fn with_options<I, P>(publishers: I, options: MergeOptions) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Publisher<T> + 'static,
    {
        let upstreams: Vec<Arc<dyn Publisher<T>>> = publishers
            .into_iter()
            .map(|publisher| Arc::new(publisher) as Arc<dyn Publisher<T>>)
            .collect();

        if upstreams.len() < MIN_UPSTREAMS {
            return Err(RivuletError::configuration(MIN_UPSTREAMS, upstreams.len()));
        }

        Ok(Self {
            upstreams,
            options,
            subscribed: AtomicBool::new(false),
        })
    }
}

impl<T> StreamMerger<T> {
    /// Number of upstream publishers.
    #[must_use]
    pub fn upstream_count(&self) -> usize {
        self.upstreams.len()
    }

    #[must_use]
    pub const fn options(&self) -> MergeOptions {
        self.options
    }

    /// Returns `true` once a subscriber has been accepted.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.subscribed.load(Ordering::Acquire)
    }
}

impl<T: Send + 'static> Publisher<T> for StreamMerger<T> {
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        if self.subscribed.swap(true, Ordering::AcqRel) {
            warn!("merger already has a subscriber, rejecting");
            subscriber.on_subscribe(Arc::new(EmptySubscription));
            subscriber.on_error(RivuletError::AlreadySubscribed);
            return;
        }

        debug!(upstreams = self.upstreams.len(), "subscribing to upstreams");
        let state = Arc::new(MergeState::new(
            subscriber,
            self.upstreams.len(),
            self.options,
        ));

        // Anything the upstreams signal while we subscribe is queued until the
        // downstream has its subscription.
        state.downstream().hold();
        for (index, upstream) in self.upstreams.iter().enumerate() {
            upstream.subscribe(Arc::new(UpstreamSubscriber::new(index, Arc::clone(&state))));
        }

        state
            .downstream()
            .deliver_subscription(Arc::new(MergedSubscription::new(Arc::clone(&state))));
        state.downstream().release();
    }
}

impl<T> fmt::Debug for StreamMerger<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamMerger")
            .field("upstreams", &self.upstreams.len())
            .field("options", &self.options)
            .field("subscribed", &self.is_subscribed())
            .finish()
    }
}
