// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Rivulet
//!
//! Backpressured reactive streams with a merge that stays correct under
//! concurrency.
//!
//! ## Overview
//!
//! A [`Publisher`] emits to a [`Subscriber`] only what the subscriber has asked for
//! through its [`Subscription`]. [`StreamMerger`] combines two or more publishers
//! into one: demand fans out to every upstream, items are delivered one at a time
//! whichever thread produced them, the first error ends the merge and cancels the
//! rest, and completion waits for every upstream.
//!
//! ## Quick Start
//!
//! ```rust
//! use futures::StreamExt;
//! use rivulet::prelude::*;
//!
//! # futures::executor::block_on(async {
//! let merged = vec![IterPublisher::new(0..3), IterPublisher::new(10..13)]
//!     .merge()
//!     .expect("two publishers");
//!
//! let mut items: Vec<i32> = merged
//!     .into_stream(16)
//!     .map(|item| item.expect("no upstream fails"))
//!     .collect()
//!     .await;
//! items.sort_unstable();
//! assert_eq!(items, vec![0, 1, 2, 10, 11, 12]);
//! # });
//! ```

pub use rivulet_core::{
    add_demand, DemandCounter, EmptySubscription, IntoRivuletError, Publisher, Result,
    RivuletError, Signal, Subscriber, Subscription, UNBOUNDED,
};
pub use rivulet_merge::{merge, MergeExt, MergeOptions, PendingDemand, StreamMerger};
pub use rivulet_stream::{IterPublisher, PublisherStream, PublisherStreamExt};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        IterPublisher, MergeExt, MergeOptions, PendingDemand, Publisher, PublisherStreamExt,
        RivuletError, StreamMerger, Subscriber, Subscription,
    };
}
