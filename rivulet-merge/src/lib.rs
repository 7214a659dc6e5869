// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]
//! Fan-in of several backpressured publishers into one serialized publisher.
//!
//! See [`StreamMerger`] for the merge rules.

mod merge_ext;
mod merge_options;
mod serialized;
pub mod stream_merger;

pub use merge_ext::{merge, MergeExt};
pub use merge_options::{MergeOptions, PendingDemand};
pub use stream_merger::{StreamMerger, MIN_UPSTREAMS};
