// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Bridges into and out of Rivulet publishers.
//!
//! - [`IterPublisher`] turns any `Send` iterator into a demand-driven publisher.
//! - [`PublisherStreamExt::into_stream`] consumes any publisher as a
//!   [`futures::Stream`] of `Result<T>`, requesting in batches.

pub mod into_stream;
pub mod iter_publisher;

pub use self::into_stream::{PublisherStream, PublisherStreamExt};
pub use self::iter_publisher::IterPublisher;
