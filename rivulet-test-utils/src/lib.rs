// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test publishers, subscribers and fixtures for the Rivulet workspace.
//!
//! This crate is for development and testing only.
//!
//! # Key Types
//!
//! - [`ManualPublisher`]: the test decides when and from which thread each signal is
//!   emitted; every `request` and `cancel` it receives is recorded.
//! - [`ThreadedPublisher`]: emits a fixed list of items from its own OS thread,
//!   within the demand it was granted.
//! - [`RecordingSubscriber`]: records every signal and counts overlapping
//!   callbacks, so tests can assert serial delivery.
//!
//! ```rust
//! use rivulet_core::{Publisher, Signal};
//! use rivulet_test_utils::{ManualPublisher, RecordingSubscriber};
//!
//! let publisher = ManualPublisher::<u32>::new();
//! let subscriber = RecordingSubscriber::with_initial_request(2);
//! publisher.subscribe(subscriber.clone());
//!
//! assert_eq!(publisher.total_requested(), 2);
//! publisher.next(7);
//! publisher.complete();
//! assert_eq!(subscriber.signals(), vec![Signal::Next(7), Signal::Complete]);
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod helpers;
pub mod manual_publisher;
pub mod recording_subscriber;
pub mod test_data;
pub mod test_error;
pub mod threaded_publisher;

pub use helpers::{init_tracing, wait_until};
pub use manual_publisher::ManualPublisher;
pub use recording_subscriber::RecordingSubscriber;
pub use test_data::TestData;
pub use test_error::TestError;
pub use threaded_publisher::ThreadedPublisher;
