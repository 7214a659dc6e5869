// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Core contracts for Rivulet reactive streams.
//!
//! A [`Publisher`] emits items to a [`Subscriber`] only as fast as the subscriber
//! authorises through its [`Subscription`]. Every subscriber sees exactly one
//! `on_subscribe`, then any number of `on_next`, then at most one terminal signal.

pub mod demand;
pub mod logging;
pub mod publisher;
pub mod signal;
pub mod subscriber;
pub mod subscription;

pub use self::demand::{add_demand, DemandCounter, UNBOUNDED};
pub use self::publisher::Publisher;
pub use self::signal::Signal;
pub use self::subscriber::Subscriber;
pub use self::subscription::{EmptySubscription, Subscription};
pub use rivulet_error::{IntoRivuletError, Result, RivuletError};
