// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]
//! Error types for the Rivulet reactive streams library
//!
//! A single [`RivuletError`] travels through the whole pipeline: it is returned
//! from fallible constructors (such as building a merger with too few upstreams)
//! and it is the payload of every `on_error` terminal signal.
//!
//! # Examples
//!
//! ```
//! use rivulet_error::{RivuletError, Result};
//!
//! fn build(upstreams: usize) -> Result<()> {
//!     if upstreams < 2 {
//!         return Err(RivuletError::configuration(2, upstreams));
//!     }
//!     Ok(())
//! }
//!
//! assert!(build(1).is_err());
//! ```

/// Root error type for all Rivulet operations
#[derive(Debug, thiserror::Error)]
pub enum RivuletError {
    /// A component was assembled with an invalid configuration
    ///
    /// Raised synchronously at construction time; nothing is subscribed.
    #[error("Configuration error: at least {required} publishers must be supplied, got {supplied}")]
    Configuration {
        /// Minimum number of publishers required
        required: usize,
        /// Number of publishers actually supplied
        supplied: usize,
    },

    /// A single-subscription publisher was subscribed to a second time
    #[error("Publisher already has a subscriber")]
    AlreadySubscribed,

    /// A subscriber requested a non-positive amount of demand
    #[error("Invalid demand: request(n) requires n > 0")]
    InvalidDemand,

    /// An upstream publisher failed
    ///
    /// Producers that have no richer error of their own use this variant
    /// to describe what went wrong.
    #[error("Upstream failure: {context}")]
    Upstream {
        /// Description of the failure
        context: String,
    },

    /// The publisher let go of its subscriber without sending a terminal signal
    #[error("Subscription cancelled")]
    Cancelled,

    /// Custom error from user code
    ///
    /// This wraps errors produced by user-provided publishers so they can be
    /// carried through `on_error` without losing their source.
    #[error("User error: {0}")]
    User(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RivuletError {
    /// Create a configuration error
    #[must_use]
    pub const fn configuration(required: usize, supplied: usize) -> Self {
        Self::Configuration { required, supplied }
    }

    /// Create an upstream failure with the given context
    pub fn upstream(context: impl Into<String>) -> Self {
        Self::Upstream {
            context: context.into(),
        }
    }

    /// Wrap a user error
    pub fn user_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::User(Box::new(error))
    }

    /// Check if this error was caused by a misbehaving collaborator rather than
    /// by the data source itself
    #[must_use]
    pub const fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::AlreadySubscribed | Self::InvalidDemand)
    }
}

/// Specialized Result type for Rivulet operations
pub type Result<T> = std::result::Result<T, RivuletError>;

/// Extension trait for converting foreign errors into `RivuletError`
///
/// Implemented for every `std::error::Error + Send + Sync + 'static`, so producers
/// can hand their own failures to `on_error` with `err.into_rivulet()`.
pub trait IntoRivuletError {
    /// Convert this error into a `RivuletError`
    fn into_rivulet(self) -> RivuletError;
}

impl<E: std::error::Error + Send + Sync + 'static> IntoRivuletError for E {
    fn into_rivulet(self) -> RivuletError {
        RivuletError::user_error(self)
    }
}

impl Clone for RivuletError {
    fn clone(&self) -> Self {
        match self {
            Self::Configuration { required, supplied } => Self::Configuration {
                required: *required,
                supplied: *supplied,
            },
            Self::AlreadySubscribed => Self::AlreadySubscribed,
            Self::InvalidDemand => Self::InvalidDemand,
            Self::Upstream { context } => Self::Upstream {
                context: context.clone(),
            },
            Self::Cancelled => Self::Cancelled,
            // The boxed source cannot be cloned, keep its message
            Self::User(e) => Self::Upstream {
                context: format!("User error: {e}"),
            },
        }
    }
}
