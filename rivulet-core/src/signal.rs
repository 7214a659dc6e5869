// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::Subscriber;
use rivulet_error::RivuletError;

/// A single notification travelling from a publisher to a subscriber.
///
/// `Error` and `Complete` are terminal: a well-formed sequence ends with exactly
/// one of them, or with nothing if the subscription was cancelled.
#[derive(Debug, Clone)]
pub enum Signal<T> {
    /// An item
    Next(T),
    /// A failure that terminates the sequence
    Error(RivuletError),
    /// Successful end of the sequence
    Complete,
}

impl<T: PartialEq> PartialEq for Signal<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Signal::Next(a), Signal::Next(b)) => a == b,
            (Signal::Complete, Signal::Complete) => true,
            _ => false, // Errors are never equal
        }
    }
}

impl<T> Signal<T> {
    /// Returns `true` for `Error` and `Complete`.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Signal::Error(_) | Signal::Complete)
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Signal::Error(_))
    }

    /// Converts into the carried item, discarding terminal signals.
    pub fn into_next(self) -> Option<T> {
        match self {
            Signal::Next(item) => Some(item),
            Signal::Error(_) | Signal::Complete => None,
        }
    }

    /// Converts into the carried error, if any.
    pub fn into_error(self) -> Option<RivuletError> {
        match self {
            Signal::Error(e) => Some(e),
            Signal::Next(_) | Signal::Complete => None,
        }
    }

    /// Maps the carried item; terminal signals pass through unchanged.
    pub fn map<U, F>(self, f: F) -> Signal<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Signal::Next(item) => Signal::Next(f(item)),
            Signal::Error(e) => Signal::Error(e),
            Signal::Complete => Signal::Complete,
        }
    }

    /// Invokes the matching callback on `subscriber`.
    pub fn dispatch_to<S>(self, subscriber: &S)
    where
        S: Subscriber<T> + ?Sized,
    {
        match self {
            Signal::Next(item) => subscriber.on_next(item),
            Signal::Error(e) => subscriber.on_error(e),
            Signal::Complete => subscriber.on_complete(),
        }
    }
}

impl<T> From<Result<T, RivuletError>> for Signal<T> {
    fn from(result: Result<T, RivuletError>) -> Self {
        match result {
            Ok(item) => Signal::Next(item),
            Err(e) => Signal::Error(e),
        }
    }
}
