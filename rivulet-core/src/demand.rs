// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Demand arithmetic.
//!
//! Demand is cumulative and never decreases through `request`. Additions saturate
//! at [`UNBOUNDED`], which publishers treat as "emit without limit".

use core::sync::atomic::{AtomicU64, Ordering};

/// Demand value meaning "no limit".
pub const UNBOUNDED: u64 = u64::MAX;

/// Adds `n` to `current`, saturating at [`UNBOUNDED`].
#[must_use]
pub const fn add_demand(current: u64, n: u64) -> u64 {
    current.saturating_add(n)
}

/// Lock-free outstanding-demand counter for publisher implementations.
///
/// `add` is called from `Subscription::request`, `try_consume` from the emitting
/// side. Once the counter reaches [`UNBOUNDED`] it stays there.
#[derive(Debug, Default)]
pub struct DemandCounter {
    outstanding: AtomicU64,
}

impl DemandCounter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            outstanding: AtomicU64::new(0),
        }
    }

    /// Adds `n` and returns the outstanding demand before the addition.
    pub fn add(&self, n: u64) -> u64 {
        match self
            .outstanding
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(add_demand(current, n))
            }) {
            Ok(previous) | Err(previous) => previous,
        }
    }

    /// Takes one unit of demand. Returns `false` when none is outstanding.
    pub fn try_consume(&self) -> bool {
        self.outstanding
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| match current {
                0 => None,
                UNBOUNDED => Some(UNBOUNDED),
                n => Some(n - 1),
            })
            .is_ok()
    }

    /// Current outstanding demand.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.outstanding.load(Ordering::Acquire)
    }
}
