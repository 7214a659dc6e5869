// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{MergeOptions, StreamMerger};
use rivulet_core::{Publisher, Result};

/// Merges a collection of publishers.
///
/// # Errors
///
/// Returns `RivuletError::Configuration` if fewer than two publishers are supplied.
pub fn merge<T, I, P>(publishers: I) -> Result<StreamMerger<T>>
where
    T: Send + 'static,
    I: IntoIterator<Item = P>,
    P: Publisher<T> + 'static,
{
    StreamMerger::new(publishers)
}

/// Extension trait turning a `Vec` of publishers into a [`StreamMerger`].
///
/// ```
/// use rivulet_merge::MergeExt;
/// use rivulet_stream::IterPublisher;
///
/// let merged = vec![IterPublisher::new(0..3), IterPublisher::new(10..13)].merge();
/// assert!(merged.is_ok());
///
/// let single = vec![IterPublisher::new(0..3)].merge();
/// assert!(single.is_err());
/// ```
pub trait MergeExt<T> {
    /// # Errors
    ///
    /// Returns `RivuletError::Configuration` if fewer than two publishers are supplied.
    fn merge(self) -> Result<StreamMerger<T>>;

    /// # Errors
    ///
    /// Returns `RivuletError::Configuration` if fewer than two publishers are supplied.
    fn merge_with_options(self, options: MergeOptions) -> Result<StreamMerger<T>>;
}

impl<T, P> MergeExt<T> for Vec<P>
where
    T: Send + 'static,
    P: Publisher<T> + 'static,
{
    fn merge(self) -> Result<StreamMerger<T>> {
        StreamMerger::new(self)
    }

    fn merge_with_options(self, options: MergeOptions) -> Result<StreamMerger<T>> {
        StreamMerger::with_options(self, options)
    }
}
