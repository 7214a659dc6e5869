// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::StreamExt;
use rivulet_core::RivuletError;
use rivulet_merge::{merge, MergeExt};
use rivulet_stream::{IterPublisher, PublisherStreamExt};
use rivulet_test_utils::{ManualPublisher, TestError, ThreadedPublisher};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_merged_stream_yields_every_item() -> anyhow::Result<()> {
    // Arrange
    let merged = vec![IterPublisher::new(0..50), IterPublisher::new(50..100)].merge()?;

    // Act
    let mut items = merged
        .into_stream(8)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    // Assert
    items.sort_unstable();
    assert_eq!(items, (0..100).collect::<Vec<_>>());

    Ok(())
}

#[tokio::test]
async fn test_threaded_upstreams_merge_into_stream() -> anyhow::Result<()> {
    // Arrange
    let merged = merge(vec![
        ThreadedPublisher::new((0..1_000u32).collect()),
        ThreadedPublisher::new((1_000..2_000).collect()),
        ThreadedPublisher::new((2_000..3_000).collect()),
    ])?;

    // Act
    let items = timeout(TIMEOUT, merged.into_stream(32).collect::<Vec<_>>()).await?;

    // Assert
    let items = items.into_iter().collect::<Result<Vec<_>, _>>()?;
    assert_eq!(items.len(), 3_000);
    for range in [0..1_000, 1_000..2_000, 2_000..3_000] {
        let lane = items.iter().copied().filter(|n| range.contains(n));
        assert!(lane.eq(range.clone()), "per-upstream order must be preserved");
    }

    Ok(())
}

#[tokio::test]
async fn test_upstream_error_is_passed_through_verbatim() -> anyhow::Result<()> {
    // Arrange
    let (a, b) = (ManualPublisher::<u32>::new(), ManualPublisher::new());
    let mut stream = vec![a.clone(), b.clone()].merge()?.into_stream(4);

    // Act
    a.next(1);
    b.error(TestError::new("checksum mismatch").into_rivulet());

    // Assert
    assert!(matches!(stream.next().await, Some(Ok(1))));
    match stream.next().await {
        Some(Err(RivuletError::User(source))) => {
            let source = source.downcast_ref::<TestError>();
            assert_eq!(source, Some(&TestError::new("checksum mismatch")));
        }
        other => panic!("expected the upstream's own error, got {other:?}"),
    }
    assert!(stream.next().await.is_none());
    assert_eq!(a.cancel_count(), 1);

    Ok(())
}

#[tokio::test]
async fn test_dropping_merged_stream_cancels_upstreams() -> anyhow::Result<()> {
    // Arrange
    let upstreams = [
        Arc::new(ThreadedPublisher::new((0..100_000u32).collect())),
        Arc::new(ThreadedPublisher::new((0..100_000).collect())),
    ];
    let mut stream = merge(upstreams.to_vec())?.into_stream(16);

    // Act
    let first = timeout(TIMEOUT, stream.next()).await?;
    drop(stream);

    // Assert
    assert!(matches!(first, Some(Ok(_))));
    for upstream in &upstreams {
        assert_eq!(upstream.cancel_count(), 1);
    }

    Ok(())
}
