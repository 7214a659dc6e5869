// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use rivulet_core::{Publisher, RivuletError};
use rivulet_test_utils::{RecordingSubscriber, ThreadedPublisher};
use std::thread;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

#[test]
fn test_emits_only_within_demand() -> anyhow::Result<()> {
    // Arrange
    let publisher = ThreadedPublisher::new(vec![1, 2, 3, 4]);
    let subscriber = RecordingSubscriber::with_initial_request(2);

    // Act
    publisher.subscribe(subscriber.clone());

    // Assert
    assert!(subscriber.wait_for_items(2, TIMEOUT));
    thread::sleep(Duration::from_millis(20));
    assert_eq!(subscriber.items(), vec![1, 2]);

    subscriber.request(2);
    assert!(subscriber.wait_for_terminal(TIMEOUT));
    assert_eq!(subscriber.items(), vec![1, 2, 3, 4]);
    assert_eq!(subscriber.completions(), 1);

    Ok(())
}

#[test]
fn test_failing_publisher_ends_with_error() -> anyhow::Result<()> {
    let publisher = ThreadedPublisher::failing(vec![1], RivuletError::upstream("down"));
    let subscriber = RecordingSubscriber::with_initial_request(u64::MAX);

    publisher.subscribe(subscriber.clone());

    assert!(subscriber.wait_for_terminal(TIMEOUT));
    assert_eq!(subscriber.items(), vec![1]);
    assert_eq!(subscriber.errors().len(), 1);

    Ok(())
}

#[test]
fn test_second_subscriber_is_rejected() -> anyhow::Result<()> {
    let publisher = ThreadedPublisher::<u8>::new(vec![]);
    let first = RecordingSubscriber::with_initial_request(1);
    let second = RecordingSubscriber::new();

    publisher.subscribe(first.clone());
    publisher.subscribe(second.clone());

    assert!(matches!(
        second.errors().as_slice(),
        [RivuletError::AlreadySubscribed]
    ));
    assert!(first.wait_for_terminal(TIMEOUT));

    Ok(())
}

#[test]
fn test_cancel_stops_emission() -> anyhow::Result<()> {
    let publisher = ThreadedPublisher::new((0..1_000).collect::<Vec<u32>>());
    let subscriber = RecordingSubscriber::cancelling_after(3, u64::MAX);

    publisher.subscribe(subscriber.clone());

    assert!(subscriber.wait_for_items(3, TIMEOUT));
    thread::sleep(Duration::from_millis(20));
    assert!(publisher.is_cancelled());
    assert_eq!(publisher.cancel_count(), 1);
    assert_eq!(subscriber.terminal_count(), 0);
    assert!(subscriber.item_count() < 1_000);

    Ok(())
}
