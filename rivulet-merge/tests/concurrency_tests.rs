// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use rand::Rng;
use rivulet_core::{Publisher, RivuletError};
use rivulet_merge::{MergeOptions, PendingDemand, StreamMerger};
use rivulet_test_utils::{init_tracing, ManualPublisher, RecordingSubscriber, ThreadedPublisher};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(10);
const ROUNDS: usize = 50;

fn threaded(count: usize, items: u32) -> Vec<Arc<ThreadedPublisher<u32>>> {
    (0..count)
        .map(|lane| {
            let base = lane as u32 * items;
            Arc::new(ThreadedPublisher::new((base..base + items).collect()))
        })
        .collect()
}

#[test]
fn test_threaded_upstreams_complete_once_without_overlap() -> anyhow::Result<()> {
    // Arrange
    init_tracing();
    let upstreams = threaded(8, 2_000);
    let merger = StreamMerger::new(upstreams.clone())?;
    let subscriber = RecordingSubscriber::with_initial_request(u64::MAX);

    // Act
    merger.subscribe(subscriber.clone());

    // Assert
    assert!(subscriber.wait_for_terminal(TIMEOUT));
    assert_eq!(subscriber.item_count(), 16_000);
    assert_eq!(subscriber.completions(), 1);
    assert!(subscriber.terminated_once_at_end());
    assert_eq!(subscriber.overlapping_calls(), 0);
    assert!(upstreams.iter().all(|u| u.cancel_count() == 0));

    Ok(())
}

#[test]
fn test_threaded_upstreams_respect_bounded_demand() -> anyhow::Result<()> {
    // Arrange
    let upstreams = threaded(4, 100);
    let merger = StreamMerger::new(upstreams)?;
    let subscriber = RecordingSubscriber::with_initial_request(10);

    // Act
    merger.subscribe(subscriber.clone());

    // Assert
    assert!(subscriber.wait_for_items(40, TIMEOUT));
    thread::sleep(Duration::from_millis(50));
    assert_eq!(subscriber.item_count(), 40, "each upstream gets the same n");

    subscriber.request(u64::MAX);
    assert!(subscriber.wait_for_terminal(TIMEOUT));
    assert_eq!(subscriber.item_count(), 400);
    assert_eq!(subscriber.overlapping_calls(), 0);

    Ok(())
}

#[test]
fn test_failing_threaded_upstream_terminates_once() -> anyhow::Result<()> {
    // Arrange
    let mut upstreams = threaded(6, 5_000);
    let failing = Arc::new(ThreadedPublisher::failing(
        (0..10).collect(),
        RivuletError::upstream("sensor lost"),
    ));
    upstreams.push(Arc::clone(&failing));
    let merger = StreamMerger::new(upstreams.clone())?;
    let subscriber = RecordingSubscriber::with_initial_request(u64::MAX);

    // Act
    merger.subscribe(subscriber.clone());

    // Assert
    assert!(subscriber.wait_for_terminal(TIMEOUT));
    thread::sleep(Duration::from_millis(20));
    assert_eq!(subscriber.terminal_count(), 1);
    assert_eq!(subscriber.completions(), 0);
    assert_eq!(subscriber.errors().len(), 1);
    assert!(subscriber.terminated_once_at_end());
    assert_eq!(subscriber.overlapping_calls(), 0);
    assert_eq!(failing.cancel_count(), 0);
    assert!(upstreams.iter().all(|u| u.cancel_count() <= 1));

    Ok(())
}

#[test]
fn test_cancel_racing_emission_stops_delivery() -> anyhow::Result<()> {
    // Arrange
    let upstreams = threaded(4, 50_000);
    let merger = StreamMerger::new(upstreams.clone())?;
    let subscriber = RecordingSubscriber::with_initial_request(u64::MAX);
    merger.subscribe(subscriber.clone());
    assert!(subscriber.wait_for_items(100, TIMEOUT));

    // Act
    let cancellers: Vec<_> = (0..4)
        .map(|_| {
            let subscriber = Arc::clone(&subscriber);
            thread::spawn(move || subscriber.cancel())
        })
        .collect();
    for canceller in cancellers {
        canceller.join().map_err(|_| anyhow::anyhow!("canceller panicked"))?;
    }
    thread::sleep(Duration::from_millis(20));
    let settled = subscriber.item_count();
    thread::sleep(Duration::from_millis(50));

    // Assert
    assert_eq!(subscriber.item_count(), settled, "no delivery after cancel");
    assert!(subscriber.terminal_count() <= 1);
    assert_eq!(subscriber.overlapping_calls(), 0);
    assert!(upstreams.iter().all(|u| u.cancel_count() <= 1));
    assert!(
        upstreams.iter().any(|u| u.is_cancelled()) || subscriber.completions() == 1,
        "either cancellation reached the upstreams or the merge had already completed"
    );

    Ok(())
}

#[test]
fn test_concurrent_completions_complete_exactly_once() -> anyhow::Result<()> {
    for _ in 0..ROUNDS {
        // Arrange
        let upstreams: Vec<ManualPublisher<u32>> = (0..16).map(|_| ManualPublisher::new()).collect();
        let merger = StreamMerger::new(upstreams.clone())?;
        let subscriber = RecordingSubscriber::with_initial_request(u64::MAX);
        merger.subscribe(subscriber.clone());
        let barrier = Arc::new(Barrier::new(upstreams.len()));

        // Act
        thread::scope(|scope| {
            for (lane, upstream) in upstreams.iter().enumerate() {
                let barrier = Arc::clone(&barrier);
                scope.spawn(move || {
                    barrier.wait();
                    upstream.next(lane as u32);
                    upstream.complete();
                });
            }
        });

        // Assert
        assert_eq!(subscriber.item_count(), 16);
        assert_eq!(subscriber.completions(), 1);
        assert!(subscriber.terminated_once_at_end());
        assert_eq!(subscriber.overlapping_calls(), 0);
    }

    Ok(())
}

#[test]
fn test_error_racing_cancel_delivers_at_most_one_terminal() -> anyhow::Result<()> {
    for _ in 0..ROUNDS {
        // Arrange
        let upstreams: Vec<ManualPublisher<u32>> = (0..3).map(|_| ManualPublisher::new()).collect();
        let merger = StreamMerger::new(upstreams.clone())?;
        let subscriber = RecordingSubscriber::with_initial_request(8);
        merger.subscribe(subscriber.clone());
        let barrier = Barrier::new(3);

        // Act
        thread::scope(|scope| {
            scope.spawn(|| {
                barrier.wait();
                upstreams[0].error(RivuletError::upstream("first"));
            });
            scope.spawn(|| {
                barrier.wait();
                upstreams[1].error(RivuletError::upstream("second"));
            });
            scope.spawn(|| {
                barrier.wait();
                subscriber.cancel();
            });
        });

        // Assert
        assert!(subscriber.terminal_count() <= 1);
        assert_eq!(subscriber.item_count(), 0);
        assert_eq!(upstreams[2].cancel_count(), 1);
        assert!(upstreams.iter().all(|u| u.cancel_count() <= 1));
    }

    Ok(())
}

#[test]
fn test_buffered_demand_racing_registration_is_delivered_once() -> anyhow::Result<()> {
    for _ in 0..ROUNDS {
        // Arrange
        let late = ManualPublisher::<u32>::deferred();
        let early = ManualPublisher::new();
        let options = MergeOptions::default().pending_demand(PendingDemand::Buffer);
        let merger = StreamMerger::with_options(vec![late.clone(), early.clone()], options)?;
        let subscriber = RecordingSubscriber::new();
        merger.subscribe(subscriber.clone());
        let requests: Vec<u64> = {
            let mut rng = rand::rng();
            (0..200).map(|_| rng.random_range(1..=5)).collect()
        };
        let total: u64 = requests.iter().sum();

        // Act
        thread::scope(|scope| {
            scope.spawn(|| {
                for n in &requests {
                    subscriber.request(*n);
                }
            });
            scope.spawn(|| late.deliver_subscription());
        });

        // Assert
        assert_eq!(early.total_requested(), total);
        assert_eq!(late.total_requested(), total);
    }

    Ok(())
}

#[test]
fn test_late_registration_racing_cancel_is_cancelled_once() -> anyhow::Result<()> {
    for _ in 0..ROUNDS {
        // Arrange
        let late = ManualPublisher::<u32>::deferred();
        let early = ManualPublisher::new();
        let merger = StreamMerger::new(vec![late.clone(), early.clone()])?;
        let subscriber = RecordingSubscriber::with_initial_request(1);
        merger.subscribe(subscriber.clone());
        let barrier = Barrier::new(2);

        // Act
        thread::scope(|scope| {
            scope.spawn(|| {
                barrier.wait();
                late.deliver_subscription();
            });
            scope.spawn(|| {
                barrier.wait();
                subscriber.cancel();
            });
        });

        // Assert
        assert_eq!(late.cancel_count(), 1);
        assert_eq!(early.cancel_count(), 1);
    }

    Ok(())
}
