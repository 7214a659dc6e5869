// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use rivulet_core::{
    debug, trace, Publisher, Result, RivuletError, Signal, Subscriber, Subscription,
};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Adapts any [`Publisher`] into a [`futures::Stream`].
///
/// The stream subscribes immediately and asks for `batch` items at a time,
/// requesting another batch each time the previous one has been consumed.
/// Upstream errors surface as a final `Err` item. A publisher that lets go of the
/// subscriber without a terminal signal ends the stream with
/// [`RivuletError::Cancelled`]. Dropping the stream cancels the subscription.
///
/// ```
/// use futures::StreamExt;
/// use rivulet_stream::{IterPublisher, PublisherStreamExt};
///
/// # futures::executor::block_on(async {
/// let items: Vec<_> = IterPublisher::new(vec![1, 2, 3])
///     .into_stream(2)
///     .map(|item| item.unwrap())
///     .collect()
///     .await;
/// assert_eq!(items, vec![1, 2, 3]);
/// # });
/// ```
pub trait PublisherStreamExt<T>: Publisher<T> + Sized
where
    T: Send + 'static,
{
    /// Subscribes and returns the signals as a stream. A `batch` of zero is
    /// treated as one.
    fn into_stream(self, batch: u64) -> PublisherStream<T> {
        PublisherStream::subscribe(&self, batch)
    }
}

impl<T, P> PublisherStreamExt<T> for P
where
    T: Send + 'static,
    P: Publisher<T>,
{
}

type SubscriptionSlot = Arc<Mutex<Option<Arc<dyn Subscription>>>>;

/// Owned by the publisher only, so the channel disconnects once the publisher drops it.
struct ChannelSubscriber<T> {
    sender: UnboundedSender<Signal<T>>,
    subscription: SubscriptionSlot,
    batch: u64,
}

impl<T: Send> Subscriber<T> for ChannelSubscriber<T> {
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        *self.subscription.lock() = Some(Arc::clone(&subscription));
        subscription.request(self.batch);
    }

    fn on_next(&self, item: T) {
        // A closed channel means the stream was dropped and has already cancelled.
        let _ = self.sender.unbounded_send(Signal::Next(item));
    }

    fn on_error(&self, error: RivuletError) {
        let _ = self.sender.unbounded_send(Signal::Error(error));
        self.sender.close_channel();
    }

    fn on_complete(&self) {
        let _ = self.sender.unbounded_send(Signal::Complete);
        self.sender.close_channel();
    }
}

/// The stream returned by [`PublisherStreamExt::into_stream`].
pub struct PublisherStream<T> {
    receiver: UnboundedReceiver<Signal<T>>,
    subscription: SubscriptionSlot,
    batch: u64,
    outstanding: u64,
    terminated: bool,
}

impl<T: Send + 'static> PublisherStream<T> {
    fn subscribe<P: Publisher<T> + ?Sized>(publisher: &P, batch: u64) -> Self {
        let batch = batch.max(1);
        let (sender, receiver) = mpsc::unbounded();
        let subscription: SubscriptionSlot = Arc::new(Mutex::new(None));
        publisher.subscribe(Arc::new(ChannelSubscriber {
            sender,
            subscription: Arc::clone(&subscription),
            batch,
        }));

        Self {
            receiver,
            subscription,
            batch,
            outstanding: batch,
            terminated: false,
        }
    }

    fn replenish(&mut self) {
        self.outstanding = self.outstanding.saturating_sub(1);
        if self.outstanding == 0 {
            self.outstanding = self.batch;
            let subscription = self.subscription.lock().clone();
            if let Some(subscription) = subscription {
                trace!("requesting next batch");
                subscription.request(self.batch);
            }
        }
    }
}

impl<T: Send + 'static> Stream for PublisherStream<T> {
    type Item = Result<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.terminated {
            return Poll::Ready(None);
        }

        match this.receiver.poll_next_unpin(cx) {
            Poll::Ready(Some(Signal::Next(item))) => {
                this.replenish();
                Poll::Ready(Some(Ok(item)))
            }
            Poll::Ready(Some(Signal::Error(error))) => {
                this.terminated = true;
                Poll::Ready(Some(Err(error)))
            }
            Poll::Ready(Some(Signal::Complete)) => {
                this.terminated = true;
                Poll::Ready(None)
            }
            Poll::Ready(None) => {
                this.terminated = true;
                debug!("publisher released the subscriber without a terminal signal");
                Poll::Ready(Some(Err(RivuletError::Cancelled)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> Drop for PublisherStream<T> {
    fn drop(&mut self) {
        self.receiver.close();
        if self.terminated {
            return;
        }
        if let Some(subscription) = self.subscription.lock().take() {
            subscription.cancel();
        }
    }
}
