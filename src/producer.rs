//! Producers: blueprints that start an independent run for every consumer
//! subscribed to them.

use crate::{
  consumer::{Completion, Consumer, Sink},
  ops::receive_values_on::ReceiveValuesOn,
  scheduler::Scheduler,
  subscription::Cancellable,
};

pub mod deferred_future;

pub use deferred_future::{DeferredFuture, Promise};

/// Something a [`Consumer`] can subscribe to.
///
/// A producer is not a running process: every call to
/// [`subscribe`](Producer::subscribe) starts a new, independent run. The
/// producer hands the consumer its subscription through
/// [`Consumer::on_subscribe`] and emits no more values than the consumer
/// requested.
pub trait Producer {
  type Item;
  type Err;

  fn subscribe<C>(&self, consumer: C)
  where
    C: Consumer<Self::Item, Self::Err> + Send + 'static;
}

/// Operators and terminal helpers available on every [`Producer`].
pub trait ProducerExt: Producer + Sized {
  /// Delivers values and the completion on `scheduler`.
  ///
  /// Unlike a plain "observe on" operator only values and the completion are
  /// rescheduled: the subscription handshake, including the consumer's
  /// `on_subscribe` and its demand requests, stays on the calling thread.
  fn receive_values_on<S: Scheduler>(self, scheduler: S) -> ReceiveValuesOn<Self, S> {
    ReceiveValuesOn::new(self, scheduler, None)
  }

  /// Same as [`receive_values_on`](ProducerExt::receive_values_on), passing
  /// `options` to the scheduler with every task.
  fn receive_values_on_with<S: Scheduler>(
    self,
    scheduler: S,
    options: S::Options,
  ) -> ReceiveValuesOn<Self, S> {
    ReceiveValuesOn::new(self, scheduler, Some(options))
  }

  /// Subscribes with unbounded demand, handing every value to `on_value` and
  /// the end of the stream to `on_completion`.
  ///
  /// The consumer stays alive until the stream terminates or the returned
  /// handle is cancelled.
  fn sink<N, C>(&self, on_value: N, on_completion: C) -> Cancellable
  where
    N: FnMut(Self::Item) + Send + 'static,
    C: FnOnce(Completion<Self::Err>) + Send + 'static,
  {
    let sink = Sink::new(on_value, on_completion);
    let cancellable = sink.cancellable();
    self.subscribe(sink);
    cancellable
  }
}

impl<P: Producer> ProducerExt for P {}
