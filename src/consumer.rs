//! Consumer trait and implementations
//!
//! A consumer receives its subscription first, then zero or more values, then
//! at most one terminal signal. Values only arrive as far as the consumer has
//! requested them through its subscription.

use crate::{
  demand::Demand,
  subscription::{Cancellable, SubscriptionHandle},
};

// ============================================================================
// Consumer Trait
// ============================================================================

/// The receiving side of a producer/consumer relationship.
///
/// Producers in this crate never overlap calls to the same consumer, and stop
/// calling it after `on_complete` or `on_error`.
pub trait Consumer<Item, Err> {
  /// Receives the handle used to request values and to cancel.
  fn on_subscribe(&mut self, subscription: SubscriptionHandle);

  /// Receives a value and returns how much additional demand it grants.
  fn on_next(&mut self, value: Item) -> Demand;

  /// The producer finished normally.
  fn on_complete(&mut self);

  /// The producer failed.
  fn on_error(&mut self, err: Err);
}

impl<C, Item, Err> Consumer<Item, Err> for Box<C>
where
  C: Consumer<Item, Err> + ?Sized,
{
  #[inline]
  fn on_subscribe(&mut self, subscription: SubscriptionHandle) { (**self).on_subscribe(subscription) }

  #[inline]
  fn on_next(&mut self, value: Item) -> Demand { (**self).on_next(value) }

  #[inline]
  fn on_complete(&mut self) { (**self).on_complete() }

  #[inline]
  fn on_error(&mut self, err: Err) { (**self).on_error(err) }
}

/// Boxed consumer, the type-erased form producers keep internally.
pub type BoxedConsumer<Item, Err> = Box<dyn Consumer<Item, Err> + Send>;

// ============================================================================
// Completion
// ============================================================================

/// How a stream ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Completion<Err> {
  Finished,
  Failure(Err),
}

impl<Err> Completion<Err> {
  #[inline]
  pub fn is_failure(&self) -> bool { matches!(self, Completion::Failure(_)) }

  pub fn into_result(self) -> Result<(), Err> {
    match self {
      Completion::Finished => Ok(()),
      Completion::Failure(err) => Err(err),
    }
  }
}

impl<Err> From<Result<(), Err>> for Completion<Err> {
  fn from(result: Result<(), Err>) -> Self {
    match result {
      Ok(()) => Completion::Finished,
      Err(err) => Completion::Failure(err),
    }
  }
}

// ============================================================================
// Sink - Closure adapter
// ============================================================================

/// A consumer made of two closures: one for values, one for the completion.
///
/// It requests unbounded demand as soon as it is subscribed, and registers the
/// subscription in a [`Cancellable`] so it can be cancelled from outside.
pub struct Sink<N, C> {
  on_value: N,
  on_completion: Option<C>,
  cancellable: Cancellable,
}

impl<N, C> Sink<N, C> {
  pub fn new(on_value: N, on_completion: C) -> Self {
    Sink {
      on_value,
      on_completion: Some(on_completion),
      cancellable: Cancellable::default(),
    }
  }

  /// A handle that cancels whatever subscription this sink receives.
  pub fn cancellable(&self) -> Cancellable { self.cancellable.clone() }

  fn finish<Err>(&mut self, completion: Completion<Err>)
  where
    C: FnOnce(Completion<Err>),
  {
    self.cancellable.close();
    if let Some(on_completion) = self.on_completion.take() {
      on_completion(completion);
    }
  }
}

impl<N, C, Item, Err> Consumer<Item, Err> for Sink<N, C>
where
  N: FnMut(Item),
  C: FnOnce(Completion<Err>),
{
  fn on_subscribe(&mut self, subscription: SubscriptionHandle) {
    if self.cancellable.attach(subscription.clone()) {
      subscription.request(Demand::unbounded());
    } else {
      subscription.cancel();
    }
  }

  fn on_next(&mut self, value: Item) -> Demand {
    (self.on_value)(value);
    Demand::none()
  }

  fn on_complete(&mut self) { self.finish(Completion::Finished); }

  fn on_error(&mut self, err: Err) { self.finish(Completion::Failure(err)); }
}

// ============================================================================
// Tests
// ============================================================================
