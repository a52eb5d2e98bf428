use std::sync::Arc;

use futures::{
  future::{Future, FutureExt},
  task::{Spawn, SpawnError, SpawnExt},
};

use crate::{
  consumer::Consumer,
  demand::Demand,
  producer::Producer,
  rc::MutArc,
  serialize::{SerializedConsumer, Signal},
  subscription::Subscription,
};

type Attempt<T, E> = Arc<dyn Fn(Promise<T, E>) + Send + Sync>;

/// A producer that eventually emits one value and then finishes, or fails.
///
/// Nothing happens on subscription: the computation passed to
/// [`DeferredFuture::new`] only starts once the consumer requests at least
/// one value, and it starts again for every new subscription.
///
/// ```rust
/// # use rxdemand::prelude::*;
/// # use std::sync::{Arc, Mutex};
/// let answer = DeferredFuture::<i32, ()>::new(|promise| promise.succeed(42));
/// let res = Arc::new(Mutex::new(vec![]));
/// let c_res = res.clone();
/// answer.sink(move |v| c_res.lock().unwrap().push(v), |_| {});
/// assert_eq!(*res.lock().unwrap(), vec![42]);
/// ```
pub struct DeferredFuture<T, E> {
  attempt: Attempt<T, E>,
}

impl<T, E> Clone for DeferredFuture<T, E> {
  fn clone(&self) -> Self { DeferredFuture { attempt: self.attempt.clone() } }
}

impl<T, E> DeferredFuture<T, E> {
  /// `attempt` receives a [`Promise`] and must fulfil it exactly once, on any
  /// thread, now or later.
  pub fn new<F>(attempt: F) -> Self
  where
    F: Fn(Promise<T, E>) + Send + Sync + 'static,
  {
    DeferredFuture { attempt: Arc::new(attempt) }
  }
}

impl<T, E> DeferredFuture<T, E>
where
  T: Send + 'static,
  E: From<SpawnError> + Send + 'static,
{
  /// Runs a future built by `make_future` on `spawner` for every subscription
  /// that requests a value. Failing to spawn fails the subscription.
  pub fn from_future<Sp, F, Fut>(spawner: Sp, make_future: F) -> Self
  where
    Sp: Spawn + Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
  {
    DeferredFuture::new(move |promise: Promise<T, E>| {
      let slot = MutArc::own(Some(promise));
      let c_slot = slot.clone();
      let fulfil = make_future().map(move |result| {
        let promise = c_slot.rc_deref_mut().take();
        if let Some(promise) = promise {
          promise.fulfill(result);
        }
      });
      if let Err(err) = spawner.spawn(fulfil) {
        let promise = slot.rc_deref_mut().take();
        if let Some(promise) = promise {
          promise.fail(E::from(err));
        }
      }
    })
  }
}

impl<T, E> Producer for DeferredFuture<T, E>
where
  T: Send + 'static,
  E: Send + 'static,
{
  type Item = T;
  type Err = E;

  fn subscribe<C>(&self, consumer: C)
  where
    C: Consumer<T, E> + Send + 'static,
  {
    let downstream = SerializedConsumer::new(consumer);
    let subscription = DeferredFutureSubscription {
      state: MutArc::own(State::WaitingForDemand(self.attempt.clone())),
      downstream: downstream.clone(),
    };
    downstream.emit([Signal::Subscribe(Arc::new(subscription))]);
  }
}

/// The one-shot completion handle given to a [`DeferredFuture`]'s
/// computation.
///
/// Fulfilling consumes the promise. A result that arrives after the
/// subscription was cancelled is dropped.
pub struct Promise<T, E> {
  subscription: DeferredFutureSubscription<T, E>,
}

impl<T, E> Promise<T, E> {
  pub fn fulfill(self, result: Result<T, E>) { self.subscription.fulfill(result) }

  #[inline]
  pub fn succeed(self, value: T) { self.fulfill(Ok(value)) }

  #[inline]
  pub fn fail(self, err: E) { self.fulfill(Err(err)) }
}

enum State<T, E> {
  WaitingForDemand(Attempt<T, E>),
  WaitingForFulfillment,
  Finished,
}

struct DeferredFutureSubscription<T, E> {
  state: MutArc<State<T, E>>,
  downstream: SerializedConsumer<T, E>,
}

impl<T, E> Clone for DeferredFutureSubscription<T, E> {
  fn clone(&self) -> Self {
    DeferredFutureSubscription {
      state: self.state.clone(),
      downstream: self.downstream.clone(),
    }
  }
}

impl<T, E> DeferredFutureSubscription<T, E> {
  fn fulfill(&self, result: Result<T, E>) {
    {
      let mut state = self.state.rc_deref_mut();
      if !matches!(*state, State::WaitingForFulfillment) {
        log::trace!("deferred future: dropping result of a finished subscription");
        return;
      }
      *state = State::Finished;
    }
    // Value and completion go out as one unit: a racing cancel that lost the
    // state transition above cannot split them.
    match result {
      Ok(value) => self.downstream.emit([Signal::Next(value), Signal::Complete]),
      Err(err) => self.downstream.emit([Signal::Error(err)]),
    }
  }
}

impl<T, E> Subscription for DeferredFutureSubscription<T, E>
where
  T: Send,
  E: Send,
{
  fn request(&self, demand: Demand) {
    if demand.is_none() {
      return;
    }
    let attempt = {
      let mut state = self.state.rc_deref_mut();
      match std::mem::replace(&mut *state, State::WaitingForFulfillment) {
        State::WaitingForDemand(attempt) => attempt,
        other => {
          *state = other;
          return;
        }
      }
    };
    log::trace!("deferred future: demand {demand} received, starting computation");
    attempt(Promise { subscription: self.clone() });
  }

  fn cancel(&self) {
    let previous = std::mem::replace(&mut *self.state.rc_deref_mut(), State::Finished);
    if !matches!(previous, State::Finished) {
      self.downstream.close();
    }
  }
}
