use std::sync::Arc;

use crate::{
  consumer::Consumer,
  demand::Demand,
  error::ProtocolViolation,
  producer::Producer,
  rc::MutArc,
  scheduler::Scheduler,
  serialize::{SerializedConsumer, Signal},
  subscription::{Subscription, SubscriptionHandle},
};

/// A producer that delivers its upstream's values and completion on a
/// scheduler, created by
/// [`ProducerExt::receive_values_on`](crate::producer::ProducerExt::receive_values_on).
///
/// Only values and the completion are rescheduled. The consumer receives its
/// subscription synchronously inside `subscribe`, and its demand requests
/// reach the upstream on the thread that makes them.
///
/// Values and the completion are delivered on the thread that runs the
/// scheduled task, even while the consumer's `on_subscribe` is still running
/// elsewhere: the task then waits for it to return.
///
/// The upstream is always granted unbounded demand from `on_next`: demand
/// returned by the downstream consumer does not cross the scheduler.
#[derive(Clone)]
pub struct ReceiveValuesOn<P, S: Scheduler> {
  upstream: P,
  scheduler: S,
  options: Option<S::Options>,
}

impl<P, S: Scheduler> ReceiveValuesOn<P, S> {
  pub(crate) fn new(upstream: P, scheduler: S, options: Option<S::Options>) -> Self {
    ReceiveValuesOn { upstream, scheduler, options }
  }
}

impl<P, S> Producer for ReceiveValuesOn<P, S>
where
  P: Producer + Clone + Send + 'static,
  P::Item: Send + 'static,
  P::Err: Send + 'static,
  S: Scheduler,
{
  type Item = P::Item;
  type Err = P::Err;

  fn subscribe<C>(&self, consumer: C)
  where
    C: Consumer<P::Item, P::Err> + Send + 'static,
  {
    let downstream = SerializedConsumer::new(consumer);
    let target = Target {
      scheduler: self.scheduler.clone(),
      options: self.options.clone(),
    };
    let subscription = ReceiveValuesOnSubscription {
      state: MutArc::own(State::WaitingForRequest(self.upstream.clone(), target)),
      downstream: downstream.clone(),
    };
    downstream.emit([Signal::Subscribe(Arc::new(subscription))]);
  }
}

struct Target<S: Scheduler> {
  scheduler: S,
  options: Option<S::Options>,
}

impl<S: Scheduler> Target<S> {
  #[inline]
  fn schedule(&self, task: impl FnOnce() + Send + 'static) {
    self.scheduler.schedule(self.options.as_ref(), task)
  }
}

impl<S: Scheduler> Clone for Target<S> {
  fn clone(&self) -> Self {
    Target {
      scheduler: self.scheduler.clone(),
      options: self.options.clone(),
    }
  }
}

enum State<P, S: Scheduler> {
  WaitingForRequest(P, Target<S>),
  WaitingForSubscription(Target<S>, Demand),
  Subscribed(Target<S>, SubscriptionHandle),
  Finished,
}

/// The subscription handed downstream, and at the same time the consumer
/// subscribed to the upstream.
struct ReceiveValuesOnSubscription<P: Producer, S: Scheduler> {
  state: MutArc<State<P, S>>,
  downstream: SerializedConsumer<P::Item, P::Err>,
}

impl<P: Producer, S: Scheduler> Clone for ReceiveValuesOnSubscription<P, S> {
  fn clone(&self) -> Self {
    ReceiveValuesOnSubscription {
      state: self.state.clone(),
      downstream: self.downstream.clone(),
    }
  }
}

impl<P: Producer, S: Scheduler> ReceiveValuesOnSubscription<P, S> {
  /// The target scheduler, if signals from the upstream are still wanted.
  fn subscribed_target(&self) -> Option<Target<S>> {
    match &*self.state.rc_deref_mut() {
      State::Subscribed(target, _) => Some(target.clone()),
      _ => None,
    }
  }

  /// Runs inside a scheduled task. Delivery happens on the task's thread: if
  /// the downstream is still inside `on_subscribe` on the subscribing thread,
  /// this waits for it to return.
  fn deliver_next(&self, value: P::Item) {
    if !matches!(*self.state.rc_deref_mut(), State::Subscribed(..)) {
      log::trace!("receive_values_on: dropping value scheduled before cancellation");
      return;
    }
    self.downstream.emit_here([Signal::Next(value)]);
  }

  fn deliver_terminal(&self, signal: Signal<P::Item, P::Err>) {
    {
      let mut state = self.state.rc_deref_mut();
      if !matches!(*state, State::Subscribed(..)) {
        log::trace!("receive_values_on: dropping completion scheduled before cancellation");
        return;
      }
      *state = State::Finished;
    }
    self.downstream.emit_here([signal]);
  }
}

impl<P, S> Subscription for ReceiveValuesOnSubscription<P, S>
where
  P: Producer + Send + 'static,
  P::Item: Send + 'static,
  P::Err: Send + 'static,
  S: Scheduler,
{
  fn request(&self, demand: Demand) {
    let mut state = self.state.rc_deref_mut();
    match std::mem::replace(&mut *state, State::Finished) {
      State::WaitingForRequest(upstream, target) => {
        *state = State::WaitingForSubscription(target, demand);
        drop(state);
        log::trace!("receive_values_on: first demand {demand}, subscribing upstream");
        upstream.subscribe(self.clone());
      }
      State::WaitingForSubscription(target, pending) => {
        *state = State::WaitingForSubscription(target, pending + demand);
      }
      State::Subscribed(target, subscription) => {
        *state = State::Subscribed(target, subscription.clone());
        drop(state);
        subscription.request(demand);
      }
      State::Finished => {}
    }
  }

  fn cancel(&self) {
    let previous = std::mem::replace(&mut *self.state.rc_deref_mut(), State::Finished);
    if let State::Subscribed(_, subscription) = previous {
      subscription.cancel();
    }
    // Also after `Finished`: a terminal signal may still be queued behind the
    // value the consumer is handling right now.
    self.downstream.close();
  }
}

impl<P, S> Consumer<P::Item, P::Err> for ReceiveValuesOnSubscription<P, S>
where
  P: Producer + Send + 'static,
  P::Item: Send + 'static,
  P::Err: Send + 'static,
  S: Scheduler,
{
  /// Accepts the upstream subscription and forwards the demand accumulated
  /// so far.
  ///
  /// A subscription arriving after the downstream cancelled is the benign
  /// race between `cancel` and an upstream that subscribes asynchronously: it
  /// is cancelled on the spot rather than treated as a protocol violation.
  /// Arriving before any request or a second time panics.
  fn on_subscribe(&mut self, subscription: SubscriptionHandle) {
    let demand = {
      let mut state = self.state.rc_deref_mut();
      match std::mem::replace(&mut *state, State::Finished) {
        State::WaitingForSubscription(target, demand) => {
          *state = State::Subscribed(target, subscription.clone());
          demand
        }
        State::Finished => {
          drop(state);
          log::trace!("receive_values_on: cancelled before the upstream subscribed");
          subscription.cancel();
          return;
        }
        State::WaitingForRequest(upstream, target) => {
          *state = State::WaitingForRequest(upstream, target);
          drop(state);
          panic!("{}", ProtocolViolation::UnsolicitedSubscription);
        }
        subscribed @ State::Subscribed(..) => {
          *state = subscribed;
          drop(state);
          panic!("{}", ProtocolViolation::DuplicateSubscription);
        }
      }
    };
    subscription.request(demand);
  }

  fn on_next(&mut self, value: P::Item) -> Demand {
    if let Some(target) = self.subscribed_target() {
      let this = self.clone();
      target.schedule(move || this.deliver_next(value));
    }
    // TODO: propagate the downstream's demand instead of granting unbounded
    // demand; needs the scheduled task to report back what was requested.
    Demand::unbounded()
  }

  fn on_complete(&mut self) {
    if let Some(target) = self.subscribed_target() {
      let this = self.clone();
      target.schedule(move || this.deliver_terminal(Signal::Complete));
    }
  }

  fn on_error(&mut self, err: P::Err) {
    if let Some(target) = self.subscribed_target() {
      let this = self.clone();
      target.schedule(move || this.deliver_terminal(Signal::Error(err)));
    }
  }
}
