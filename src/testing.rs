//! Recording consumer and hand-driven producers shared by the unit tests.

use std::{
  collections::VecDeque,
  sync::{Arc, Mutex},
};

use crate::{
  consumer::{BoxedConsumer, Consumer},
  demand::Demand,
  producer::Producer,
  rc::MutArc,
  serialize::{SerializedConsumer, Signal},
  subscription::{Subscription, SubscriptionHandle},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event<T, E> {
  Subscribed,
  Next(T),
  Complete,
  Error(E),
}

type Hook = Box<dyn FnMut(&SubscriptionHandle) + Send>;

pub(crate) struct Recorder<T, E> {
  probe: Probe<T, E>,
  initial: Demand,
  on_next: Option<Hook>,
}

pub(crate) struct Probe<T, E> {
  events: Arc<Mutex<Vec<Event<T, E>>>>,
  subscription: Arc<Mutex<Option<SubscriptionHandle>>>,
}

impl<T, E> Clone for Probe<T, E> {
  fn clone(&self) -> Self {
    Probe {
      events: self.events.clone(),
      subscription: self.subscription.clone(),
    }
  }
}

impl<T: Clone, E: Clone> Probe<T, E> {
  pub(crate) fn events(&self) -> Vec<Event<T, E>> { self.events.lock().unwrap().clone() }
}

impl<T, E> Probe<T, E> {
  pub(crate) fn len(&self) -> usize { self.events.lock().unwrap().len() }

  pub(crate) fn request(&self, demand: Demand) {
    let subscription = self.subscription.lock().unwrap().clone();
    subscription.expect("not subscribed").request(demand);
  }

  pub(crate) fn cancel(&self) {
    let subscription = self.subscription.lock().unwrap().clone();
    subscription.expect("not subscribed").cancel();
  }
}

impl<T, E> Recorder<T, E> {
  /// A consumer that requests `initial` from inside `on_subscribe`, unless it
  /// is `Demand::none()`.
  pub(crate) fn requesting(initial: Demand) -> (Self, Probe<T, E>) {
    let probe = Probe {
      events: Arc::default(),
      subscription: Arc::default(),
    };
    let recorder = Recorder {
      probe: probe.clone(),
      initial,
      on_next: None,
    };
    (recorder, probe)
  }

  /// Runs `hook` with the subscription after every recorded value.
  pub(crate) fn after_next(mut self, hook: impl FnMut(&SubscriptionHandle) + Send + 'static) -> Self {
    self.on_next = Some(Box::new(hook));
    self
  }

  fn record(&self, event: Event<T, E>) { self.probe.events.lock().unwrap().push(event); }
}

impl<T, E> Consumer<T, E> for Recorder<T, E> {
  fn on_subscribe(&mut self, subscription: SubscriptionHandle) {
    self.record(Event::Subscribed);
    *self.probe.subscription.lock().unwrap() = Some(subscription.clone());
    if !self.initial.is_none() {
      subscription.request(self.initial);
    }
  }

  fn on_next(&mut self, value: T) -> Demand {
    self.record(Event::Next(value));
    let subscription = self.probe.subscription.lock().unwrap().clone();
    if let (Some(hook), Some(subscription)) = (self.on_next.as_mut(), subscription) {
      hook(&subscription);
    }
    Demand::none()
  }

  fn on_complete(&mut self) { self.record(Event::Complete); }

  fn on_error(&mut self, err: E) { self.record(Event::Error(err)); }
}

/// A subscription that records what it was asked to do.
#[derive(Default)]
pub(crate) struct SpySubscription {
  pub(crate) requests: Mutex<Vec<Demand>>,
  pub(crate) cancels: Mutex<usize>,
}

impl Subscription for SpySubscription {
  fn request(&self, demand: Demand) { self.requests.lock().unwrap().push(demand); }

  fn cancel(&self) { *self.cancels.lock().unwrap() += 1; }
}

/// Emits its values as demand allows, then completes.
#[derive(Clone)]
pub(crate) struct FromVec(pub(crate) Vec<i32>);

struct FromVecSubscription {
  remaining: MutArc<VecDeque<i32>>,
  downstream: SerializedConsumer<i32, String>,
}

impl Producer for FromVec {
  type Item = i32;
  type Err = String;

  fn subscribe<C>(&self, consumer: C)
  where
    C: Consumer<i32, String> + Send + 'static,
  {
    let downstream = SerializedConsumer::new(consumer);
    let subscription = FromVecSubscription {
      remaining: MutArc::own(self.0.iter().copied().collect()),
      downstream: downstream.clone(),
    };
    downstream.emit([Signal::Subscribe(Arc::new(subscription))]);
  }
}

impl Subscription for FromVecSubscription {
  fn request(&self, demand: Demand) {
    let (batch, done) = {
      let mut remaining = self.remaining.rc_deref_mut();
      let n = match demand {
        Demand::Bounded(n) => n.min(remaining.len()),
        Demand::Unbounded => remaining.len(),
      };
      let batch: Vec<_> = remaining.drain(..n).collect();
      (batch, remaining.is_empty())
    };
    let signals = batch.into_iter().map(Signal::Next);
    if done {
      self.downstream.emit(signals.chain([Signal::Complete]));
    } else {
      self.downstream.emit(signals);
    }
  }

  fn cancel(&self) { self.downstream.close(); }
}

/// Keeps every consumer subscribed to it, so a test can drive the upstream
/// side of an operator by hand.
#[derive(Clone, Default)]
pub(crate) struct Stash(Arc<Mutex<Vec<BoxedConsumer<i32, String>>>>);

impl Stash {
  pub(crate) fn len(&self) -> usize { self.0.lock().unwrap().len() }

  pub(crate) fn take(&self) -> BoxedConsumer<i32, String> { self.0.lock().unwrap().remove(0) }
}

impl Producer for Stash {
  type Item = i32;
  type Err = String;

  fn subscribe<C>(&self, consumer: C)
  where
    C: Consumer<i32, String> + Send + 'static,
  {
    self.0.lock().unwrap().push(Box::new(consumer));
  }
}
