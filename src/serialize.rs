//! Serialized, re-entrant safe delivery of signals to a single consumer.
//!
//! Every producer in this crate talks to its downstream through a
//! [`SerializedConsumer`]. Signals are queued under a short lock and delivered
//! by whichever caller finds the consumer idle; that caller keeps draining the
//! queue until it is empty. A signal emitted from inside a consumer callback
//! is therefore queued instead of overlapping the running callback, and no
//! lock is held while user code runs.
//!
//! [`SerializedConsumer::emit`] also hands signals from other threads to the
//! active drainer. [`SerializedConsumer::emit_here`] instead waits for a
//! drainer on another thread to finish and delivers on the calling thread.

use std::{
  collections::VecDeque,
  sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
  thread::{self, ThreadId},
};

use crate::{
  consumer::{BoxedConsumer, Consumer},
  subscription::SubscriptionHandle,
};

pub(crate) enum Signal<Item, Err> {
  Subscribe(SubscriptionHandle),
  Next(Item),
  Complete,
  Error(Err),
}

impl<Item, Err> Signal<Item, Err> {
  #[inline]
  fn is_terminal(&self) -> bool { matches!(self, Signal::Complete | Signal::Error(_)) }

  fn deliver(self, consumer: &mut dyn Consumer<Item, Err>) {
    match self {
      Signal::Subscribe(subscription) => consumer.on_subscribe(subscription),
      // Demand granted by the consumer is not tracked by the producers here.
      Signal::Next(value) => {
        let _ = consumer.on_next(value);
      }
      Signal::Complete => consumer.on_complete(),
      Signal::Error(err) => consumer.on_error(err),
    }
  }
}

struct Delivery<Item, Err> {
  /// `None` while a drainer holds the consumer, and forever once closed.
  consumer: Option<BoxedConsumer<Item, Err>>,
  pending: VecDeque<Signal<Item, Err>>,
  /// The thread currently delivering, if any.
  drainer: Option<ThreadId>,
  /// A terminal signal was queued or the consumer was cancelled; nothing more
  /// is accepted.
  sealed: bool,
  cancelled: bool,
}

struct Shared<Item, Err> {
  delivery: Mutex<Delivery<Item, Err>>,
  /// Notified whenever a drainer gives the consumer back.
  released: Condvar,
}

pub(crate) struct SerializedConsumer<Item, Err>(Arc<Shared<Item, Err>>);

impl<Item, Err> Clone for SerializedConsumer<Item, Err> {
  #[inline]
  fn clone(&self) -> Self { SerializedConsumer(self.0.clone()) }
}

impl<Item, Err> SerializedConsumer<Item, Err> {
  pub(crate) fn new<C>(consumer: C) -> Self
  where
    C: Consumer<Item, Err> + Send + 'static,
  {
    SerializedConsumer(Arc::new(Shared {
      delivery: Mutex::new(Delivery {
        consumer: Some(Box::new(consumer)),
        pending: VecDeque::new(),
        drainer: None,
        sealed: false,
        cancelled: false,
      }),
      released: Condvar::new(),
    }))
  }

  /// Queues `signals` as one unit and delivers them unless another caller is
  /// already draining. Anything after a terminal signal is discarded.
  pub(crate) fn emit(&self, signals: impl IntoIterator<Item = Signal<Item, Err>>) {
    let delivery = self.lock();
    self.drain(delivery, signals);
  }

  /// Like [`emit`](SerializedConsumer::emit), but the signals are delivered
  /// on the calling thread: while another thread is draining, this blocks
  /// until it is done. Signals emitted from a callback running on this
  /// thread are queued as usual.
  pub(crate) fn emit_here(&self, signals: impl IntoIterator<Item = Signal<Item, Err>>) {
    let current = thread::current().id();
    let mut delivery = self.lock();
    while !delivery.sealed && delivery.drainer.map_or(false, |id| id != current) {
      delivery = self
        .0
        .released
        .wait(delivery)
        .unwrap_or_else(PoisonError::into_inner);
    }
    self.drain(delivery, signals);
  }

  /// Cancels delivery: queued signals are dropped and the consumer is
  /// released. A callback that is already running finishes normally.
  pub(crate) fn close(&self) {
    let consumer = {
      let mut delivery = self.lock();
      delivery.sealed = true;
      delivery.cancelled = true;
      delivery.pending.clear();
      delivery.consumer.take()
    };
    self.0.released.notify_all();
    drop(consumer);
  }

  pub(crate) fn is_closed(&self) -> bool { self.lock().sealed }

  /// Every transition below is a single assignment, so poisoning is ignored.
  fn lock(&self) -> MutexGuard<'_, Delivery<Item, Err>> {
    self.0.delivery.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn drain(
    &self,
    mut delivery: MutexGuard<'_, Delivery<Item, Err>>,
    signals: impl IntoIterator<Item = Signal<Item, Err>>,
  ) {
    if delivery.sealed {
      log::trace!("discarding signal emitted after the consumer was closed");
      return;
    }
    for signal in signals {
      if delivery.sealed {
        break;
      }
      delivery.sealed = signal.is_terminal();
      delivery.pending.push_back(signal);
    }
    if delivery.drainer.is_some() {
      return;
    }
    let mut consumer = match delivery.consumer.take() {
      Some(consumer) => {
        delivery.drainer = Some(thread::current().id());
        consumer
      }
      None => {
        delivery.pending.clear();
        return;
      }
    };
    drop(delivery);

    loop {
      let signal = {
        let mut delivery = self.lock();
        if delivery.cancelled {
          delivery.pending.clear();
          self.release(&mut delivery, None);
          break;
        }
        match delivery.pending.pop_front() {
          Some(signal) => signal,
          None => {
            self.release(&mut delivery, Some(consumer));
            return;
          }
        }
      };
      let terminal = signal.is_terminal();
      signal.deliver(&mut *consumer);
      if terminal {
        let mut delivery = self.lock();
        delivery.pending.clear();
        self.release(&mut delivery, None);
        break;
      }
    }
    // The consumer has seen its last signal; release it outside the lock.
    drop(consumer);
  }

  fn release(&self, delivery: &mut Delivery<Item, Err>, consumer: Option<BoxedConsumer<Item, Err>>) {
    delivery.drainer = None;
    delivery.consumer = consumer;
    self.0.released.notify_all();
  }
}
