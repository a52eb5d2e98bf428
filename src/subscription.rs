use std::sync::Arc;

use crate::{demand::Demand, rc::MutArc};

/// The demand-and-cancellation handle of a single producer/consumer
/// relationship.
///
/// Both methods take `&self`: the consumer may call them from any thread, and
/// from inside its own callbacks.
pub trait Subscription: Send + Sync {
  /// Allows the producer to emit up to `demand` more values.
  fn request(&self, demand: Demand);

  /// Stops the relationship. Idempotent; values already in flight may be
  /// computed but are never delivered.
  fn cancel(&self);
}

/// The form in which a consumer receives its subscription.
pub type SubscriptionHandle = Arc<dyn Subscription>;

impl<T: Subscription + ?Sized> Subscription for Arc<T> {
  #[inline]
  fn request(&self, demand: Demand) { (**self).request(demand) }

  #[inline]
  fn cancel(&self) { (**self).cancel() }
}

enum CancelState {
  Pending,
  Active(SubscriptionHandle),
  Closed,
}

/// A handle that cancels a subscription whose [`SubscriptionHandle`] may not
/// have been delivered yet.
///
/// Returned by [`ProducerExt::sink`](crate::producer::ProducerExt::sink).
/// Cancelling before the subscription arrives cancels it the moment it does.
#[derive(Clone)]
pub struct Cancellable(MutArc<CancelState>);

impl Default for Cancellable {
  fn default() -> Self { Cancellable(MutArc::own(CancelState::Pending)) }
}

impl Cancellable {
  pub fn cancel(&self) {
    let previous = std::mem::replace(&mut *self.0.rc_deref_mut(), CancelState::Closed);
    if let CancelState::Active(subscription) = previous {
      subscription.cancel();
    }
  }

  /// True once the handle was cancelled or the stream terminated.
  pub fn is_closed(&self) -> bool { matches!(*self.0.rc_deref_mut(), CancelState::Closed) }

  /// Activates "RAII" behavior: the subscription is cancelled as soon as the
  /// returned guard goes out of scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `cancel()` is called immediately, which is probably not what you want!
  pub fn cancel_when_dropped(self) -> CancelGuard { CancelGuard(Some(self)) }

  /// Records the subscription. Returns `false` when the handle is already
  /// closed, in which case the caller must cancel `subscription` itself.
  pub(crate) fn attach(&self, subscription: SubscriptionHandle) -> bool {
    let mut state = self.0.rc_deref_mut();
    match *state {
      CancelState::Pending => {
        *state = CancelState::Active(subscription);
        true
      }
      CancelState::Active(_) | CancelState::Closed => false,
    }
  }

  /// Marks the stream as terminated and releases the subscription.
  pub(crate) fn close(&self) { *self.0.rc_deref_mut() = CancelState::Closed; }
}

/// An RAII implementation of a "scoped subscription". When this structure is
/// dropped (falls out of scope), the subscription will be cancelled.
///
/// If you want to drop it immediately, wrap it in its own scope.
#[must_use]
pub struct CancelGuard(Option<Cancellable>);

impl CancelGuard {
  /// Gives the handle back without cancelling it.
  pub fn into_inner(mut self) -> Cancellable {
    self.0.take().unwrap_or_default()
  }
}

impl Drop for CancelGuard {
  fn drop(&mut self) {
    if let Some(cancellable) = self.0.take() {
      cancellable.cancel();
    }
  }
}
