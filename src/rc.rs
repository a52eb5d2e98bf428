//! Shared, lock-guarded state used by every subscription in this crate.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared ownership of a value behind a non-reentrant mutex.
///
/// Holders must never call out to a consumer, a producer or a scheduler while
/// the guard returned by [`MutArc::rc_deref_mut`] is alive.
#[derive(Default)]
pub struct MutArc<T>(Arc<Mutex<T>>);

impl<T> MutArc<T> {
  pub fn own(t: T) -> Self { Self(Arc::new(Mutex::new(t))) }

  /// Locks the value.
  ///
  /// State guarded by a `MutArc` only ever changes through single
  /// assignments, so a panic in another holder cannot leave it half written
  /// and poisoning is ignored.
  #[inline]
  pub fn rc_deref_mut(&self) -> MutexGuard<'_, T> {
    self.0.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl<T> Clone for MutArc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}
