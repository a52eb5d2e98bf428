use thiserror::Error;

/// A collaborator broke the producer/consumer contract.
///
/// This is a bug in the collaborator, not a runtime fault: operators that
/// detect one panic with its message rather than reporting it downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
  #[error("upstream delivered a subscription before any demand was requested")]
  UnsolicitedSubscription,
  #[error("upstream delivered a second subscription to an already subscribed consumer")]
  DuplicateSubscription,
}
