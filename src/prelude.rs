//! Prelude module for convenient imports

pub use crate::{
  consumer::{Completion, Consumer, Sink},
  demand::Demand,
  error::ProtocolViolation,
  ops::ReceiveValuesOn,
  producer::{DeferredFuture, Producer, ProducerExt, Promise},
  scheduler::{ImmediateScheduler, ManualScheduler, Scheduler, ThreadScheduler},
  subscription::{CancelGuard, Cancellable, Subscription, SubscriptionHandle},
};
#[cfg(feature = "futures-scheduler")]
pub use crate::scheduler::default_pool;
