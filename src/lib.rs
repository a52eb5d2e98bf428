//! # rxdemand: demand-driven reactive stream primitives
//!
//! A small core built on the Producer/Consumer/Subscription contract: a
//! consumer requests a bounded or unbounded number of values and a producer
//! never emits more than the outstanding demand.
//!
//! ```rust
//! use rxdemand::prelude::*;
//!
//! let scheduler = ManualScheduler::<()>::new();
//! let seen = std::sync::Arc::new(std::sync::Mutex::new(vec![]));
//! let c_seen = seen.clone();
//!
//! DeferredFuture::<_, ()>::new(|promise| promise.succeed("hello"))
//!   .receive_values_on(scheduler.clone())
//!   .sink(move |v| c_seen.lock().unwrap().push(v), |_| {});
//!
//! // The work already ran, but the value waits for the scheduler.
//! assert!(seen.lock().unwrap().is_empty());
//! scheduler.run_all();
//! assert_eq!(*seen.lock().unwrap(), vec!["hello"]);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Producer`] | A blueprint; every subscription starts an independent run |
//! | [`Consumer`] | Receives a subscription, values, then one terminal signal |
//! | [`Subscription`] | Requests demand and cancels |
//! | [`DeferredFuture`] | Lazily computes one value once demand arrives |
//! | [`ReceiveValuesOn`] | Moves values and completion, not the handshake, to a scheduler |
//! | [`Scheduler`] | Where rescheduled signals run |
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): `futures::executor::ThreadPool` as a
//!   scheduler, and a lazily created default pool
//! - **`tokio-scheduler`**: `tokio::runtime::Handle` as a scheduler
//!
//! [`Producer`]: producer::Producer
//! [`Consumer`]: consumer::Consumer
//! [`Subscription`]: subscription::Subscription
//! [`DeferredFuture`]: producer::DeferredFuture
//! [`ReceiveValuesOn`]: ops::ReceiveValuesOn
//! [`Scheduler`]: scheduler::Scheduler

pub mod consumer;
pub mod demand;
pub mod error;
pub mod ops;
pub mod prelude;
pub mod producer;
pub mod rc;
pub mod scheduler;
mod serialize;
pub mod subscription;
#[cfg(test)]
mod testing;

pub use prelude::*;
