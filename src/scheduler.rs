//! Schedulers: where and when a task runs.
//!
//! A [`Scheduler`] executes a task now or later on some execution context. The
//! operators in this crate never own threads; they hand their continuations to
//! whichever scheduler the caller supplies, together with an opaque options
//! bag that is passed through unmodified.
//!
//! | Scheduler | Context |
//! |-----------|---------|
//! | [`ImmediateScheduler`] | the calling thread, inline |
//! | [`ManualScheduler`] | a FIFO queue stepped by hand, for tests |
//! | [`ThreadScheduler`] | one dedicated worker thread, FIFO |
//! | `futures::executor::ThreadPool` | a pool, no ordering (`futures-scheduler`) |
//! | `tokio::runtime::Handle` | a tokio runtime (`tokio-scheduler`) |

mod immediate;
mod manual;
mod thread_scheduler;
#[cfg(feature = "futures-scheduler")]
mod thread_pool_scheduler;
#[cfg(feature = "tokio-scheduler")]
mod tokio_scheduler;

pub use immediate::ImmediateScheduler;
pub use manual::ManualScheduler;
pub use thread_scheduler::ThreadScheduler;
#[cfg(feature = "futures-scheduler")]
pub use thread_pool_scheduler::default_pool;

/// An execution context that can run a task now or later.
///
/// Operators only guarantee delivery order when the scheduler runs the tasks
/// submitted to it in FIFO order.
pub trait Scheduler: Clone + Send + Sync + 'static {
  /// Scheduler-defined configuration for a single task, such as a priority.
  type Options: Clone + Send + Sync + 'static;

  fn schedule<F>(&self, options: Option<&Self::Options>, task: F)
  where
    F: FnOnce() + Send + 'static;
}
