use std::io;

use futures::executor::ThreadPool;
use once_cell::sync::OnceCell;

use super::Scheduler;

static DEFAULT_POOL: OnceCell<ThreadPool> = OnceCell::new();

/// The process-wide thread pool, created on first use.
pub fn default_pool() -> io::Result<ThreadPool> {
  DEFAULT_POOL.get_or_try_init(ThreadPool::new).cloned()
}

/// A pool gives no ordering guarantee between tasks, so values delivered
/// through it may arrive out of order.
impl Scheduler for ThreadPool {
  type Options = ();

  fn schedule<F>(&self, _options: Option<&()>, task: F)
  where
    F: FnOnce() + Send + 'static,
  {
    self.spawn_ok(async move { task() });
  }
}
