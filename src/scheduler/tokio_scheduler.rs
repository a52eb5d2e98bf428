use tokio::runtime::Handle;

use super::Scheduler;

impl Scheduler for Handle {
  type Options = ();

  fn schedule<F>(&self, _options: Option<&()>, task: F)
  where
    F: FnOnce() + Send + 'static,
  {
    // Detached: the task's result is delivered through the operator itself.
    drop(self.spawn(async move { task() }));
  }
}
