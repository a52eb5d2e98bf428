use super::Scheduler;

/// Runs every task inline, on the thread that schedules it.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
  type Options = ();

  #[inline]
  fn schedule<F>(&self, _options: Option<&()>, task: F)
  where
    F: FnOnce() + Send + 'static,
  {
    task()
  }
}

#[cfg(test)]
mod test {
  use std::sync::{Arc, Mutex};

  use super::*;

  #[test]
  fn runs_inline() {
    let ran = Arc::new(Mutex::new(vec![]));
    let c_ran = ran.clone();
    ImmediateScheduler.schedule(None, move || c_ran.lock().unwrap().push(std::thread::current().id()));
    assert_eq!(*ran.lock().unwrap(), vec![std::thread::current().id()]);
  }
}
