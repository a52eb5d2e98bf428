use std::collections::VecDeque;

use super::Scheduler;
use crate::rc::MutArc;

struct ScheduledTask<O> {
  options: Option<O>,
  task: Box<dyn FnOnce() + Send>,
}

/// A scheduler whose queue only runs when told to.
///
/// Tasks run in the order they were scheduled. Clones share one queue, so a
/// test can keep a clone, hand another to an operator, and step through
/// deliveries one at a time. The options each task was scheduled with are
/// recorded and can be inspected with [`ManualScheduler::pending_options`].
pub struct ManualScheduler<O = ()> {
  queue: MutArc<VecDeque<ScheduledTask<O>>>,
}

impl<O> Clone for ManualScheduler<O> {
  fn clone(&self) -> Self { ManualScheduler { queue: self.queue.clone() } }
}

impl<O> Default for ManualScheduler<O> {
  fn default() -> Self { ManualScheduler { queue: MutArc::own(VecDeque::new()) } }
}

impl<O> ManualScheduler<O> {
  pub fn new() -> Self { Self::default() }

  pub fn pending_count(&self) -> usize { self.queue.rc_deref_mut().len() }

  /// The options of every queued task, oldest first.
  pub fn pending_options(&self) -> Vec<Option<O>>
  where
    O: Clone,
  {
    self.queue.rc_deref_mut().iter().map(|t| t.options.clone()).collect()
  }

  /// Runs the oldest queued task. Returns `false` if the queue was empty.
  pub fn run_next(&self) -> bool {
    // Pop before running: the task may schedule more work on this queue.
    let next = self.queue.rc_deref_mut().pop_front();
    match next {
      Some(scheduled) => {
        (scheduled.task)();
        true
      }
      None => false,
    }
  }

  /// Runs tasks until the queue is empty, including tasks scheduled by the
  /// tasks themselves. Returns how many ran.
  pub fn run_all(&self) -> usize {
    let mut ran = 0;
    while self.run_next() {
      ran += 1;
    }
    ran
  }
}

impl<O> Scheduler for ManualScheduler<O>
where
  O: Clone + Send + Sync + 'static,
{
  type Options = O;

  fn schedule<F>(&self, options: Option<&O>, task: F)
  where
    F: FnOnce() + Send + 'static,
  {
    self.queue.rc_deref_mut().push_back(ScheduledTask {
      options: options.cloned(),
      task: Box::new(task),
    });
  }
}
