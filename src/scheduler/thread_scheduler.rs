use std::{
  io,
  sync::mpsc::{channel, Sender},
  thread,
};

use super::Scheduler;
use crate::rc::MutArc;

type Job = Box<dyn FnOnce() + Send>;

/// Runs tasks one after another on a dedicated worker thread, in the order
/// they were scheduled.
///
/// The worker exits once every clone of the scheduler is dropped and the
/// queue is drained.
#[derive(Clone)]
pub struct ThreadScheduler {
  sender: MutArc<Sender<Job>>,
}

impl ThreadScheduler {
  pub fn new() -> io::Result<Self> { Self::with_name("rxdemand-worker") }

  pub fn with_name(name: impl Into<String>) -> io::Result<Self> {
    let (sender, receiver) = channel::<Job>();
    thread::Builder::new().name(name.into()).spawn(move || {
      for job in receiver {
        job();
      }
    })?;
    Ok(ThreadScheduler { sender: MutArc::own(sender) })
  }
}

impl Scheduler for ThreadScheduler {
  type Options = ();

  fn schedule<F>(&self, _options: Option<&()>, task: F)
  where
    F: FnOnce() + Send + 'static,
  {
    if self.sender.rc_deref_mut().send(Box::new(task)).is_err() {
      log::warn!("worker thread is gone, dropping scheduled task");
    }
  }
}
