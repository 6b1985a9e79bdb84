use std::time::Duration;

pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// A pending delayed callback. Cancelling after it fired is a no-op.
pub trait TimerHandle: Send {
    fn cancel(&self);
}

pub trait Scheduler: Send + Sync {
    /// Runs `callback` once `delay` has elapsed unless the handle is cancelled first.
    fn after(&self, delay: Duration, callback: TimerCallback) -> Box<dyn TimerHandle>;
}
