use std::time::Duration;
use stubdns_application::ports::{Scheduler, TimerCallback, TimerHandle};
use tokio::task::AbortHandle;

/// Runs delayed callbacks as tasks on the current tokio runtime.
///
/// Must be used from within a runtime; the resolver driver always is.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl TokioScheduler {
    pub fn new() -> Self {
        Self
    }
}

struct TokioTimer {
    task: AbortHandle,
}

impl TimerHandle for TokioTimer {
    fn cancel(&self) {
        self.task.abort();
    }
}

impl Scheduler for TokioScheduler {
    fn after(&self, delay: Duration, callback: TimerCallback) -> Box<dyn TimerHandle> {
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        });
        Box::new(TokioTimer {
            task: task.abort_handle(),
        })
    }
}
