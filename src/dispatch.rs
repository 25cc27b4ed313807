use futures::future::BoxFuture;

/// A regeneration job, ready to run on whatever substrate executes it.
pub type Job = BoxFuture<'static, ()>;

/// One-way submission boundary to the async task-execution substrate.
///
/// `dispatch` hands a regeneration job off for out-of-band execution and
/// returns immediately; there is no completion channel back to the submitter,
/// and the engine never assumes any completion order with the dispatched job.
/// Delivery is at-least-attempted: if the substrate drops the job, the key
/// simply stays stale until the lock times out and a later reader re-triggers
/// regeneration.
pub trait Dispatcher: Send + Sync {
    /// A name for diagnostics/tracing.
    fn name(&self) -> &'static str;

    /// Submit a job for out-of-band execution, fire-and-forget.
    fn dispatch(&self, job: Job);
}

/// Dispatcher that runs jobs on the ambient tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDispatcher;

impl Dispatcher for TokioDispatcher {
    fn name(&self) -> &'static str {
        "tokio"
    }

    fn dispatch(&self, job: Job) {
        tokio::spawn(job);
    }
}

/// Dispatcher that drops every job on the floor.
///
/// Models a substrate that loses work: the stale value keeps being served
/// and the lock self-heals at its timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDispatcher;

impl Dispatcher for NullDispatcher {
    fn name(&self) -> &'static str {
        "null"
    }

    fn dispatch(&self, job: Job) {
        drop(job);
    }
}
