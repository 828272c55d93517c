use std::future::Future;
use std::pin::Pin;

/// A delivery (or other pending operation) handed off for background
/// completion.
pub type BackgroundTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Deferred-execution capability: accepts a pending operation and
/// guarantees it runs to completion independent of the caller's own
/// lifetime.
///
/// Edge runtimes that tear down an execution scope as soon as the
/// response is produced expose such a keep-alive primitive; wrap it in
/// this trait and pass it either as the configuration default or per
/// call. Without one, log calls await delivery before returning, which
/// is the safe mode for long-lived processes.
pub trait DeferredExecutor: Send + Sync {
    /// Schedule-and-forget: must not block, and must keep `task`
    /// running after the invoking call has returned.
    fn schedule_background(&self, task: BackgroundTask);
}

/// [`DeferredExecutor`] backed by `tokio::spawn`.
///
/// Suitable for long-lived processes that want fire-and-forget
/// delivery. Note that a plain Tokio runtime makes no completion
/// guarantee at shutdown; edge hosts should wrap their own keep-alive
/// primitive instead.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSpawner;

impl DeferredExecutor for TokioSpawner {
    fn schedule_background(&self, task: BackgroundTask) {
        tokio::spawn(task);
    }
}
