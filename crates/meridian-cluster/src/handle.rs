//! Live handle to a submitted remote execution.

/// Callback invoked when a lifecycle event fires.
///
/// Callbacks run on backend-managed threads, independently of the thread
/// that registered them. They must not assume any particular executor.
pub type LifecycleCallback = Box<dyn FnOnce() + Send + 'static>;

/// A live reference to a submitted, running-or-soon-to-run remote
/// execution.
///
/// The handle exposes two categorically distinct one-shot lifecycle
/// notifications: the application entered the running state, and the
/// application entered a terminal state. Either, both, or neither may fire
/// before the caller abandons interest, and the two fire independently on
/// separate asynchronous channels. A callback registered after its event
/// has already occurred is invoked immediately on the registering thread.
pub trait RemoteHandle: Send + Sync {
    /// Identifier assigned to the application by the cluster.
    fn app_id(&self) -> &str;

    /// Register a one-shot callback for the "entered running" event.
    fn on_running(&self, callback: LifecycleCallback);

    /// Register a one-shot callback for the "entered terminal state" event.
    fn on_terminated(&self, callback: LifecycleCallback);

    /// Request termination of the remote execution.
    ///
    /// Best effort and non-blocking; the terminal-state notification
    /// reports the outcome.
    fn terminate(&self);
}
