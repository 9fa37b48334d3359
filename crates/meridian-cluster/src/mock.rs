//! Mock cluster for testing and local development.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ClusterError, ClusterResult};
use crate::handle::{LifecycleCallback, RemoteHandle};
use crate::submit::{ClusterClient, SubmissionRequest};

#[derive(Default)]
struct HandleState {
    running_fired: bool,
    terminated_fired: bool,
    on_running: Vec<LifecycleCallback>,
    on_terminated: Vec<LifecycleCallback>,
}

/// Handle produced by [`MockCluster`].
///
/// Tests drive lifecycle transitions explicitly through
/// [`MockHandle::signal_running`] and [`MockHandle::signal_terminated`].
/// Each event fires at most once; later signals are ignored.
#[derive(Clone)]
pub struct MockHandle {
    app_id: String,
    state: Arc<Mutex<HandleState>>,
}

impl MockHandle {
    fn new(app_id: String) -> Self {
        Self {
            app_id,
            state: Arc::new(Mutex::new(HandleState::default())),
        }
    }

    /// Fire the "entered running" event, invoking pending callbacks on the
    /// calling thread.
    pub fn signal_running(&self) {
        let callbacks = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if state.running_fired {
                return;
            }
            state.running_fired = true;
            std::mem::take(&mut state.on_running)
        };

        debug!(app_id = %self.app_id, "mock application entered running state");
        for callback in callbacks {
            callback();
        }
    }

    /// Fire the "entered terminal state" event, invoking pending callbacks
    /// on the calling thread.
    pub fn signal_terminated(&self) {
        let callbacks = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if state.terminated_fired {
                return;
            }
            state.terminated_fired = true;
            std::mem::take(&mut state.on_terminated)
        };

        debug!(app_id = %self.app_id, "mock application entered terminal state");
        for callback in callbacks {
            callback();
        }
    }
}

impl RemoteHandle for MockHandle {
    fn app_id(&self) -> &str {
        &self.app_id
    }

    fn on_running(&self, callback: LifecycleCallback) {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if !state.running_fired {
                state.on_running.push(callback);
                return;
            }
        }
        // Event already happened; invoke on the registering thread.
        callback();
    }

    fn on_terminated(&self, callback: LifecycleCallback) {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if !state.terminated_fired {
                state.on_terminated.push(callback);
                return;
            }
        }
        callback();
    }

    fn terminate(&self) {
        self.signal_terminated();
    }
}

impl std::fmt::Debug for MockHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHandle")
            .field("app_id", &self.app_id)
            .finish_non_exhaustive()
    }
}

/// In-process cluster backend for testing.
///
/// Records every submission and hands out [`MockHandle`]s whose lifecycle
/// the test controls.
#[derive(Debug, Default)]
pub struct MockCluster {
    submissions: Mutex<Vec<SubmissionRequest>>,
    handles: Mutex<Vec<MockHandle>>,
    rejection: Mutex<Option<String>>,
}

impl MockCluster {
    /// Create an empty mock cluster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent submission fail with a rejection.
    pub fn reject_submissions(&self, reason: impl Into<String>) {
        let mut rejection = self.rejection.lock().unwrap_or_else(|e| e.into_inner());
        *rejection = Some(reason.into());
    }

    /// Requests accepted so far, in submission order.
    #[must_use]
    pub fn submissions(&self) -> Vec<SubmissionRequest> {
        self.submissions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of accepted submissions.
    #[must_use]
    pub fn submission_count(&self) -> usize {
        self.submissions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Handle for the `index`-th accepted submission.
    #[must_use]
    pub fn handle(&self, index: usize) -> Option<MockHandle> {
        self.handles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(index)
            .cloned()
    }
}

#[async_trait]
impl ClusterClient for MockCluster {
    async fn submit(&self, request: SubmissionRequest) -> ClusterResult<Box<dyn RemoteHandle>> {
        if let Some(reason) = self
            .rejection
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            return Err(ClusterError::Rejected(reason));
        }

        let handle = {
            let mut submissions = self.submissions.lock().unwrap_or_else(|e| e.into_inner());
            let app_id = format!("mock-app-{:04}", submissions.len());
            submissions.push(request);
            MockHandle::new(app_id)
        };

        self.handles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(handle.clone());

        Ok(Box::new(handle))
    }
}
