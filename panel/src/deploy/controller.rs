//! Owns the single active monitoring session

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::deploy::monitor::{self, MonitorOptions, MonitorSession, MonitorState};
use crate::deploy::trigger::{DeploymentTrigger, TriggerRequest};
use crate::errors::PanelError;
use crate::http::actions::WorkflowApi;
use crate::present::status::StatusPresenter;

/// Boxed sleep future
pub type SleepFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Injected sleep, so tests can run without waiting
pub type SleepFn = Arc<dyn Fn(Duration) -> SleepFuture + Send + Sync>;

/// Sleep on the tokio timer
pub fn tokio_sleep() -> SleepFn {
    Arc::new(|duration: Duration| -> SleepFuture { Box::pin(tokio::time::sleep(duration)) })
}

struct ActiveSession {
    id: Uuid,
    task: JoinHandle<MonitorState>,
}

/// Triggers deployments and tracks at most one monitoring session
pub struct DeploymentController {
    trigger: DeploymentTrigger,
    api: Arc<dyn WorkflowApi>,
    presenter: Arc<dyn StatusPresenter>,
    monitor_options: MonitorOptions,
    start_delay: Duration,
    sleep_fn: SleepFn,
    active: Option<ActiveSession>,
}

impl DeploymentController {
    pub fn new(
        trigger: DeploymentTrigger,
        api: Arc<dyn WorkflowApi>,
        presenter: Arc<dyn StatusPresenter>,
        monitor_options: MonitorOptions,
        start_delay: Duration,
        sleep_fn: SleepFn,
    ) -> Self {
        Self {
            trigger,
            api,
            presenter,
            monitor_options,
            start_delay,
            sleep_fn,
            active: None,
        }
    }

    /// Id of the session being monitored, if it is still running
    pub fn active_session(&self) -> Option<Uuid> {
        self.active
            .as_ref()
            .filter(|s| !s.task.is_finished())
            .map(|s| s.id)
    }

    /// Stop the active session. Its in-flight request, if any, is dropped.
    pub fn cancel_active(&mut self) -> bool {
        match self.active.take() {
            Some(session) if !session.task.is_finished() => {
                session.task.abort();
                info!("Cancelled monitoring session {}", session.id);
                true
            }
            _ => false,
        }
    }

    /// Cancel any previous session, dispatch, and start monitoring after the
    /// start delay. Returns the new session id.
    pub async fn deploy(&mut self, request: &TriggerRequest) -> Result<Uuid, PanelError> {
        self.cancel_active();

        let dispatched = self.trigger.trigger(request, self.presenter.as_ref()).await?;
        let mut session = MonitorSession::new(dispatched.handle);
        let id = session.id();
        let token = dispatched.token;

        let api = self.api.clone();
        let presenter = self.presenter.clone();
        let options = self.monitor_options.clone();
        let start_delay = self.start_delay;
        let sleep_fn = self.sleep_fn.clone();

        let task = tokio::spawn(async move {
            // give the remote side time to register the new run
            (sleep_fn)(start_delay).await;
            monitor::run(
                api.as_ref(),
                &token,
                &mut session,
                &options,
                presenter.as_ref(),
                |d| (sleep_fn)(d),
            )
            .await
        });

        debug!("Started monitoring session {}", id);
        self.active = Some(ActiveSession { id, task });
        Ok(id)
    }

    /// Wait for the active session to finish. The session stays owned by the
    /// controller until it does, so dropping this future leaves it cancellable.
    pub async fn wait(&mut self) -> Option<MonitorState> {
        let result = (&mut self.active.as_mut()?.task).await;
        let session = self.active.take()?;
        match result {
            Ok(state) => Some(state),
            Err(e) => {
                warn!("Monitoring session {} did not finish: {}", session.id, e);
                None
            }
        }
    }
}

impl Drop for DeploymentController {
    fn drop(&mut self) {
        self.cancel_active();
    }
}
