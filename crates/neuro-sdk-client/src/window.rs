//! Action windows: a temporary group of actions that is registered, forced
//! once, and withdrawn again when the moment has passed.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::Instrument;

use neuro_sdk_core::error::{NeuroError, Result};
use neuro_sdk_core::protocol::ForceOptions;

use crate::dispatch::SharedHandler;
use crate::engine::Client;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// Collecting actions and force parameters.
    Building,
    Registered,
    Ended,
}

/// Built with [`Client::new_action_window`].
///
/// Transitions are `Building -> Registered -> Ended`; nothing goes back to
/// `Building` except a registration that failed on the wire.
pub struct ActionWindow {
    client: Client,
    handlers: Vec<SharedHandler>,
    query: String,
    options: ForceOptions,
    state: WindowState,
    force_task: Option<JoinHandle<()>>,
}

impl ActionWindow {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            handlers: Vec::new(),
            query: String::new(),
            options: ForceOptions::new(),
            state: WindowState::Building,
            force_task: None,
        }
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    /// Names of the window's actions, in insertion order.
    pub fn action_names(&self) -> Vec<String> {
        self.handlers.iter().map(|h| h.name().to_string()).collect()
    }

    /// Ignored with a warning once the window has left `Building`.
    pub fn add_action(&mut self, handler: impl Into<SharedHandler>) -> &mut Self {
        if self.state != WindowState::Building {
            tracing::warn!(state = ?self.state, "cannot add action to registered window");
            return self;
        }
        self.handlers.push(handler.into());
        self
    }

    /// Ignored with a warning once the window has left `Building`.
    pub fn set_force(&mut self, query: impl Into<String>, options: ForceOptions) -> &mut Self {
        if self.state != WindowState::Building {
            tracing::warn!(state = ?self.state, "cannot modify registered window");
            return self;
        }
        self.query = query.into();
        self.options = options;
        self
    }

    /// Register every action in one batch, then force them after the
    /// configured grace period. A failed force is only logged.
    ///
    /// The grace period does not order anything on the peer's side: it may
    /// still invoke an action before the force arrives, or see the force
    /// before it has processed the registration.
    pub async fn register(&mut self) -> Result<()> {
        if self.state != WindowState::Building {
            return Err(NeuroError::State("window already registered".into()));
        }
        if self.handlers.is_empty() {
            return Err(NeuroError::Validation("no actions in window".into()));
        }

        self.state = WindowState::Registered;
        if let Err(e) = self.client.register_actions(&self.handlers).await {
            self.state = WindowState::Building;
            return Err(e);
        }

        let client = self.client.clone();
        let query = self.query.clone();
        let names = self.action_names();
        let options = self.options.clone();
        let grace = Duration::from_millis(client.config().force_grace_ms);
        let span = client.span().clone();

        let task = async move {
            tokio::time::sleep(grace).await;
            if client.is_closed() {
                tracing::debug!("client closed before window force");
                return;
            }
            if let Err(e) = client.force_actions(query, names, options).await {
                tracing::warn!(error = %e, "failed to force actions");
            }
        };
        self.force_task = Some(tokio::spawn(task.instrument(span)));
        Ok(())
    }

    /// Withdraw the window's actions. A no-op unless the window is
    /// registered; a force still waiting out its grace period is cancelled.
    pub async fn end(&mut self) -> Result<()> {
        if self.state != WindowState::Registered {
            return Ok(());
        }
        self.state = WindowState::Ended;

        if let Some(task) = self.force_task.take() {
            task.abort();
        }
        self.client.unregister_actions(self.action_names()).await
    }
}
