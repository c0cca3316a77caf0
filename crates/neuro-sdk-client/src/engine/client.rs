use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use serde::Serialize;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{Instrument, Span};

use neuro_sdk_core::error::{NeuroError, Result};
use neuro_sdk_core::protocol::{
    command, ActionResultData, ContextData, Envelope, ForceOptions, ForceRequest, RegisterData,
    UnregisterData,
};

use crate::config::ClientConfig;
use crate::dispatch::{ActionRegistry, SharedHandler};
use crate::engine::errors::{ErrorSink, ErrorStream};
use crate::engine::read_loop;
use crate::obs::ClientMetrics;
use crate::transport::{codec, ws};
use crate::window::ActionWindow;

/// Connection engine for one peer.
///
/// Cloning is cheap and yields another handle to the same engine; action
/// windows and long-lived handlers keep such a handle.
#[derive(Clone)]
pub struct Client {
    pub(super) inner: Arc<ClientInner>,
}

pub(super) struct ClientInner {
    pub(super) cfg: ClientConfig,
    pub(super) span: Span,
    pub(super) registry: ActionRegistry,
    pub(super) metrics: Arc<ClientMetrics>,
    pub(super) connected: AtomicBool,
    closed: AtomicBool,
    /// Write half and lifecycle state. Every send goes through this lock.
    link: Mutex<Link>,
    shutdown: watch::Sender<bool>,
    errors_rx: StdMutex<Option<mpsc::Receiver<NeuroError>>>,
}

enum Link {
    /// Not connected yet; holds the error-stream sender for the read task.
    Idle(mpsc::Sender<NeuroError>),
    Open(ws::WsSink),
    Closed,
}

impl Client {
    /// Build an unconnected engine. Diagnostics are recorded in a
    /// `neuro{game=..}` span.
    pub fn new(cfg: ClientConfig) -> Result<Self> {
        let span = tracing::info_span!("neuro", game = %cfg.game);
        Self::with_span(cfg, span)
    }

    /// Build an unconnected engine whose background work is recorded in the
    /// caller's span.
    pub fn with_span(cfg: ClientConfig, span: Span) -> Result<Self> {
        cfg.validate()?;

        let (errors_tx, errors_rx) = mpsc::channel(cfg.error_buffer);
        let (shutdown, _) = watch::channel(false);

        Ok(Self {
            inner: Arc::new(ClientInner {
                cfg,
                span,
                registry: ActionRegistry::new(),
                metrics: Arc::new(ClientMetrics::new()),
                connected: AtomicBool::new(false),
                closed: AtomicBool::new(false),
                link: Mutex::new(Link::Idle(errors_tx)),
                shutdown,
                errors_rx: StdMutex::new(Some(errors_rx)),
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.cfg
    }

    pub fn game(&self) -> &str {
        &self.inner.cfg.game
    }

    pub fn metrics(&self) -> &ClientMetrics {
        &self.inner.metrics
    }

    /// Span background tasks are recorded in.
    pub(crate) fn span(&self) -> &Span {
        &self.inner.span
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.inner.registry
    }

    /// Registered action names, sorted.
    pub async fn registered_actions(&self) -> Vec<String> {
        self.inner.registry.names().await
    }

    /// True while the read task is running on an open connection.
    ///
    /// Cleared when the peer goes away; sends after that fail with a write
    /// error until `close` is called.
    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Take the asynchronous error stream. Only one receiver exists.
    pub fn errors(&self) -> Result<ErrorStream> {
        self.inner
            .errors_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .map(ErrorStream::new)
            .ok_or_else(|| NeuroError::State("error stream already taken".into()))
    }

    pub fn new_action_window(&self) -> ActionWindow {
        ActionWindow::new(self.clone())
    }

    // --------------------
    // Lifecycle
    // --------------------

    /// Dial the peer, start the read task and announce `startup`.
    ///
    /// A client connects at most once. After the peer drops the connection
    /// this fails with a state error; reconnecting means building a new
    /// client.
    pub async fn connect(&self) -> Result<()> {
        {
            let mut link = self.inner.link.lock().await;
            let errors = match &*link {
                Link::Idle(tx) => tx.clone(),
                Link::Open(_) if self.is_connected() => {
                    return Err(NeuroError::State("already connected".into()))
                }
                Link::Open(_) => {
                    return Err(NeuroError::State("connection lost; create a new client".into()))
                }
                Link::Closed => return Err(NeuroError::State("client is closed".into())),
            };

            let (sink, source) = ws::dial(&self.inner.cfg.websocket_url).await?;
            // Dropping the Idle sender leaves the read task as the only one.
            *link = Link::Open(sink);
            self.inner.connected.store(true, Ordering::SeqCst);

            let span = self.inner.span.clone();
            span.in_scope(|| tracing::info!(url = %self.inner.cfg.websocket_url, "connected"));

            tokio::spawn(
                read_loop::run(
                    Arc::downgrade(&self.inner),
                    source,
                    self.inner.shutdown.subscribe(),
                    ErrorSink::new(errors, Arc::clone(&self.inner.metrics)),
                )
                .instrument(span),
            );
        }

        if let Err(e) = self.startup().await {
            self.inner
                .span
                .in_scope(|| tracing::warn!(error = %e, "failed to send startup message"));
        }
        Ok(())
    }

    /// Stop the read task and release the transport. Idempotent.
    pub async fn close(&self) -> Result<()> {
        let mut link = self.inner.link.lock().await;
        if matches!(*link, Link::Closed) {
            return Ok(());
        }

        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.connected.store(false, Ordering::SeqCst);
        self.inner.shutdown.send_replace(true);

        if let Link::Open(mut sink) = std::mem::replace(&mut *link, Link::Closed) {
            ws::shutdown(&mut sink).await?;
            self.inner
                .span
                .in_scope(|| tracing::info!("connection closed"));
        }
        Ok(())
    }

    // --------------------
    // Messaging
    // --------------------

    /// Stamp the game id and write one envelope under the send lock.
    async fn send(&self, mut env: Envelope) -> Result<()> {
        env.game = self.inner.cfg.game.clone();
        let msg = codec::encode(&env)?;

        {
            let mut link = self.inner.link.lock().await;
            match &mut *link {
                Link::Open(sink) => ws::write(sink, msg).await?,
                Link::Idle(_) => return Err(NeuroError::State("not connected".into())),
                Link::Closed => return Err(NeuroError::State("client is closed".into())),
            }
        }

        self.inner.metrics.sent.inc(&env.command);
        self.inner
            .span
            .in_scope(|| tracing::debug!(command = %env.command, "sent"));
        Ok(())
    }

    async fn send_data<T: Serialize>(&self, command: &str, data: &T) -> Result<()> {
        self.send(Envelope::with_data(command, data)?).await
    }

    /// Announce the integration. Sent automatically by `connect`.
    pub async fn startup(&self) -> Result<()> {
        self.send(Envelope::new(command::STARTUP)).await
    }

    /// Inform the peer about game state. `silent` keeps it out of the peer's
    /// user-facing output while still updating its working memory.
    pub async fn send_context(&self, message: impl Into<String>, silent: bool) -> Result<()> {
        let data = ContextData {
            message: message.into(),
            silent,
        };
        self.send_data(command::CONTEXT, &data).await
    }

    /// Graceful-shutdown handshake.
    pub async fn send_shutdown_ready(&self) -> Result<()> {
        self.send(Envelope::new(command::SHUTDOWN_READY)).await
    }

    // --------------------
    // Actions
    // --------------------

    /// Insert handlers (replacing same-named ones) and advertise them in one
    /// `actions/register` batch. An empty batch is a no-op.
    pub async fn register_actions(&self, handlers: &[SharedHandler]) -> Result<()> {
        if handlers.is_empty() {
            return Ok(());
        }

        let mut registry = self.inner.registry.write().await;
        let actions = registry.insert_all(handlers)?;
        self.send_data(command::ACTIONS_REGISTER, &RegisterData { actions }).await
    }

    pub async fn register_action(&self, handler: impl Into<SharedHandler>) -> Result<()> {
        self.register_actions(&[handler.into()]).await
    }

    /// Remove names from the registry and withdraw them from the peer. The
    /// full list is sent even when some names were not registered.
    pub async fn unregister_actions<I, S>(&self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let action_names: Vec<String> = names.into_iter().map(Into::into).collect();
        if action_names.is_empty() {
            return Ok(());
        }

        let mut registry = self.inner.registry.write().await;
        let removed = registry.remove_all(&action_names);
        if removed < action_names.len() {
            self.inner.span.in_scope(|| {
                tracing::debug!(
                    requested = action_names.len(),
                    removed,
                    "unregistering names that were not registered"
                )
            });
        }
        self.send_data(command::ACTIONS_UNREGISTER, &UnregisterData { action_names }).await
    }

    pub async fn unregister_action(&self, name: impl Into<String>) -> Result<()> {
        self.unregister_actions([name.into()]).await
    }

    /// Ask the peer to pick one of `action_names` now.
    ///
    /// Does not register anything: the names must already be registered or
    /// the peer rejects the resulting invocation.
    pub async fn force_actions<I, S>(
        &self,
        query: impl Into<String>,
        action_names: I,
        options: ForceOptions,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let action_names: Vec<String> = action_names.into_iter().map(Into::into).collect();
        if action_names.is_empty() {
            return Err(NeuroError::Validation(
                "must specify at least one action name".into(),
            ));
        }

        let request = ForceRequest::new(query, action_names, options);
        self.send_data(command::ACTIONS_FORCE, &request).await
    }

    /// Report a validation outcome. Must be sent at most once per invocation
    /// id; the engine does not track ids.
    pub async fn send_action_result(&self, id: &str, success: bool, message: &str) -> Result<()> {
        let data = ActionResultData {
            id: id.to_string(),
            success,
            message: message.to_string(),
        };
        self.send_data(command::ACTION_RESULT, &data).await
    }

    /// Re-send the whole registry as one `actions/register` batch.
    pub(super) async fn resend_registered_actions(&self) -> Result<()> {
        let registry = self.inner.registry.write().await;
        let actions = registry.definitions();
        if actions.is_empty() {
            return Ok(());
        }
        self.send_data(command::ACTIONS_REGISTER, &RegisterData { actions }).await
    }
}
