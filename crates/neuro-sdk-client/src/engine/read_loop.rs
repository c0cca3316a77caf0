//! Background read task.
//!
//! One task per connection. It decodes inbound frames and hands each
//! invocation to its own task so a slow handler never stalls the socket.

use std::sync::atomic::Ordering;
use std::sync::Weak;

use futures_util::StreamExt;
use tokio::sync::watch;
use tracing::Instrument;

use neuro_sdk_core::error::NeuroError;
use neuro_sdk_core::protocol::{command, Envelope, IncomingAction};

use crate::engine::client::{Client, ClientInner};
use crate::engine::errors::ErrorSink;
use crate::transport::codec::{self, Inbound};
use crate::transport::ws::WsSource;

/// Runs until the peer goes away, the read fails, `close` is signalled or
/// every client handle has been dropped.
pub(super) async fn run(
    weak: Weak<ClientInner>,
    mut source: WsSource,
    mut shutdown: watch::Receiver<bool>,
    errors: ErrorSink,
) {
    loop {
        let frame = tokio::select! {
            _ = shutdown.changed() => break,
            frame = source.next() => frame,
        };

        let Some(inner) = weak.upgrade() else {
            break;
        };
        let client = Client { inner };

        let msg = match frame {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => {
                terminate(&client, &errors, NeuroError::Read(format!("read failed: {e}")));
                break;
            }
            None => {
                terminate(&client, &errors, NeuroError::Read("connection closed by peer".into()));
                break;
            }
        };

        match codec::decode(msg) {
            Ok(Inbound::Envelope(env)) => dispatch(&client, env, &errors),
            Ok(Inbound::Control) => {}
            Ok(Inbound::Close) => {
                terminate(&client, &errors, NeuroError::Read("connection closed by peer".into()));
                break;
            }
            Err(e) => {
                client.inner.metrics.decode_failures.inc();
                tracing::warn!(error = %e, "failed to decode inbound message");
            }
        }
    }

    if let Some(inner) = weak.upgrade() {
        inner.connected.store(false, Ordering::SeqCst);
    }
    tracing::info!("read loop stopped");
}

/// Local `close` is not an error; anything else is reported once.
fn terminate(client: &Client, errors: &ErrorSink, err: NeuroError) {
    client.inner.connected.store(false, Ordering::SeqCst);
    if client.is_closed() {
        return;
    }
    tracing::warn!(error = %err, "connection lost");
    errors.publish(err);
}

fn dispatch(client: &Client, env: Envelope, errors: &ErrorSink) {
    client.inner.metrics.received.inc(&env.command);

    match env.command.as_str() {
        command::ACTION => match env.parse_data::<IncomingAction>() {
            Ok(action) => {
                let span = tracing::info_span!("action", id = %action.id, name = %action.name);
                tokio::spawn(handle_action(client.clone(), action).instrument(span));
            }
            Err(e) => {
                client.inner.metrics.decode_failures.inc();
                tracing::warn!(error = %e, "malformed action message");
                errors.publish(e);
            }
        },
        command::ACTIONS_REREGISTER_ALL => {
            let client = client.clone();
            let task = async move {
                if let Err(e) = client.resend_registered_actions().await {
                    tracing::warn!(error = %e, "failed to re-register actions");
                }
            };
            tokio::spawn(task.in_current_span());
        }
        other => tracing::debug!(command = %other, "unhandled command"),
    }
}

/// lookup -> validate -> send result -> execute
async fn handle_action(client: Client, action: IncomingAction) {
    let Some(handler) = client.registry().get(&action.name).await else {
        client.inner.metrics.unknown_actions.inc();
        tracing::warn!("unknown action");
        let message = format!("Unknown action: {}", action.name);
        if let Err(e) = client.send_action_result(&action.id, false, &message).await {
            tracing::warn!(error = %e, "failed to send action result");
        }
        return;
    };

    let (result, execution) = handler.validate(action.data.as_deref());

    if let Err(e) = client
        .send_action_result(&action.id, result.success, &result.message)
        .await
    {
        tracing::warn!(error = %e, "failed to send action result");
    }

    match execution {
        Some(execution) => {
            execution.await;
            client.inner.metrics.executed_actions.inc();
        }
        None => {
            client.inner.metrics.rejected_actions.inc();
            tracing::debug!(message = %result.message, "validation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::value::RawValue;

    use super::*;
    use crate::config::ClientConfig;
    use crate::dispatch::{ActionHandler, SharedHandler, Validation};

    struct Flag(Arc<AtomicBool>);

    #[async_trait]
    impl ActionHandler for Flag {
        type State = ();

        fn name(&self) -> &str {
            "flag"
        }

        fn description(&self) -> &str {
            "sets a flag"
        }

        fn validate(&self, _data: Option<&RawValue>) -> Validation<()> {
            Validation::success((), "ok")
        }

        async fn execute(&self, _state: ()) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    fn invocation(name: &str) -> IncomingAction {
        IncomingAction {
            id: "1".into(),
            name: name.into(),
            data: None,
        }
    }

    #[tokio::test]
    async fn failed_result_send_still_executes() {
        let client = Client::new(ClientConfig::new("T", "ws://127.0.0.1:1/")).unwrap();
        client.close().await.unwrap();

        let ran = Arc::new(AtomicBool::new(false));
        let handler = SharedHandler::new(Flag(Arc::clone(&ran)));
        client.registry().write().await.insert_all(&[handler]).unwrap();

        handle_action(client.clone(), invocation("flag")).await;

        assert!(ran.load(Ordering::SeqCst));
        assert_eq!(client.metrics().sent.get("action/result"), 0);
        assert_eq!(client.metrics().executed_actions.get(), 1);
    }

    #[tokio::test]
    async fn unknown_action_with_failed_send_is_only_counted() {
        let client = Client::new(ClientConfig::new("T", "ws://127.0.0.1:1/")).unwrap();

        handle_action(client.clone(), invocation("missing")).await;

        assert_eq!(client.metrics().unknown_actions.get(), 1);
        assert_eq!(client.metrics().sent.get("action/result"), 0);
        assert_eq!(client.metrics().executed_actions.get(), 0);
    }
}
