//! In-process mock peer for integration tests.
//!
//! Accepts one WebSocket session, forwards every inbound text frame as JSON to
//! the test and writes whatever the test pushes back to the client.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, State},
    response::Response,
    routing::get,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde_json::{value::RawValue, Value};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Mutex};

use neuro_sdk_client::{ActionHandler, Client, ClientConfig, Validation};

const RECV_TIMEOUT: Duration = Duration::from_secs(3);

enum PeerCommand {
    Send(String),
    Close,
}

#[derive(Clone)]
struct PeerState {
    inbound: mpsc::UnboundedSender<Value>,
    outbound: Arc<Mutex<Option<mpsc::UnboundedReceiver<PeerCommand>>>>,
}

pub struct MockPeer {
    pub url: String,
    inbound: mpsc::UnboundedReceiver<Value>,
    outbound: mpsc::UnboundedSender<PeerCommand>,
}

impl MockPeer {
    pub async fn spawn() -> Self {
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let state = PeerState {
            inbound: in_tx,
            outbound: Arc::new(Mutex::new(Some(out_rx))),
        };

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/", get(upgrade)).with_state(state);
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            url: format!("ws://{addr}/"),
            inbound: in_rx,
            outbound: out_tx,
        }
    }

    /// A client for game `game` pointed at this peer.
    pub fn client(&self, game: &str) -> Client {
        Client::new(ClientConfig::new(game, self.url.clone())).unwrap()
    }

    pub fn client_with(&self, cfg: impl FnOnce(ClientConfig) -> ClientConfig) -> Client {
        Client::new(cfg(ClientConfig::new("T", self.url.clone()))).unwrap()
    }

    /// Next envelope the client sent.
    pub async fn recv(&mut self) -> Value {
        tokio::time::timeout(RECV_TIMEOUT, self.inbound.recv())
            .await
            .expect("timed out waiting for client message")
            .expect("mock peer stopped")
    }

    /// Next envelope, asserting its command.
    pub async fn expect(&mut self, command: &str) -> Value {
        let env = self.recv().await;
        assert_eq!(env["command"], command, "unexpected envelope {env}");
        env
    }

    /// Assert the client sends nothing for `window`.
    pub async fn expect_silence(&mut self, window: Duration) {
        if let Ok(Some(env)) = tokio::time::timeout(window, self.inbound.recv()).await {
            panic!("expected no message, got {env}");
        }
    }

    pub fn send(&self, env: Value) {
        self.send_raw(env.to_string());
    }

    pub fn send_raw(&self, text: impl Into<String>) {
        let _ = self.outbound.send(PeerCommand::Send(text.into()));
    }

    /// Close the session from the peer side.
    pub fn close(&self) {
        let _ = self.outbound.send(PeerCommand::Close);
    }
}

async fn upgrade(State(state): State<PeerState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_session(state, socket))
}

async fn run_session(state: PeerState, socket: WebSocket) {
    let Some(mut out_rx) = state.outbound.lock().await.take() else {
        return;
    };
    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            cmd = out_rx.recv() => match cmd {
                Some(PeerCommand::Send(text)) => {
                    if ws_tx.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Some(PeerCommand::Close) | None => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            },

            incoming = ws_rx.next() => {
                let Some(Ok(msg)) = incoming else { break; };
                if let Message::Text(s) = msg {
                    if let Ok(env) = serde_json::from_str::<Value>(&s) {
                        let _ = state.inbound.send(env);
                    }
                }
            }
        }
    }
}

/// Poll `cond` until it holds or the receive timeout elapses.
pub async fn eventually(mut cond: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
    while !cond() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Always-valid action that reports, on execute, how many `action/result`
/// envelopes its client had written by then.
pub struct Recorder {
    pub name: &'static str,
    pub client: Client,
    pub executed: mpsc::UnboundedSender<u64>,
}

impl Recorder {
    pub fn new(name: &'static str, client: &Client) -> (Self, mpsc::UnboundedReceiver<u64>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let recorder = Self {
            name,
            client: client.clone(),
            executed: tx,
        };
        (recorder, rx)
    }
}

#[async_trait]
impl ActionHandler for Recorder {
    type State = ();

    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "recording action"
    }

    fn validate(&self, _data: Option<&RawValue>) -> Validation<()> {
        Validation::success((), "pong")
    }

    async fn execute(&self, _state: ()) {
        let sent = self.client.metrics().sent.get("action/result");
        let _ = self.executed.send(sent);
    }
}

/// Action that requires `{"amount": <int>}` and hands the amount to execute.
pub struct Amount {
    pub executed: mpsc::UnboundedSender<i64>,
}

#[async_trait]
impl ActionHandler for Amount {
    type State = i64;

    fn name(&self) -> &str {
        "amount"
    }

    fn description(&self) -> &str {
        "takes an amount"
    }

    fn validate(&self, data: Option<&RawValue>) -> Validation<i64> {
        let Some(raw) = data else {
            return Validation::failure("Missing data");
        };
        match serde_json::from_str::<Value>(raw.get())
            .ok()
            .and_then(|v| v["amount"].as_i64())
        {
            Some(amount) => Validation::success(amount, format!("amount {amount}")),
            None => Validation::failure("amount must be an integer"),
        }
    }

    async fn execute(&self, amount: i64) {
        let _ = self.executed.send(amount);
    }
}

/// Always-valid action whose execute outlives any test.
pub struct Slow {
    pub started: mpsc::UnboundedSender<()>,
}

#[async_trait]
impl ActionHandler for Slow {
    type State = ();

    fn name(&self) -> &str {
        "slow"
    }

    fn description(&self) -> &str {
        "takes its time"
    }

    fn validate(&self, _data: Option<&RawValue>) -> Validation<()> {
        Validation::success((), "working on it")
    }

    async fn execute(&self, _state: ()) {
        let _ = self.started.send(());
        tokio::time::sleep(Duration::from_secs(10)).await;
    }
}
