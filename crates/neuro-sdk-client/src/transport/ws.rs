//! WebSocket dialing and the split halves the engine works with.
//!
//! The write half lives behind the engine's send lock; the read half is moved
//! into the background read task.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

use neuro_sdk_core::error::{NeuroError, Result};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub type WsSink = SplitSink<WsStream, Message>;
pub type WsSource = SplitStream<WsStream>;

/// Parse the endpoint and perform the WebSocket handshake.
pub async fn dial(address: &str) -> Result<(WsSink, WsSource)> {
    let url = Url::parse(address)
        .map_err(|e| NeuroError::Connection(format!("invalid websocket URL: {e}")))?;
    match url.scheme() {
        "ws" | "wss" => {}
        other => {
            return Err(NeuroError::Connection(format!(
                "invalid websocket URL: unsupported scheme {other}"
            )))
        }
    }

    let (stream, _resp) = connect_async(url.as_str())
        .await
        .map_err(|e| NeuroError::Connection(format!("failed to connect: {e}")))?;

    Ok(stream.split())
}

pub async fn write(sink: &mut WsSink, msg: Message) -> Result<()> {
    sink.send(msg)
        .await
        .map_err(|e| NeuroError::Write(format!("failed to send message: {e}")))
}

/// Send a close frame and release the write half. A connection the peer
/// already tore down counts as closed.
pub async fn shutdown(sink: &mut WsSink) -> Result<()> {
    match sink.close().await {
        Ok(()) | Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => Ok(()),
        Err(e) => Err(NeuroError::Write(format!("failed to close connection: {e}"))),
    }
}
