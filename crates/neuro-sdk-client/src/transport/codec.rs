//! Decode-once codec for the transport layer.
//!
//! - Text frames => Envelope (lazy `RawValue` for data)
//! - Binary frames => Envelope as well, when they carry UTF-8 JSON
//! - Ping/Pong are surfaced as control frames, Close ends the session

use neuro_sdk_core::{
    error::{NeuroError, Result},
    protocol::Envelope,
};
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug)]
pub enum Inbound {
    Envelope(Envelope),
    Control,
    Close,
}

pub fn decode(msg: Message) -> Result<Inbound> {
    match msg {
        Message::Text(s) => Ok(Inbound::Envelope(Envelope::decode(&s)?)),
        Message::Binary(b) => {
            let s = std::str::from_utf8(&b)
                .map_err(|e| NeuroError::Decode(format!("utf8 invalid: {e}")))?;
            Ok(Inbound::Envelope(Envelope::decode(s)?))
        }
        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => Ok(Inbound::Control),
        Message::Close(_) => Ok(Inbound::Close),
    }
}

/// Envelopes always travel as text frames.
pub fn encode(env: &Envelope) -> Result<Message> {
    Ok(Message::Text(env.encode()?))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use super::*;

    #[test]
    fn text_and_binary_frames_decode_to_envelopes() {
        let text = r#"{"command":"actions/reregister_all"}"#;
        for msg in [Message::Text(text.into()), Message::Binary(text.as_bytes().to_vec())] {
            match decode(msg).unwrap() {
                Inbound::Envelope(env) => assert_eq!(env.command, "actions/reregister_all"),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn control_and_close_frames() {
        assert!(matches!(decode(Message::Ping(vec![1])).unwrap(), Inbound::Control));
        assert!(matches!(decode(Message::Pong(vec![])).unwrap(), Inbound::Control));
        assert!(matches!(decode(Message::Close(None)).unwrap(), Inbound::Close));
    }

    #[test]
    fn malformed_frames_are_decode_errors() {
        let err = decode(Message::Text("{".into())).unwrap_err();
        assert_eq!(err.kind().as_str(), "DECODE_ERROR");
        let err = decode(Message::Binary(vec![0xff, 0xfe])).unwrap_err();
        assert_eq!(err.kind().as_str(), "DECODE_ERROR");
    }
}
