//! Inbound LINE webhook payloads and signature verification.

use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::error::WebhookError;

pub const SIGNATURE_HEADER: &str = "x-line-signature";

type HmacSha256 = Hmac<Sha256>;

/// Body of one webhook delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    Message(MessageEvent),
    /// follow, unfollow, postback, join, ...
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    /// Absent for events delivered while the channel is in standby mode.
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Option<Source>,
    #[serde(default)]
    pub timestamp: i64,
    pub message: Message,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Message {
    Text(TextMessage),
    /// image, sticker, location, ...
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextMessage {
    #[serde(default)]
    pub id: String,
    pub text: String,
}

impl Message {
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Text(_) => "text",
            Message::Other => "other",
        }
    }
}

/// Check `signature` (base64 HMAC-SHA256 of `body` keyed by the channel
/// secret) in constant time, then decode the payload.
pub fn parse_request(
    channel_secret: &str,
    signature: Option<&str>,
    body: &[u8],
) -> Result<WebhookPayload, WebhookError> {
    let signature = signature.ok_or(WebhookError::InvalidSignature)?;
    verify_signature(channel_secret, signature, body)?;
    Ok(serde_json::from_slice(body)?)
}

pub fn verify_signature(
    channel_secret: &str,
    signature: &str,
    body: &[u8],
) -> Result<(), WebhookError> {
    let provided = B64
        .decode(signature.trim())
        .map_err(|_| WebhookError::InvalidSignature)?;
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .map_err(|_| WebhookError::InvalidSignature)?;
    mac.update(body);
    mac.verify_slice(&provided)
        .map_err(|_| WebhookError::InvalidSignature)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(channel_secret: &str, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes()).unwrap();
        mac.update(body);
        B64.encode(mac.finalize().into_bytes())
    }

    const SAMPLE: &str = r#"{
        "destination": "Uxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx",
        "events": [
            {
                "type": "message",
                "replyToken": "nHuyWiB7yP5Zw52FIkcQobQuGDXCTA",
                "source": {"type": "user", "userId": "U4af4980629"},
                "timestamp": 1462629479859,
                "mode": "active",
                "message": {"type": "text", "id": "325708", "text": "eur/gbp"}
            },
            {
                "type": "message",
                "replyToken": "b60d432864f44d079f6d8efe86cf404b",
                "source": {"type": "group", "groupId": "C1", "userId": "U2"},
                "timestamp": 1462629479860,
                "message": {"type": "sticker", "id": "1", "packageId": "1", "stickerId": "1"}
            },
            {
                "type": "follow",
                "replyToken": "85cbe770fa8b4f45bbe077b1d4be4a36",
                "source": {"type": "user", "userId": "U3"},
                "timestamp": 1462629479861
            }
        ]
    }"#;

    #[test]
    fn decodes_events_into_closed_variants() {
        let payload: WebhookPayload = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(payload.events.len(), 3);
        match &payload.events[0] {
            Event::Message(ev) => {
                assert_eq!(
                    ev.reply_token.as_deref(),
                    Some("nHuyWiB7yP5Zw52FIkcQobQuGDXCTA")
                );
                assert_eq!(
                    ev.source.as_ref().and_then(|s| s.user_id.as_deref()),
                    Some("U4af4980629")
                );
                assert_eq!(
                    ev.message,
                    Message::Text(TextMessage {
                        id: "325708".into(),
                        text: "eur/gbp".into()
                    })
                );
            }
            other => panic!("unexpected event {other:?}"),
        }
        match &payload.events[1] {
            Event::Message(ev) => assert_eq!(ev.message, Message::Other),
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(payload.events[2], Event::Other);
    }

    #[test]
    fn standby_event_without_reply_token_still_decodes() {
        let body = r#"{"events": [
            {
                "type": "message",
                "mode": "standby",
                "source": {"type": "user", "userId": "U1"},
                "timestamp": 1462629479859,
                "message": {"type": "text", "id": "1", "text": "eur/gbp"}
            },
            {
                "type": "message",
                "mode": "active",
                "replyToken": "rt-active",
                "source": {"type": "user", "userId": "U2"},
                "timestamp": 1462629479860,
                "message": {"type": "text", "id": "2", "text": "gbp/eur"}
            }
        ]}"#;
        let sig = sign("channel-secret", body.as_bytes());
        let payload = parse_request("channel-secret", Some(&sig), body.as_bytes()).unwrap();
        let tokens: Vec<_> = payload
            .events
            .iter()
            .map(|ev| match ev {
                Event::Message(m) => m.reply_token.as_deref(),
                Event::Other => panic!("unexpected event {ev:?}"),
            })
            .collect();
        assert_eq!(tokens, vec![None, Some("rt-active")]);
    }

    #[test]
    fn accepts_valid_signature() {
        let sig = sign("channel-secret", SAMPLE.as_bytes());
        let payload = parse_request("channel-secret", Some(&sig), SAMPLE.as_bytes()).unwrap();
        assert_eq!(payload.events.len(), 3);
    }

    #[test]
    fn rejects_bad_or_missing_signature() {
        let sig = sign("other-secret", SAMPLE.as_bytes());
        assert!(matches!(
            parse_request("channel-secret", Some(&sig), SAMPLE.as_bytes()),
            Err(WebhookError::InvalidSignature)
        ));
        assert!(matches!(
            parse_request("channel-secret", Some("not base64!"), SAMPLE.as_bytes()),
            Err(WebhookError::InvalidSignature)
        ));
        assert!(matches!(
            parse_request("channel-secret", None, SAMPLE.as_bytes()),
            Err(WebhookError::InvalidSignature)
        ));
    }

    #[test]
    fn signed_garbage_is_a_parse_failure() {
        let body = b"{not json";
        let sig = sign("channel-secret", body);
        let err = parse_request("channel-secret", Some(&sig), body).unwrap_err();
        assert!(matches!(err, WebhookError::Parse(_)));
        assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
