use serde::Serialize;

use crate::error::BotError;

const REPLY_PATH: &str = "/v2/bot/message/reply";

/// Sends reply messages through the LINE Messaging API.
#[derive(Clone)]
pub struct LineClient {
    client: reqwest::Client,
    api_url: String,
    access_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: [OutgoingText<'a>; 1],
}

#[derive(Debug, Serialize)]
struct OutgoingText<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

impl LineClient {
    pub fn new(
        client: reqwest::Client,
        api_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            access_token: access_token.into(),
        }
    }

    /// Send `text` as the single reply for `reply_token`.
    pub async fn reply(&self, reply_token: &str, text: &str) -> Result<(), BotError> {
        let url = format!("{}{}", self.api_url.trim_end_matches('/'), REPLY_PATH);
        let body = ReplyRequest {
            reply_token,
            messages: [OutgoingText { kind: "text", text }],
        };
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| BotError::Http {
                source: e,
                endpoint: "line reply",
            })?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BotError::ReplyRejected { status, body });
        }
        Ok(())
    }
}
