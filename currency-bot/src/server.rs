use std::net::TcpListener;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use quote_core::{
    http_client, CachedRates, CurrencyCode, CurrencyLayer, InstructionParser, QuoteBot,
    RateSource, ReplyFormatter,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::{BotError, WebhookError};
use crate::line::LineClient;
use crate::metrics::{
    metrics_handler, EVENTS_IGNORED, REPLIES_SENT, REPLY_FAILURES, TEXT_MESSAGES,
    WEBHOOK_DELIVERIES,
};
use crate::webhook::{self, Event, Message, MessageEvent, SIGNATURE_HEADER};

/// Read-only state shared by every delivery.
pub struct AppState {
    bot: QuoteBot,
    line: LineClient,
    channel_secret: String,
}

impl AppState {
    pub fn new(bot: QuoteBot, line: LineClient, channel_secret: impl Into<String>) -> Self {
        Self {
            bot,
            line,
            channel_secret: channel_secret.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, BotError> {
        let http = http_client::builder(settings.request_timeout(), settings.accept_invalid_certs)
            .build()
            .map_err(|e| BotError::Http {
                source: e,
                endpoint: "client builder",
            })?;

        let live = CurrencyLayer::new(
            http.clone(),
            &settings.pricing_url,
            &settings.pricing_api_key,
            CurrencyCode::new(&settings.base_currency),
        );
        let ttl = settings.rate_cache_ttl();
        let rates: Arc<dyn RateSource> = if ttl.is_zero() {
            Arc::new(live)
        } else {
            Arc::new(CachedRates::new(live, ttl))
        };

        let bot = QuoteBot::new(
            InstructionParser::new(settings.grammars()),
            rates,
            ReplyFormatter::new(settings.precision, settings.no_match_policy()),
        );
        let line = LineClient::new(http, &settings.line_api_url, &settings.channel_access_token);
        Ok(Self::new(bot, line, settings.channel_secret.clone()))
    }

    async fn handle_event(&self, event: Event) {
        match event {
            Event::Message(MessageEvent {
                reply_token: None,
                message: Message::Text(_),
                ..
            }) => {
                info!("ignoring text message without reply token");
                EVENTS_IGNORED
                    .with_label_values(&["message", "no_reply_token"])
                    .inc();
            }
            Event::Message(MessageEvent {
                reply_token: Some(reply_token),
                source,
                message: Message::Text(text),
                ..
            }) => {
                let user_id = source.and_then(|s| s.user_id);
                info!(user_id = ?user_id, "text message");
                TEXT_MESSAGES.inc();
                let Some(reply) = self.bot.respond(&text.text).await else {
                    return;
                };
                match self.line.reply(&reply_token, &reply).await {
                    Ok(()) => REPLIES_SENT.inc(),
                    Err(e) => {
                        warn!(error = %e, "reply failed");
                        REPLY_FAILURES.inc();
                    }
                }
            }
            Event::Message(ev) => {
                info!(kind = ev.message.kind(), "ignoring non-text message");
                EVENTS_IGNORED
                    .with_label_values(&["message", ev.message.kind()])
                    .inc();
            }
            Event::Other => {
                info!("ignoring non-message event");
                EVENTS_IGNORED.with_label_values(&["other", "none"]).inc();
            }
        }
    }
}

async fn ping() -> &'static str {
    "PONG"
}

async fn callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, WebhookError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let payload = match webhook::parse_request(&state.channel_secret, signature, &body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "webhook rejected");
            let outcome = match e {
                WebhookError::InvalidSignature => "bad_signature",
                WebhookError::Parse(_) => "parse_failure",
            };
            WEBHOOK_DELIVERIES.with_label_values(&[outcome]).inc();
            return Err(e);
        }
    };
    WEBHOOK_DELIVERIES.with_label_values(&["accepted"]).inc();

    for event in payload.events {
        state.handle_event(event).await;
    }
    Ok(StatusCode::OK)
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/callback", post(callback))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Serve `app` on `listener` until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
) -> Result<(), BotError> {
    info!(addr = %listener.local_addr()?, "listening");
    axum::Server::from_tcp(listener)?
        .serve(app.into_make_service())
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}
