use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use once_cell::sync::Lazy;
use prometheus::{
    gather, register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec,
    TextEncoder,
};

pub static WEBHOOK_DELIVERIES: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "webhook_deliveries_total",
        "Webhook deliveries received, by outcome",
        &["outcome"]
    )
    .unwrap()
});

pub static EVENTS_IGNORED: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "webhook_events_ignored_total",
        "Events that carried no text message",
        &["event", "message"]
    )
    .unwrap()
});

pub static TEXT_MESSAGES: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "text_messages_total",
        "Text messages passed to the quote pipeline"
    )
    .unwrap()
});

pub static REPLIES_SENT: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("replies_sent_total", "Replies accepted by the messaging API").unwrap()
});

pub static REPLY_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "reply_failures_total",
        "Replies that could not be delivered"
    )
    .unwrap()
});

pub async fn metrics_handler() -> impl IntoResponse {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&gather(), &mut buffer) {
        tracing::error!(error = %e, "metrics encoding failed");
        return (StatusCode::INTERNAL_SERVER_ERROR, Vec::new()).into_response();
    }

    (
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response()
}
