//! LINE webhook service answering currency-rate questions.
//!
//! `POST /callback` verifies the delivery signature, hands every text message
//! to [`quote_core::QuoteBot`] and sends back at most one reply per message.

pub mod config;
pub mod error;
pub mod line;
pub mod metrics;
pub mod server;
pub mod webhook;
