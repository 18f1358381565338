use std::sync::Arc;

use tracing::info;

use crate::instruction::InstructionParser;
use crate::rates::RateSource;
use crate::reply::ReplyFormatter;
use crate::resolve::resolve;

/// Parse, fetch, resolve and format for a single message.
///
/// Holds no per-message state: every call fetches its own table.
#[derive(Clone)]
pub struct QuoteBot {
    parser: InstructionParser,
    rates: Arc<dyn RateSource>,
    formatter: ReplyFormatter,
}

impl QuoteBot {
    pub fn new(
        parser: InstructionParser,
        rates: Arc<dyn RateSource>,
        formatter: ReplyFormatter,
    ) -> Self {
        Self {
            parser,
            rates,
            formatter,
        }
    }

    /// Reply text for `text`, or `None` when nothing should be sent.
    pub async fn respond(&self, text: &str) -> Option<String> {
        let Some(instr) = self.parser.parse(text) else {
            info!("message matched no grammar");
            return self.formatter.no_match();
        };
        let table = self.rates.fetch().await;
        let result = resolve(&table, &instr);
        if let Err(e) = &result {
            info!(kind = instr.kind(), error = %e, "quote not resolved");
        }
        Some(self.formatter.format(&result))
    }
}
