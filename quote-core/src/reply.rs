use crate::resolve::{Quote, QuoteError};

/// Sent when the rate table could not be fetched.
pub const SERVICE_UNREACHABLE: &str = "匯率服務暫時無法連線";
/// Sent when a requested code is not in the rate table.
pub const UNKNOWN_CURRENCY: &str = "查無此匯率代號";
/// Sent for text that matches no grammar, when enabled.
pub const INVALID_FORMAT: &str = "匯率代號輸入錯誤";

pub const DEFAULT_PRECISION: usize = 3;

/// What to do with text that matches no grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoMatchPolicy {
    Silent,
    ReplyInvalidFormat,
}

/// Renders resolver output as the chat reply.
#[derive(Debug, Clone)]
pub struct ReplyFormatter {
    precision: usize,
    no_match: NoMatchPolicy,
}

impl ReplyFormatter {
    pub fn new(precision: usize, no_match: NoMatchPolicy) -> Self {
        Self {
            precision,
            no_match,
        }
    }

    /// `"EUR/GBP  0.889"` on success, one of the fixed strings otherwise.
    pub fn format(&self, result: &Result<Quote, QuoteError>) -> String {
        match result {
            Ok(q) => format!(
                "{}/{}  {:.*}",
                q.source, q.target, self.precision, q.rate
            ),
            Err(QuoteError::ServiceUnreachable) => SERVICE_UNREACHABLE.to_string(),
            Err(QuoteError::UnknownCurrency(_)) => UNKNOWN_CURRENCY.to_string(),
        }
    }

    pub fn no_match(&self) -> Option<String> {
        match self.no_match {
            NoMatchPolicy::Silent => None,
            NoMatchPolicy::ReplyInvalidFormat => Some(INVALID_FORMAT.to_string()),
        }
    }
}

impl Default for ReplyFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION, NoMatchPolicy::ReplyInvalidFormat)
    }
}
