//! Message-to-quote pipeline for the currency bot.
//!
//! A chat message is turned into an [`Instruction`] by the [`InstructionParser`],
//! a fresh [`RateTable`] is pulled from a [`RateSource`], the requested rate is
//! computed by [`resolve`] and rendered by the [`ReplyFormatter`].
//! [`QuoteBot`] runs the whole sequence for one message.
//!
//! Every rate the provider reports is expressed against a single base currency
//! (`USD` unless configured otherwise) and keyed as `<BASE><CODE>`, e.g.
//! `USDEUR`. Cross-rates between two non-base currencies are derived by
//! dividing their base-relative rates.

pub mod http_client;
pub mod instruction;
pub mod pipeline;
pub mod rates;
pub mod reply;
pub mod resolve;

pub use instruction::{CurrencyCode, Grammars, Instruction, InstructionParser};
pub use pipeline::QuoteBot;
pub use rates::{CachedRates, CurrencyLayer, FetchError, RateSource, RateTable};
pub use reply::{NoMatchPolicy, ReplyFormatter};
pub use resolve::{resolve, Quote, QuoteError};
