use thiserror::Error;

use crate::instruction::{CurrencyCode, Instruction};
use crate::rates::RateTable;

/// A resolved rate: one unit of `source` buys `rate` units of `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub source: CurrencyCode,
    pub target: CurrencyCode,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    #[error("rate table unavailable")]
    ServiceUnreachable,
    #[error("unknown currency code {0}")]
    UnknownCurrency(CurrencyCode),
}

/// Look up the instruction's codes in `table` and compute the quote.
///
/// A pair is a cross-rate through the table's base: `target / source`.
/// The base currency itself always resolves to 1.
pub fn resolve(table: &RateTable, instr: &Instruction) -> Result<Quote, QuoteError> {
    if !table.success {
        return Err(QuoteError::ServiceUnreachable);
    }
    match instr {
        Instruction::SingleCode { code } => Ok(Quote {
            source: table.base.clone(),
            target: code.clone(),
            rate: base_rate(table, code)?,
        }),
        Instruction::Pair { source, target } => {
            let source_rate = base_rate(table, source)?;
            let target_rate = base_rate(table, target)?;
            Ok(Quote {
                source: source.clone(),
                target: target.clone(),
                rate: target_rate / source_rate,
            })
        }
    }
}

fn base_rate(table: &RateTable, code: &CurrencyCode) -> Result<f64, QuoteError> {
    if *code == table.base {
        return Ok(1.0);
    }
    table
        .rate(code)
        .ok_or_else(|| QuoteError::UnknownCurrency(code.clone()))
}
