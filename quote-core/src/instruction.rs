use std::fmt;

use regex::Regex;

/// Three-letter currency code, always stored in uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: &str) -> Self {
        Self(code.to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a message asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `EUR/GBP`: how many units of `target` one `source` buys.
    Pair {
        source: CurrencyCode,
        target: CurrencyCode,
    },
    /// `/EUR`: the base currency quoted in `code`.
    SingleCode { code: CurrencyCode },
}

impl Instruction {
    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Instruction::Pair { .. } => "pair",
            Instruction::SingleCode { .. } => "single_code",
        }
    }
}

/// Which message grammars are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grammars {
    /// `XXX/YYY` anywhere in the text.
    pub pair: bool,
    /// Accept letter runs of any length on both sides of the slash.
    pub relaxed_pair: bool,
    /// `/XXX` at the very start of the text.
    pub slash_code: bool,
}

impl Default for Grammars {
    fn default() -> Self {
        Self {
            pair: true,
            relaxed_pair: false,
            slash_code: true,
        }
    }
}

const STRICT_PAIR: &str = r"([A-Za-z]{3})/([A-Za-z]{3})";
const RELAXED_PAIR: &str = r"([A-Za-z]+)/([A-Za-z]+)";

/// Extracts an [`Instruction`] from free-form message text.
///
/// The pair grammar is tried first, then the slash-code grammar.
#[derive(Debug, Clone)]
pub struct InstructionParser {
    pair: Option<Regex>,
    slash_code: bool,
}

impl InstructionParser {
    pub fn new(grammars: Grammars) -> Self {
        let pair = grammars.pair.then(|| {
            let pattern = if grammars.relaxed_pair {
                RELAXED_PAIR
            } else {
                STRICT_PAIR
            };
            // Both patterns are fixed literals.
            Regex::new(pattern).expect("valid pair pattern")
        });
        Self {
            pair,
            slash_code: grammars.slash_code,
        }
    }

    /// Returns `None` when the text matches no enabled grammar.
    pub fn parse(&self, text: &str) -> Option<Instruction> {
        self.parse_pair(text).or_else(|| self.parse_slash_code(text))
    }

    fn parse_pair(&self, text: &str) -> Option<Instruction> {
        let caps = self.pair.as_ref()?.captures(text)?;
        Some(Instruction::Pair {
            source: CurrencyCode::new(caps.get(1)?.as_str()),
            target: CurrencyCode::new(caps.get(2)?.as_str()),
        })
    }

    fn parse_slash_code(&self, text: &str) -> Option<Instruction> {
        if !self.slash_code {
            return None;
        }
        let rest = text.strip_prefix('/')?;
        let code: String = rest.chars().take(3).collect();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        Some(Instruction::SingleCode {
            code: CurrencyCode::new(&code),
        })
    }
}

impl Default for InstructionParser {
    fn default() -> Self {
        Self::new(Grammars::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(source: &str, target: &str) -> Instruction {
        Instruction::Pair {
            source: CurrencyCode::new(source),
            target: CurrencyCode::new(target),
        }
    }

    fn single(code: &str) -> Instruction {
        Instruction::SingleCode {
            code: CurrencyCode::new(code),
        }
    }

    #[test]
    fn parses_pair_and_uppercases() {
        let parser = InstructionParser::default();
        assert_eq!(parser.parse("eur/gbp"), Some(pair("EUR", "GBP")));
        assert_eq!(parser.parse("Usd/Jpy"), Some(pair("USD", "JPY")));
    }

    #[test]
    fn takes_first_pair_and_ignores_surrounding_text() {
        let parser = InstructionParser::default();
        assert_eq!(
            parser.parse("rate please: twd/jpy and then eur/usd"),
            Some(pair("TWD", "JPY"))
        );
    }

    #[test]
    fn strict_pair_uses_three_letters_from_longer_runs() {
        let parser = InstructionParser::default();
        assert_eq!(parser.parse("EURO/GBPX"), Some(pair("URO", "GBP")));
    }

    #[test]
    fn relaxed_pair_takes_whole_letter_runs() {
        let parser = InstructionParser::new(Grammars {
            relaxed_pair: true,
            ..Grammars::default()
        });
        assert_eq!(parser.parse("euro/gbpx"), Some(pair("EURO", "GBPX")));
        assert_eq!(parser.parse("a/b"), Some(pair("A", "B")));
    }

    #[test]
    fn parses_slash_code_ignoring_trailing_chars() {
        let parser = InstructionParser::default();
        assert_eq!(parser.parse("/eur"), Some(single("EUR")));
        assert_eq!(parser.parse("/EUR "), Some(single("EUR")));
        assert_eq!(parser.parse("/jpy?"), Some(single("JPY")));
        assert_eq!(parser.parse("/GBPXYZ"), Some(single("GBP")));
    }

    #[test]
    fn pair_takes_priority_over_slash_code() {
        let parser = InstructionParser::default();
        assert_eq!(parser.parse("/eur/gbp"), Some(pair("EUR", "GBP")));
    }

    #[test]
    fn rejects_non_matching_text() {
        let parser = InstructionParser::default();
        assert_eq!(parser.parse("hello there"), None);
        assert_eq!(parser.parse(""), None);
        assert_eq!(parser.parse("/eu"), None);
        assert_eq!(parser.parse("/e1r"), None);
        assert_eq!(parser.parse(" /eur"), None);
        assert_eq!(parser.parse("12/34"), None);
        assert_eq!(parser.parse("/é€r"), None);
    }

    #[test]
    fn disabled_grammars_do_not_match() {
        let only_slash = InstructionParser::new(Grammars {
            pair: false,
            ..Grammars::default()
        });
        assert_eq!(only_slash.parse("EUR/GBP"), None);
        assert_eq!(only_slash.parse("/EUR"), Some(single("EUR")));

        let only_pair = InstructionParser::new(Grammars {
            slash_code: false,
            ..Grammars::default()
        });
        assert_eq!(only_pair.parse("/EUR"), None);
        assert_eq!(only_pair.parse("EUR/GBP"), Some(pair("EUR", "GBP")));
    }
}
