use std::time::Duration;

use clap::Parser;
use quote_core::{Grammars, NoMatchPolicy};
use serde::Deserialize;

use crate::error::BotError;

/// Environment names the bot was originally deployed with. They are read as
/// defaults so the prefixed `CURRENCY_BOT_*` variables win when both are set.
const LEGACY_ENV: [(&str, &str); 4] = [
    ("port", "PORT"),
    ("channel_secret", "CHANNEL_SECRET"),
    ("channel_access_token", "CHANNEL_TOKEN"),
    ("pricing_api_key", "currencylayerAPIKey"),
];

/// Command line arguments
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional path to a configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Listen port, overrides every other source
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Application configuration loaded from defaults, environment and file
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub channel_secret: String,
    #[serde(default)]
    pub channel_access_token: String,
    pub line_api_url: String,
    pub pricing_url: String,
    #[serde(default)]
    pub pricing_api_key: String,
    pub base_currency: String,
    pub request_timeout_secs: u64,
    pub precision: usize,
    pub pair_grammar: bool,
    pub relaxed_pair: bool,
    pub slash_grammar: bool,
    pub reply_on_no_match: bool,
    pub rate_cache_ttl_secs: u64,
    pub accept_invalid_certs: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: None,
            channel_secret: String::new(),
            channel_access_token: String::new(),
            line_api_url: "https://api.line.me".into(),
            pricing_url: "http://apilayer.net/api/live".into(),
            pricing_api_key: String::new(),
            base_currency: "USD".into(),
            request_timeout_secs: 15,
            precision: quote_core::reply::DEFAULT_PRECISION,
            pair_grammar: true,
            relaxed_pair: false,
            slash_grammar: true,
            reply_on_no_match: true,
            rate_cache_ttl_secs: 0,
            accept_invalid_certs: false,
        }
    }
}

impl Settings {
    pub fn load(cli: &Cli) -> Result<Self, BotError> {
        let defaults = Settings::default();
        let mut builder = config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("line_api_url", defaults.line_api_url)?
            .set_default("pricing_url", defaults.pricing_url)?
            .set_default("base_currency", defaults.base_currency)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs)?
            .set_default("precision", defaults.precision as u64)?
            .set_default("pair_grammar", defaults.pair_grammar)?
            .set_default("relaxed_pair", defaults.relaxed_pair)?
            .set_default("slash_grammar", defaults.slash_grammar)?
            .set_default("reply_on_no_match", defaults.reply_on_no_match)?
            .set_default("rate_cache_ttl_secs", defaults.rate_cache_ttl_secs)?
            .set_default("accept_invalid_certs", defaults.accept_invalid_certs)?;
        for (key, var) in LEGACY_ENV {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_default(key, value)?;
            }
        }
        builder = builder.add_source(
            config::Environment::with_prefix("CURRENCY_BOT").try_parsing(true),
        );
        if let Some(path) = &cli.config {
            builder = builder.add_source(config::File::with_name(path));
        }
        let mut settings: Settings = builder.build()?.try_deserialize()?;
        if let Some(port) = cli.port {
            settings.port = Some(port);
        }
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), BotError> {
        if self.port.is_none() {
            return Err(BotError::MissingPort);
        }
        if self.base_currency.len() != 3
            || !self.base_currency.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(BotError::InvalidSetting(format!(
                "base_currency must be a three-letter code, got {:?}",
                self.base_currency
            )));
        }
        if self.relaxed_pair && !self.pair_grammar {
            return Err(BotError::InvalidSetting(
                "relaxed_pair requires pair_grammar to be enabled".into(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn rate_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.rate_cache_ttl_secs)
    }

    pub fn grammars(&self) -> Grammars {
        Grammars {
            pair: self.pair_grammar,
            relaxed_pair: self.relaxed_pair,
            slash_code: self.slash_grammar,
        }
    }

    pub fn no_match_policy(&self) -> NoMatchPolicy {
        if self.reply_on_no_match {
            NoMatchPolicy::ReplyInvalidFormat
        } else {
            NoMatchPolicy::Silent
        }
    }
}
