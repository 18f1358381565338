use std::time::Duration;

use reqwest::ClientBuilder;

/// Connect and request timeout applied to every outbound call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Build a `reqwest::ClientBuilder` shared by the pricing and reply clients.
///
/// Certificate verification is enabled unless `accept_invalid_certs` is set,
/// which is only meant for development against self-signed hosts.
pub fn builder(timeout: Duration, accept_invalid_certs: bool) -> ClientBuilder {
    let mut builder = reqwest::Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout);
    if accept_invalid_certs {
        builder = builder.danger_accept_invalid_certs(true);
    }
    builder
}
