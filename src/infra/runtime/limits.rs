use std::time::Duration;

/// Build a reqwest client with short timeouts, for admin health checks against a running server.
pub fn make_http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(2))
        .timeout(Duration::from_secs(6))
        .build()
}
