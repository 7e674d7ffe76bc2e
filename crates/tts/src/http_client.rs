use std::time::Duration;

use reqwest::Client;

/// HTTP client for the local backend
///
/// Timeouts are applied per request since probes and synthesis calls
/// use very different bounds.
pub fn http_client() -> reqwest::Result<Client> {
    let mut headers = http::HeaderMap::new();
    headers.insert(http::header::CONNECTION, http::HeaderValue::from_static("keep-alive"));

    Client::builder()
        .pool_idle_timeout(Some(Duration::from_secs(5)))
        .tcp_nodelay(true)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .default_headers(headers)
        .build()
}
