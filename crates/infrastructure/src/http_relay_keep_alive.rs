use std::time::Duration;

use async_trait::async_trait;
use ephemail_application::RelayKeepAlive;
use ephemail_core::{AppError, AppResult};
use tracing::debug;
use url::Url;

/// Timeout applied to each relay liveness request.
pub const RELAY_PING_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP implementation of the relay keep-alive port.
pub struct HttpRelayKeepAlive {
    http_client: reqwest::Client,
    liveness_url: Url,
}

impl HttpRelayKeepAlive {
    /// Creates a keep-alive client for `{base_url}{liveness_path}`.
    pub fn new(base_url: &str, liveness_path: &str) -> AppResult<Self> {
        let liveness_url = liveness_url(base_url, liveness_path)?;
        let http_client = reqwest::Client::builder()
            .timeout(RELAY_PING_TIMEOUT)
            .build()
            .map_err(|error| {
                AppError::Internal(format!("failed to build relay http client: {error}"))
            })?;

        Ok(Self {
            http_client,
            liveness_url,
        })
    }

    /// Returns the URL pinged on every pass.
    #[must_use]
    pub fn liveness_url(&self) -> &Url {
        &self.liveness_url
    }
}

#[async_trait]
impl RelayKeepAlive for HttpRelayKeepAlive {
    async fn ping(&self) -> AppResult<()> {
        let response = self
            .http_client
            .get(self.liveness_url.clone())
            .send()
            .await
            .map_err(|error| AppError::Internal(format!("relay ping request failed: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Internal(format!(
                "relay ping returned status {status}"
            )));
        }

        debug!(url = %self.liveness_url, status = %status, "relay ping succeeded");
        Ok(())
    }
}

fn liveness_url(base_url: &str, liveness_path: &str) -> AppResult<Url> {
    let base_url = base_url.trim().trim_end_matches('/');
    let liveness_path = liveness_path.trim();
    let joined = if liveness_path.starts_with('/') {
        format!("{base_url}{liveness_path}")
    } else {
        format!("{base_url}/{liveness_path}")
    };

    let url = Url::parse(joined.as_str()).map_err(|error| {
        AppError::Validation(format!("invalid relay liveness url '{joined}': {error}"))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::Validation(format!(
            "relay liveness url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::liveness_url;

    #[test]
    fn liveness_url_joins_base_and_path() {
        let url = liveness_url("https://relay.example/", "/health");
        assert_eq!(
            url.map(|url| url.to_string()).unwrap_or_default(),
            "https://relay.example/health"
        );

        let nested = liveness_url("https://relay.example/push", "ping");
        assert_eq!(
            nested.map(|url| url.to_string()).unwrap_or_default(),
            "https://relay.example/push/ping"
        );
    }

    #[test]
    fn liveness_url_rejects_invalid_input() {
        assert!(liveness_url("not a url", "/health").is_err());
        assert!(liveness_url("ftp://relay.example", "/health").is_err());
    }
}
