//! Success/failure pings to a monitoring endpoint after each run.

use std::time::Duration;

use tracing::warn;

const PING_TIMEOUT: Duration = Duration::from_secs(10);
const PING_USER_AGENT: &str = "autobalance/0.1";

/// Sends success/failure notifications to a configured healthcheck endpoint.
/// Without a URL every notify is a no-op; ping failures are logged, never
/// fatal.
pub struct HealthcheckNotifier {
    success_url: Option<String>,
    failure_url: Option<String>,
    client: reqwest::Client,
}

impl HealthcheckNotifier {
    pub fn new(base_url: Option<&str>) -> Self {
        let success_url = base_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string);
        let failure_url = success_url
            .as_ref()
            .map(|url| format!("{}/fail", url.trim_end_matches('/')));
        let client = reqwest::Client::builder()
            .timeout(PING_TIMEOUT)
            .user_agent(PING_USER_AGENT)
            .build()
            .expect("failed to build HTTP client");
        Self {
            success_url,
            failure_url,
            client,
        }
    }

    pub async fn notify_success(&self) {
        if let Some(url) = &self.success_url {
            self.ping(url).await;
        }
    }

    pub async fn notify_failure(&self) {
        if let Some(url) = &self.failure_url {
            self.ping(url).await;
        }
    }

    async fn ping(&self, url: &str) {
        if let Err(err) = self.client.get(url).send().await {
            warn!(url, error = %err, "healthcheck ping failed");
        }
    }
}
