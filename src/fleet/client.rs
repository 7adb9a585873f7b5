use crate::config::Config;
use crate::fleet::types::{ActionOutcome, FundsRequest, LandingPageContent};
use anyhow::{Context, Result};
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

/// Client for the fleet admin endpoints.
///
/// Every request carries the shared secret as a `key` query parameter.
pub struct FleetClient {
    client: Client,
    config: Config,
    key: String,
}

impl FleetClient {
    pub fn new(config: &Config) -> Result<Self> {
        let key = config
            .fleet_key
            .clone()
            .context("FLEET_API_KEY is required for fleet commands")?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            config: config.clone(),
            key,
        })
    }

    /// Charge a host's payout account
    pub async fn charge_host(&self, host_id: &str, amount: f64, reason: &str) -> Result<ActionOutcome> {
        let body = FundsRequest::new(amount, reason)?;
        info!("Charging host {} ${:.2}", host_id, body.amount);
        self.send(Method::POST, &host_path(host_id, "charge")?, Some(&body))
            .await
    }

    /// Hold funds from a host's next payout
    pub async fn hold_funds(&self, host_id: &str, amount: f64, reason: &str) -> Result<ActionOutcome> {
        let body = FundsRequest::new(amount, reason)?;
        info!("Holding ${:.2} for host {}", body.amount, host_id);
        self.send(Method::POST, &host_path(host_id, "hold")?, Some(&body))
            .await
    }

    pub async fn release_hold(&self, host_id: &str) -> Result<ActionOutcome> {
        info!("Releasing held funds for host {}", host_id);
        self.send::<()>(Method::POST, &host_path(host_id, "release")?, None)
            .await
    }

    /// Pay out a host's balance immediately
    pub async fn force_payout(&self, host_id: &str) -> Result<ActionOutcome> {
        info!("Forcing payout for host {}", host_id);
        self.send::<()>(Method::POST, &host_path(host_id, "payout")?, None)
            .await
    }

    pub async fn approve_insurance(&self, provider_id: &str) -> Result<ActionOutcome> {
        info!("Approving insurance provider {}", provider_id);
        let path = format!("/api/fleet/insurance/{}/approve", segment(provider_id)?);
        self.send(Method::POST, &path, Some(&json!({ "approved": true })))
            .await
    }

    pub async fn save_landing_page(
        &self,
        partner_id: &str,
        content: &LandingPageContent,
    ) -> Result<ActionOutcome> {
        info!("Saving landing page for partner {}", partner_id);
        let path = format!("/api/partner/landing/{}", segment(partner_id)?);
        self.send(Method::PUT, &path, Some(content)).await
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<ActionOutcome> {
        let url = self.config.endpoint(path);
        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, &url)
            .query(&[("key", self.key.as_str())]);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", path))?;

        let status = response.status();
        if !status.is_success() {
            // error pages are not always JSON
            let outcome: ActionOutcome = response.json().await.unwrap_or_default();
            let reason = outcome
                .error
                .unwrap_or_else(|| format!("status {}", status));
            warn!("Fleet request to {} failed: {}", path, reason);
            anyhow::bail!("Fleet request failed: {}", reason);
        }

        let outcome: ActionOutcome = response
            .json()
            .await
            .with_context(|| format!("Failed to decode response from {}", path))?;

        if !outcome.success {
            let reason = outcome
                .error
                .clone()
                .unwrap_or_else(|| "server reported failure".to_string());
            warn!("Fleet request to {} failed: {}", path, reason);
            anyhow::bail!("Fleet request failed: {}", reason);
        }

        Ok(outcome)
    }
}

/// Ids are used as path segments, so they must not smuggle a path in.
/// Only unreserved URL characters are allowed, and dot segments are refused.
fn segment(id: &str) -> Result<&str> {
    let id = id.trim();
    let unreserved = id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'));
    if id.is_empty() || !unreserved || id.chars().all(|c| c == '.') {
        anyhow::bail!("Invalid id: {:?}", id);
    }
    Ok(id)
}

fn host_path(host_id: &str, action: &str) -> Result<String> {
    Ok(format!("/fleet/api/hosts/{}/banking/{}", segment(host_id)?, action))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_path_rejects_path_tricks() {
        assert_eq!(
            host_path(" h-17 ", "hold").unwrap(),
            "/fleet/api/hosts/h-17/banking/hold"
        );
        assert!(host_path("../admin", "hold").is_err());
        assert!(host_path("", "payout").is_err());
        assert!(segment("a?key=x").is_err());
    }

    #[test]
    fn test_dot_segments_are_rejected() {
        assert!(host_path("..", "payout").is_err());
        assert!(host_path(".", "payout").is_err());
        assert!(host_path("%2e%2e", "payout").is_err());
        assert!(segment("a\\b").is_err());
        assert_eq!(segment("v1.host_9~a").unwrap(), "v1.host_9~a");
    }

    #[test]
    fn test_client_requires_key() {
        let err = FleetClient::new(&Config::default()).err().unwrap();
        assert!(err.to_string().contains("FLEET_API_KEY"));
    }
}
