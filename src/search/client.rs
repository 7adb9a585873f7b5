use crate::config::Config;
use crate::search::traits::SearchBackend;
use crate::search::types::{SearchQuery, SearchResponse, SearchResultSet};
use crate::search::url_codec;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

pub const SEARCH_PATH: &str = "/api/rentals/search";

/// Search backend talking to `GET /api/rentals/search`
pub struct HttpSearchBackend {
    client: Client,
    endpoint: String,
}

impl HttpSearchBackend {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint(SEARCH_PATH),
        })
    }

    /// Full request URL for a query
    pub fn request_url(&self, query: &SearchQuery) -> String {
        let params = url_codec::encode_for_api(query);
        if params.is_empty() {
            self.endpoint.clone()
        } else {
            format!("{}?{}", self.endpoint, params)
        }
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResultSet> {
        let url = self.request_url(query);
        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to reach search endpoint")?;

        if !response.status().is_success() {
            warn!("Search endpoint returned status: {}", response.status());
            anyhow::bail!("Search request failed: {}", response.status());
        }

        let body: SearchResponse = response
            .json()
            .await
            .context("Failed to decode search response")?;

        if !body.success {
            let reason = body.error.unwrap_or_else(|| "unknown error".to_string());
            warn!("Search endpoint reported failure: {}", reason);
            anyhow::bail!("Search failed: {}", reason);
        }

        let results = SearchResultSet::from(body);
        info!(
            "Search for {:?} returned {} cars ({} in city, {} nearby)",
            query.location,
            results.total_count,
            results.cars_in_city.len(),
            results.nearby_cars.len()
        );
        Ok(results)
    }

    fn source_name(&self) -> &'static str {
        "rentals-api"
    }
}
