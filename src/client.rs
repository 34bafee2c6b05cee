use log::{debug, info};
use std::time::Duration;

use crate::config::ChannelConfig;
use crate::data_models::Feed;
use crate::errors::FetchError;
use crate::parsers::parse_feed;
use crate::retry::{retry_with_backoff, RetryConfig};

/// Read-only client for a ThingSpeak channel feed.
#[derive(Debug, Clone)]
pub struct ThingSpeakClient {
    http: reqwest::Client,
    base_url: String,
    channel_id: String,
    read_api_key: Option<String>,
}

impl ThingSpeakClient {
    pub fn new(config: &ChannelConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(FetchError::ClientBuild)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            channel_id: config.channel_id.clone(),
            read_api_key: config.read_api_key.clone(),
        })
    }

    pub fn feeds_url(&self) -> String {
        format!("{}/channels/{}/feeds.json", self.base_url, self.channel_id)
    }

    fn query(&self, results: usize) -> Vec<(&'static str, String)> {
        let mut query = vec![("results", results.to_string())];
        if let Some(key) = &self.read_api_key {
            query.push(("api_key", key.clone()));
        }
        query
    }

    /// Fetch the most recent `results` entries of the channel.
    pub async fn fetch_latest(&self, results: usize) -> Result<Feed, FetchError> {
        let url = self.feeds_url();
        debug!("Requesting {} entries from {}", results, url);

        let response = self
            .http
            .get(&url)
            .query(&self.query(results))
            .send()
            .await
            .map_err(|e| FetchError::Request {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status });
        }

        let body = response.text().await.map_err(|e| FetchError::Request {
            url: url.clone(),
            source: e,
        })?;
        let feed = parse_feed(&body).map_err(|e| FetchError::Decode {
            url: url.clone(),
            source: e,
        })?;

        info!("Fetched {} samples from channel {}", feed.samples.len(), self.channel_id);
        Ok(feed)
    }

    pub async fn fetch_with_retry(
        &self,
        results: usize,
        retry: &RetryConfig,
    ) -> Result<Feed, FetchError> {
        retry_with_backoff(
            retry,
            "fetch_feed",
            || self.fetch_latest(results),
            FetchError::is_transient,
        )
        .await
    }
}
