use log::{error, info, warn};
use std::time::{Duration, Instant};
use tokio::time::{interval, MissedTickBehavior};

use crate::client::ThingSpeakClient;
use crate::config::DashboardConfig;
use crate::dashboard::{build_snapshot, DashboardSnapshot};
use crate::data_models::Feed;
use crate::errors::FetchError;
use crate::poll_metrics::POLL_METRICS;
use crate::retry::{feed_retry_config, RetryConfig};
use crate::validation::validate_series;

/// Source of feed data for the polling loop.
#[allow(async_fn_in_trait)]
pub trait FeedSource {
    async fn fetch(&self, results: usize) -> Result<Feed, FetchError>;
}

/// Live channel access with retry on every poll.
pub struct RetryingClient {
    client: ThingSpeakClient,
    retry: RetryConfig,
}

impl RetryingClient {
    pub fn new(client: ThingSpeakClient) -> Self {
        Self {
            client,
            retry: feed_retry_config(),
        }
    }
}

impl FeedSource for RetryingClient {
    async fn fetch(&self, results: usize) -> Result<Feed, FetchError> {
        self.client.fetch_with_retry(results, &self.retry).await
    }
}

/// Fixed-interval refresh loop: fetch, rebuild the snapshot, hand it over.
pub struct Poller<S> {
    source: S,
    config: DashboardConfig,
    max_polls: Option<u64>,
    last_snapshot: Option<DashboardSnapshot>,
}

impl<S: FeedSource> Poller<S> {
    pub fn new(source: S, config: DashboardConfig) -> Self {
        Self {
            source,
            config,
            max_polls: None,
            last_snapshot: None,
        }
    }

    /// Stop after `max_polls` cycles instead of running until cancelled.
    pub fn with_max_polls(mut self, max_polls: Option<u64>) -> Self {
        self.max_polls = max_polls;
        self
    }

    pub fn last_snapshot(&self) -> Option<&DashboardSnapshot> {
        self.last_snapshot.as_ref()
    }

    /// One fetch + rebuild. A failed fetch keeps the previous snapshot.
    pub async fn poll_once(&mut self) -> Option<&DashboardSnapshot> {
        POLL_METRICS.lock().record_attempt();
        let started = Instant::now();

        match self.source.fetch(self.config.channel.results).await {
            Ok(feed) => {
                let violations = validate_series(&feed.samples, &self.config.layout);
                for violation in &violations {
                    warn!("Implausible reading: {}", violation);
                }

                let snapshot = build_snapshot(&feed, &self.config);
                {
                    let mut metrics = POLL_METRICS.lock();
                    metrics.record_success(feed.samples.len() as u64, started.elapsed());
                    metrics.record_range_violations(violations.len() as u64);
                }
                self.last_snapshot = Some(snapshot);
                self.last_snapshot.as_ref()
            }
            Err(e) => {
                POLL_METRICS.lock().record_failure(started.elapsed());
                error!("Error fetching channel {}: {}", self.config.channel.channel_id, e);
                None
            }
        }
    }

    /// Poll immediately, then every `poll_interval_secs`, calling `on_snapshot`
    /// after each successful refresh.
    pub async fn run<F>(&mut self, mut on_snapshot: F)
    where
        F: FnMut(&DashboardSnapshot),
    {
        let period = Duration::from_secs(self.config.channel.poll_interval_secs.max(1));
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            "Polling channel {} every {:?} ({} results per request)",
            self.config.channel.channel_id, period, self.config.channel.results
        );

        let mut polls = 0u64;
        loop {
            ticker.tick().await;
            if let Some(snapshot) = self.poll_once().await {
                on_snapshot(snapshot);
            }

            polls += 1;
            if self.max_polls.is_some_and(|max| polls >= max) {
                info!("Reached {} polls, stopping", polls);
                break;
            }
        }
    }
}
