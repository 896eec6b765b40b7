//! Best-effort environmental headlines for the dashboard.
//!
//! Fetching may fail for many reasons (no key, network, bad payload). The
//! failure is kept as a [`NewsError`] right up to [`headlines`], which
//! collapses it into a fixed fallback item so the dashboard always renders.

use crate::config::NewsConfig;
use crate::error::NewsError;
use crate::NewsItem;
use serde::Deserialize;
use std::time::Duration;

/// Environment variable consulted when no key is configured
pub const API_KEY_ENV: &str = "NEWS_API_KEY";

/// Anything that can produce headlines
pub trait NewsSource {
    fn fetch(&self, limit: usize) -> std::result::Result<Vec<NewsItem>, NewsError>;
}

/// Fetch headlines, substituting a fallback item on any failure
pub fn headlines(source: &dyn NewsSource, limit: usize) -> Vec<NewsItem> {
    match source.fetch(limit) {
        Ok(mut items) => {
            items.truncate(limit);
            tracing::debug!("Fetched {} headlines", items.len());
            items
        }
        Err(e) => {
            tracing::warn!("News lookup failed: {}. Using fallback.", e);
            vec![fallback_for(&e)]
        }
    }
}

/// The item shown in place of real headlines for a given failure
pub fn fallback_for(err: &NewsError) -> NewsItem {
    match err {
        NewsError::MissingCredential => NewsItem::new("Sample news headline", "Local"),
        NewsError::Transport(_) | NewsError::Status(_) | NewsError::Payload(_) => {
            NewsItem::new("News fetch failed", "System")
        }
    }
}

/// Pick a source from configuration
pub fn source_from_config(config: &NewsConfig) -> Box<dyn NewsSource> {
    if !config.enabled {
        tracing::debug!("News disabled in config, using static headlines");
        return Box::new(StaticNewsSource::sample());
    }

    let api_key = config
        .api_key
        .clone()
        .or_else(|| std::env::var(API_KEY_ENV).ok())
        .filter(|k| !k.trim().is_empty());

    Box::new(NewsApiSource::new(config.clone(), api_key))
}

// ============================================================================
// Static source
// ============================================================================

/// Fixed headlines, used offline and in tests
#[derive(Clone, Debug, Default)]
pub struct StaticNewsSource {
    items: Vec<NewsItem>,
}

impl StaticNewsSource {
    pub fn new(items: Vec<NewsItem>) -> Self {
        Self { items }
    }

    /// The single sample headline shown when no key is configured
    pub fn sample() -> Self {
        Self::new(vec![fallback_for(&NewsError::MissingCredential)])
    }
}

impl NewsSource for StaticNewsSource {
    fn fetch(&self, limit: usize) -> std::result::Result<Vec<NewsItem>, NewsError> {
        Ok(self.items.iter().take(limit).cloned().collect())
    }
}

// ============================================================================
// NewsAPI source
// ============================================================================

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: String,
    source: ArticleSource,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticlesResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

/// Parse a NewsAPI `everything` response body
pub fn parse_articles(body: &str) -> std::result::Result<Vec<NewsItem>, NewsError> {
    let response: ArticlesResponse =
        serde_json::from_str(body).map_err(|e| NewsError::Payload(e.to_string()))?;

    Ok(response
        .articles
        .into_iter()
        .map(|a| NewsItem {
            title: a.title,
            source: a.source.name,
            url: a.url,
        })
        .collect())
}

/// Client for a NewsAPI-compatible endpoint
#[derive(Clone, Debug)]
pub struct NewsApiSource {
    config: NewsConfig,
    api_key: Option<String>,
}

impl NewsApiSource {
    pub fn new(config: NewsConfig, api_key: Option<String>) -> Self {
        Self { config, api_key }
    }
}

impl NewsSource for NewsApiSource {
    fn fetch(&self, limit: usize) -> std::result::Result<Vec<NewsItem>, NewsError> {
        let key = self.api_key.as_deref().ok_or(NewsError::MissingCredential)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .build()
            .map_err(|e| NewsError::Transport(format!("Failed to create client: {}", e)))?;

        let page_size = limit.to_string();
        tracing::info!("Fetching headlines from {}", self.config.endpoint);

        let response = client
            .get(&self.config.endpoint)
            .query(&[
                ("q", self.config.query.as_str()),
                ("language", self.config.language.as_str()),
                ("pageSize", page_size.as_str()),
                ("apiKey", key),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(NewsError::Status(status.as_u16()));
        }

        let body = response.text()?;
        parse_articles(&body)
    }
}
