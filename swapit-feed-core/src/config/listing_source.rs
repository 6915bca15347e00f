use std::time::Duration;
use url::Url;

/// Where the authoritative listing store lives.
#[derive(Debug, Clone)]
pub struct ListingSourceConfig {
    /// Base URL; listings are fetched from `{base_url}listings/{id}`.
    pub base_url: Url,
    /// Upper bound on a single fetch.
    pub timeout: Duration,
}
