/// Defaults for the feed read API.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Page size used when a request omits `page_size`.
    pub default_page_size: i64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
        }
    }
}
