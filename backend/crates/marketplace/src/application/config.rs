//! Application Configuration

use kernel::pagination::{DEFAULT_LIMIT, MAX_LIMIT, PageQuery, PageRequest};

/// Latest approved reviews embedded in a service detail
pub const DEFAULT_REVIEW_EXCERPT_COUNT: u32 = 5;

#[derive(Debug, Clone)]
pub struct MarketConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub review_excerpt_count: u32,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_LIMIT,
            max_page_size: MAX_LIMIT,
            review_excerpt_count: DEFAULT_REVIEW_EXCERPT_COUNT,
        }
    }
}

impl MarketConfig {
    /// Lenient page parsing with this config's limits
    pub fn page(&self, query: &PageQuery) -> PageRequest {
        query.to_request_with(self.default_page_size, self.max_page_size)
    }
}
