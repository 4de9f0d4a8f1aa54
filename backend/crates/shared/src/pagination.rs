//! Pagination
//!
//! `page` / `limit` query parameters are parsed leniently: missing, unparsable
//! or zero values fall back to the defaults, and `limit` is clamped to
//! [`MAX_LIMIT`]. Parsing never fails.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Raw query parameters
///
/// Kept as strings so a bad value cannot reject the whole query; use
/// `#[serde(flatten)]` to embed it into endpoint-specific query structs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

impl PageQuery {
    pub fn to_request(&self) -> PageRequest {
        self.to_request_with(DEFAULT_LIMIT, MAX_LIMIT)
    }

    pub fn to_request_with(&self, default_limit: u32, max_limit: u32) -> PageRequest {
        let page = parse_positive(self.page.as_deref()).unwrap_or(DEFAULT_PAGE);
        let limit = parse_positive(self.limit.as_deref())
            .unwrap_or(default_limit)
            .min(max_limit);
        PageRequest::new(page, limit)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|v| *v > 0)
}

/// Validated page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Both values are forced to at least 1.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Rows to skip: `(page - 1) * limit`
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }

    /// `limit` as the `i64` SQL binds expect
    pub fn sql_limit(&self) -> i64 {
        i64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

/// `pagination` block of the envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        Self {
            page: request.page,
            limit: request.limit,
            total,
            pages: total.div_ceil(u64::from(request.limit)),
        }
    }
}

/// One page of items plus its pagination block
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            pagination: Pagination::new(request, total),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>, limit: Option<&str>) -> PageQuery {
        PageQuery {
            page: page.map(String::from),
            limit: limit.map(String::from),
        }
    }

    #[test]
    fn test_defaults() {
        let req = query(None, None).to_request();
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), 10);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_lenient_parsing() {
        assert_eq!(query(Some("abc"), Some("-3")).to_request(), PageRequest::new(1, 10));
        assert_eq!(query(Some("0"), Some("0")).to_request(), PageRequest::new(1, 10));
        assert_eq!(query(Some(" 3 "), Some("20")).to_request(), PageRequest::new(3, 20));
    }

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(query(None, Some("5000")).to_request().limit(), MAX_LIMIT);
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
    }

    #[test]
    fn test_pages_is_ceiling() {
        let req = PageRequest::new(1, 10);
        assert_eq!(Pagination::new(req, 0).pages, 0);
        assert_eq!(Pagination::new(req, 1).pages, 1);
        assert_eq!(Pagination::new(req, 10).pages, 1);
        assert_eq!(Pagination::new(req, 11).pages, 2);
        assert_eq!(Pagination::new(req, 95).pages, 10);
    }

    #[test]
    fn test_page_map() {
        let page = Page::new(vec![1, 2], PageRequest::new(1, 2), 4).map(|v| v * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.pagination.pages, 2);
    }
}
