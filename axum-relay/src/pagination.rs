//! Offset pagination for list endpoints
//!
//! Follows the Confluence REST convention: a `start` item offset and a
//! `limit` window size in the query string, echoed back in the response
//! together with relative `next`/`prev` links.
//!
//! # Example
//!
//! ```rust
//! use axum_relay::pagination::{Page, PageQuery, Pager};
//!
//! let uri: http::Uri = "/widgets?start=10&limit=10".parse().unwrap();
//! let query = PageQuery::from_uri(&uri).unwrap();
//!
//! let page = Page::new(vec!["a", "b", "c"], 23);
//! let pager = Pager::new(query, page.len(), page.total);
//! assert!(!pager.has_next());
//! assert!(pager.has_prev());
//! assert_eq!(
//!     pager.links("/widgets").prev.as_deref(),
//!     Some("/widgets?limit=10&start=0"),
//! );
//! ```

use axum::extract::Query;
use http::Uri;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Start offset applied when the query string omits `start`
pub const DEFAULT_PAGE_START: u64 = 0;

/// Page size applied when the query string omits `limit`
pub const DEFAULT_PAGE_LIMIT: u64 = 10;

/// Ceiling silently applied to the `limit` query parameter
pub const MAX_PAGE_LIMIT: u64 = 1000;

/// Pagination query failures
///
/// Variants deliberately carry no source error: the field-naming message is
/// itself the root cause, which lets services register envelope codes
/// against these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageError {
    /// Query string could not be decoded at all
    #[error("parse pagination query")]
    InvalidQuery,
    /// `start` was present but not an unsigned integer
    #[error("parse pagination start")]
    InvalidStart,
    /// `limit` was present but not an unsigned integer
    #[error("parse pagination limit")]
    InvalidLimit,
}

/// Bounds applied while parsing the pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Page size used when `limit` is absent
    pub default_limit: u64,
    /// Ceiling silently applied to oversized `limit` values
    pub max_limit: u64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_LIMIT,
            max_limit: MAX_PAGE_LIMIT,
        }
    }
}

/// Pagination window decoded from the query string
///
/// `start` is an item offset, not a page number. The window is immutable
/// once parsed; handlers receive it by value and slice their result set
/// accordingly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    start: u64,
    limit: u64,
}

#[derive(Deserialize)]
struct RawPageQuery {
    start: Option<String>,
    limit: Option<String>,
}

impl PageQuery {
    /// Parse the pagination window from a request URI using the stock bounds
    pub fn from_uri(uri: &Uri) -> Result<Self, PageError> {
        Self::from_uri_with(uri, PageLimits::default())
    }

    /// Parse the pagination window from a request URI
    ///
    /// Absent parameters fall back to the configured defaults. A `limit`
    /// above the ceiling is clamped, not rejected; a non-numeric value in
    /// either field is an error naming that field. `start` has no upper
    /// bound. Unrelated query parameters are ignored; a query string the
    /// binding cannot decode at all, such as one with a duplicated `start`
    /// or `limit`, is [`PageError::InvalidQuery`].
    pub fn from_uri_with(uri: &Uri, limits: PageLimits) -> Result<Self, PageError> {
        let raw = Query::<RawPageQuery>::try_from_uri(uri)
            .map_err(|_| PageError::InvalidQuery)?
            .0;

        let start = match raw.start {
            Some(s) => s.parse::<u64>().map_err(|_| PageError::InvalidStart)?,
            None => DEFAULT_PAGE_START,
        };
        let limit = match raw.limit {
            Some(s) => s.parse::<u64>().map_err(|_| PageError::InvalidLimit)?,
            None => limits.default_limit,
        };

        Ok(Self {
            start,
            limit: limit.min(limits.max_limit),
        })
    }

    /// Item offset of the first entry in the window
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Maximum number of entries in the window
    pub fn limit(&self) -> u64 {
        self.limit
    }
}

/// Result of a pagination-shaped handler
///
/// Carries the items of the requested window and the total item count
/// across all pages. The total travels to the client for display only; it
/// never decides whether further pages exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items in the requested window
    pub items: Vec<T>,
    /// Total items across all pages
    pub total: u64,
}

impl<T> Page<T> {
    /// Create a page from the window's items and the overall count
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    /// Page with no items and no recorded total
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }

    /// Number of items in this window
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this window is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Pagination processor derived from a query and its result
///
/// `has_next` uses the full-window approximation: a window filled to
/// `limit` is presumed to have a successor. When the total divides evenly
/// by the page size this produces one trailing empty page. `has_prev` is
/// exact: any nonzero `start` has a predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    start: u64,
    limit: u64,
    total: u64,
    has_next: bool,
    has_prev: bool,
}

impl Pager {
    /// Derive the processor from the parsed query and the returned window
    ///
    /// `returned` is the number of items the handler actually produced for
    /// this window, `total` the overall count it reported.
    #[must_use]
    pub fn new(query: PageQuery, returned: usize, total: u64) -> Self {
        Self {
            start: query.start,
            limit: query.limit,
            total,
            has_next: returned as u64 == query.limit,
            has_prev: query.start != 0,
        }
    }

    /// Item offset of the window
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Window size
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Total items across all pages
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Whether a further window is presumed to exist
    pub fn has_next(&self) -> bool {
        self.has_next
    }

    /// Whether the window sits past the first item
    pub fn has_prev(&self) -> bool {
        self.has_prev
    }

    /// Build the relative navigation links for this window
    ///
    /// `base` is the request path without its query string. The `prev`
    /// offset saturates at zero so a window straddling the origin still
    /// links back to the first page.
    #[must_use]
    pub fn links(&self, base: &str) -> PageLinks {
        let next = self.has_next.then(|| {
            format!(
                "{}?limit={}&start={}",
                base,
                self.limit,
                self.start.saturating_add(self.limit)
            )
        });
        let prev = self.has_prev.then(|| {
            format!(
                "{}?limit={}&start={}",
                base,
                self.limit,
                self.start.saturating_sub(self.limit)
            )
        });
        PageLinks { next, prev }
    }
}

/// Relative navigation links for a window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    /// Link to the following window, when one is presumed to exist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// Link to the preceding window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}
