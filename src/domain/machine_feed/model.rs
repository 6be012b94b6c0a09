use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Discriminant of a feed record.
///
/// Upstreams are expected to send `repair` or `session`; any other tag is
/// carried through unchanged, and a missing tag becomes an empty `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Repair,
    Session,
    #[serde(untagged)]
    Other(String),
}

impl Default for FeedKind {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

/// A single repair or session record as returned by an upstream.
///
/// Absent fields decode to empty values; an empty timestamp sorts last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    #[serde(rename = "type", default)]
    pub kind: FeedKind,
    #[serde(default)]
    pub details: String,
    /// RFC3339 text, re-emitted exactly as received
    #[serde(default)]
    pub timestamp: String,
}

impl FeedItem {
    pub fn new(kind: FeedKind, details: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            kind,
            details: details.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Parsed timestamp used for ordering.
    ///
    /// `None` when the text is not valid RFC3339; `None` orders before every
    /// parsed instant, so such items land at the end of a newest-first feed.
    pub fn sort_key(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    #[error("Invalid page parameter")]
    InvalidPage,
    #[error("Invalid size parameter")]
    InvalidSize,
}

/// Validated pagination input; both values are at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    size: usize,
}

impl PageRequest {
    pub fn new(page: usize, size: usize) -> Result<Self, PageRequestError> {
        if page < 1 {
            return Err(PageRequestError::InvalidPage);
        }
        if size < 1 {
            return Err(PageRequestError::InvalidSize);
        }
        Ok(Self { page, size })
    }

    /// Parse raw query values, applying defaults for absent ones.
    ///
    /// A present but empty value is invalid, as is anything that is not a
    /// positive integer. The page is checked before the size.
    pub fn parse(page: Option<&str>, size: Option<&str>) -> Result<Self, PageRequestError> {
        let page = match page {
            Some(raw) => parse_positive(raw).ok_or(PageRequestError::InvalidPage)?,
            None => DEFAULT_PAGE,
        };
        let size = match size {
            Some(raw) => parse_positive(raw).ok_or(PageRequestError::InvalidSize)?,
            None => DEFAULT_PAGE_SIZE,
        };
        Self::new(page, size)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Index of the first item on this page. Saturates instead of overflowing,
    /// which still lands past the end of any real feed.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn parse_positive(raw: &str) -> Option<usize> {
    raw.parse::<usize>().ok().filter(|value| *value >= 1)
}

/// One page of a larger sequence plus the metadata describing the whole
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    #[serde(rename = "feeds")]
    pub items: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Response body for `GET /machine-feeds/:machineId`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub machine_id: String,
    pub machine_name: String,
    #[serde(flatten)]
    pub feed: Paginated<FeedItem>,
}

impl FeedPage {
    pub fn new(machine_id: String, machine_name: String, feed: Paginated<FeedItem>) -> Self {
        Self {
            machine_id,
            machine_name,
            feed,
        }
    }
}
