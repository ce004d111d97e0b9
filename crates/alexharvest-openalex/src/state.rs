//! Cursor crawl state for one paginated query

/// Cursor value that requests the first page
pub const INITIAL_CURSOR: &str = "*";

/// How the next page is addressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    /// Base query plus `cursor=<value>`
    Cursor(String),
    /// Fully formed URL handed back by the API
    Url(String),
}

/// Why a crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoneReason {
    /// Upstream reported no further page
    Exhausted,
    /// A page could not be fetched; later pages are abandoned
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlState {
    Fetching(PageRequest),
    Done(DoneReason),
}

impl CrawlState {
    pub fn initial() -> Self {
        Self::Fetching(PageRequest::Cursor(INITIAL_CURSOR.to_string()))
    }

    /// Transition after a page was fetched.
    ///
    /// A next-page URL wins over a cursor; neither means the query is exhausted.
    pub fn advance(next_url: Option<&str>, next_cursor: Option<&str>) -> Self {
        match (next_url, next_cursor) {
            (Some(url), _) => Self::Fetching(PageRequest::Url(url.to_string())),
            (None, Some(cursor)) => Self::Fetching(PageRequest::Cursor(cursor.to_string())),
            (None, None) => Self::Done(DoneReason::Exhausted),
        }
    }
}
