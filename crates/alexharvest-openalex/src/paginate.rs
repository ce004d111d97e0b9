//! Cursor pagination driver shared by discovery and work collection

use alexharvest_core::{FetchError, FetchOutcome};

use crate::api::Page;
use crate::state::{CrawlState, DoneReason, PageRequest};

/// Outcome of one crawl
#[derive(Debug)]
pub struct CrawlReport {
    /// Pages fetched and handed to the page callback
    pub pages: u64,
    pub end: DoneReason,
    /// Error that stopped the crawl (when `end == Failed`)
    pub error: Option<FetchError>,
}

impl CrawlReport {
    pub fn completed(&self) -> bool {
        self.end == DoneReason::Exhausted
    }
}

/// URL and query parameters for `request`.
///
/// Cursor requests reuse `base_url` and `params` plus `cursor`; URL requests
/// are sent as given.
pub fn request_target<'a>(
    request: &PageRequest,
    base_url: &str,
    params: &[(&'a str, String)],
) -> (String, Vec<(&'a str, String)>) {
    match request {
        PageRequest::Cursor(cursor) => {
            let mut query = params.to_vec();
            query.push(("cursor", cursor.clone()));
            (base_url.to_string(), query)
        }
        PageRequest::Url(url) => (url.clone(), Vec::new()),
    }
}

/// Fetch pages until upstream runs out or a fetch fails.
///
/// `on_page` sees every successful page in order; its error aborts the crawl
/// and is returned as-is. A failed fetch ends the crawl with
/// [`DoneReason::Failed`] but keeps everything already handed out.
pub fn crawl<T, E>(
    mut fetch: impl FnMut(&PageRequest) -> FetchOutcome<Page<T>>,
    mut on_page: impl FnMut(Page<T>) -> Result<(), E>,
) -> Result<CrawlReport, E> {
    let mut state = CrawlState::initial();
    let mut pages = 0u64;
    let mut error = None;

    while let CrawlState::Fetching(request) = &state {
        match fetch(request) {
            FetchOutcome::Success(page) => {
                let next = CrawlState::advance(page.meta.next_url(), page.meta.next_cursor());
                pages += 1;
                on_page(page)?;
                state = next;
            }
            FetchOutcome::Retryable(e) | FetchOutcome::Terminal(e) => {
                error = Some(e);
                state = CrawlState::Done(DoneReason::Failed);
            }
        }
    }

    let end = match state {
        CrawlState::Done(reason) => reason,
        CrawlState::Fetching(_) => DoneReason::Exhausted,
    };
    Ok(CrawlReport { pages, end, error })
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::convert::Infallible;

    use super::*;
    use crate::api::PageMeta;

    fn page(ids: &[u32], next_cursor: Option<&str>) -> Page<u32> {
        Page {
            results: ids.to_vec(),
            meta: PageMeta {
                next_cursor: next_cursor.map(String::from),
                ..Default::default()
            },
        }
    }

    #[test]
    fn follows_cursors_until_exhausted() {
        let mut script = VecDeque::from([
            FetchOutcome::Success(page(&[1, 2], Some("c1"))),
            FetchOutcome::Success(page(&[3], Some("c2"))),
            FetchOutcome::Success(page(&[], None)),
        ]);
        let mut requests = Vec::new();
        let mut seen = Vec::new();

        let report = crawl(
            |req| {
                requests.push(req.clone());
                script.pop_front().unwrap()
            },
            |p| {
                seen.extend(p.results);
                Ok::<_, Infallible>(())
            },
        )
        .unwrap();

        assert_eq!(report.pages, 3);
        assert!(report.completed());
        assert_eq!(seen, [1, 2, 3]);
        assert_eq!(
            requests,
            [
                PageRequest::Cursor("*".into()),
                PageRequest::Cursor("c1".into()),
                PageRequest::Cursor("c2".into()),
            ]
        );
    }

    #[test]
    fn failure_keeps_earlier_pages() {
        let mut script = VecDeque::from([
            FetchOutcome::Success(page(&[1], Some("c1"))),
            FetchOutcome::Terminal(FetchError::Status {
                url: "u".into(),
                status: 500,
            }),
        ]);
        let mut seen = Vec::new();

        let report = crawl(
            |_| script.pop_front().unwrap(),
            |p| {
                seen.extend(p.results);
                Ok::<_, Infallible>(())
            },
        )
        .unwrap();

        assert_eq!(report.pages, 1);
        assert_eq!(report.end, DoneReason::Failed);
        assert_eq!(report.error.and_then(|e| e.status()), Some(500));
        assert_eq!(seen, [1]);
    }

    #[test]
    fn callback_error_aborts() {
        let result = crawl(
            |_| FetchOutcome::Success(page(&[1], Some("again"))),
            |_| Err("disk full"),
        );
        assert_eq!(result.unwrap_err(), "disk full");
    }

    #[test]
    fn request_target_variants() {
        let params = [("per_page", "200".to_string())];
        let (url, query) =
            request_target(&PageRequest::Cursor("*".into()), "http://api/works?filter=x", &params);
        assert_eq!(url, "http://api/works?filter=x");
        assert_eq!(
            query,
            [("per_page", "200".to_string()), ("cursor", "*".to_string())]
        );

        let next = PageRequest::Url("http://api/next".into());
        let (url, query) = request_target(&next, "ignored", &params);
        assert_eq!(url, "http://api/next");
        assert!(query.is_empty());
    }
}
