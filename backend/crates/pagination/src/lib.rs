//! Page-number pagination primitives shared by list endpoints.
//!
//! Endpoints parse the raw `page` and `page_size` query parameters into a
//! [`PageRequest`], ask their backing store for the total row count and the
//! requested window, then wrap the window in a [`Page`] envelope:
//!
//! ```json
//! {"count": 42, "next": "https://host/rides/?page=3", "previous": "https://host/rides/", "results": []}
//! ```
//!
//! The envelope links preserve every other query parameter so filters survive
//! navigation between pages.

use serde::Serialize;
use url::Url;

/// Query parameter carrying the 1-based page number.
pub const PAGE_PARAM: &str = "page";
/// Query parameter carrying the caller-requested page size.
pub const PAGE_SIZE_PARAM: &str = "page_size";
/// Page size applied when the caller does not request one.
pub const DEFAULT_PAGE_SIZE: usize = 10;
/// Largest page size a caller may request; larger values are clamped.
pub const MAX_PAGE_SIZE: usize = 50;

/// Errors raised while resolving a page request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// The requested page is not a positive integer or lies past the end of
    /// the result set.
    #[error("Invalid page.")]
    InvalidPage,
}

/// Validated window into an ordered result set.
///
/// ## Invariants
/// - `page` is at least 1.
/// - `page_size` lies within `1..=MAX_PAGE_SIZE`.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::from_query(Some("3"), Some("20")).unwrap();
/// assert_eq!(request.offset(), 40);
/// assert_eq!(request.limit(), 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    page_size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a request from already-parsed values.
    ///
    /// # Errors
    /// Returns [`PaginationError::InvalidPage`] when `page` is zero.
    pub fn new(page: usize, page_size: usize) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::InvalidPage);
        }
        Ok(Self {
            page,
            page_size: clamp_page_size(page_size),
        })
    }

    /// Parse raw query parameter values.
    ///
    /// A missing page means the first page. An unparseable or non-positive
    /// page size falls back to [`DEFAULT_PAGE_SIZE`]; oversized values clamp
    /// to [`MAX_PAGE_SIZE`].
    ///
    /// # Errors
    /// Returns [`PaginationError::InvalidPage`] when the page is not a
    /// positive integer.
    pub fn from_query(page: Option<&str>, page_size: Option<&str>) -> Result<Self, PaginationError> {
        let page_number = match page.map(str::trim).filter(|raw| !raw.is_empty()) {
            None => 1,
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| PaginationError::InvalidPage)?,
        };
        let size = page_size
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Self::new(page_number, size)
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    /// Number of rows per page.
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of rows skipped before this page.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Maximum number of rows on this page.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.page_size
    }

    /// Number of pages needed for `count` rows. An empty result set still
    /// has one (empty) page.
    #[must_use]
    pub const fn page_count(&self, count: usize) -> usize {
        if count == 0 {
            1
        } else {
            count.div_ceil(self.page_size)
        }
    }

    /// Check the page lies within a result set of `count` rows.
    ///
    /// # Errors
    /// Returns [`PaginationError::InvalidPage`] for pages past the end.
    pub const fn ensure_within(&self, count: usize) -> Result<(), PaginationError> {
        if self.page > self.page_count(count) {
            Err(PaginationError::InvalidPage)
        } else {
            Ok(())
        }
    }

    const fn has_next(&self, count: usize) -> bool {
        self.page < self.page_count(count)
    }
}

fn clamp_page_size(page_size: usize) -> usize {
    page_size.clamp(1, MAX_PAGE_SIZE)
}

/// Paginated response envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// Total number of rows across all pages.
    pub count: usize,
    /// Absolute link to the following page, when one exists.
    pub next: Option<String>,
    /// Absolute link to the preceding page, when one exists.
    pub previous: Option<String>,
    /// Rows on this page.
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Wrap a window of results, deriving navigation links from the URL of
    /// the current request.
    ///
    /// # Examples
    /// ```
    /// use pagination::{Page, PageRequest};
    /// use url::Url;
    ///
    /// let url = Url::parse("http://localhost/rides/?status=init&page=2").unwrap();
    /// let request = PageRequest::from_query(Some("2"), None).unwrap();
    /// let page = Page::new(&request, 25, vec![1, 2, 3], &url);
    /// assert_eq!(page.next.as_deref(), Some("http://localhost/rides/?status=init&page=3"));
    /// assert_eq!(page.previous.as_deref(), Some("http://localhost/rides/?status=init"));
    /// ```
    #[must_use]
    pub fn new(request: &PageRequest, count: usize, results: Vec<T>, current: &Url) -> Self {
        let next = request
            .has_next(count)
            .then(|| page_link(current, Some(request.page().saturating_add(1))));
        let previous = (request.page() > 1).then(|| {
            let target = request.page().saturating_sub(1);
            page_link(current, (target > 1).then_some(target))
        });
        Self {
            count,
            next,
            previous,
            results,
        }
    }

    /// Transform every row while keeping the envelope metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

fn page_link(current: &Url, page: Option<usize>) -> String {
    let retained: Vec<(String, String)> = current
        .query_pairs()
        .filter(|(key, _)| key != PAGE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut link = current.clone();
    link.set_query(None);
    if !retained.is_empty() || page.is_some() {
        let mut pairs = link.query_pairs_mut();
        for (key, value) in &retained {
            pairs.append_pair(key, value);
        }
        if let Some(number) = page {
            pairs.append_pair(PAGE_PARAM, &number.to_string());
        }
    }
    link.into()
}

#[cfg(test)]
mod tests {
    //! Coverage for page parsing, bounds and link construction.
    use super::*;
    use rstest::rstest;

    fn url(raw: &str) -> Url {
        Url::parse(raw).expect("valid test url")
    }

    #[rstest]
    #[case(None, None, 1, DEFAULT_PAGE_SIZE)]
    #[case(Some("2"), None, 2, DEFAULT_PAGE_SIZE)]
    #[case(Some(""), Some("25"), 1, 25)]
    #[case(Some("1"), Some("500"), 1, MAX_PAGE_SIZE)]
    #[case(Some("1"), Some("abc"), 1, DEFAULT_PAGE_SIZE)]
    #[case(Some("1"), Some("0"), 1, DEFAULT_PAGE_SIZE)]
    fn parses_query_values(
        #[case] page: Option<&str>,
        #[case] page_size: Option<&str>,
        #[case] expected_page: usize,
        #[case] expected_size: usize,
    ) {
        let request = PageRequest::from_query(page, page_size).expect("valid request");
        assert_eq!(request.page(), expected_page);
        assert_eq!(request.page_size(), expected_size);
    }

    #[rstest]
    #[case("0")]
    #[case("-1")]
    #[case("last")]
    fn rejects_invalid_page_numbers(#[case] page: &str) {
        let err = PageRequest::from_query(Some(page), None).expect_err("invalid page");
        assert_eq!(err, PaginationError::InvalidPage);
        assert_eq!(err.to_string(), "Invalid page.");
    }

    #[rstest]
    #[case(1, 0, true)]
    #[case(2, 0, false)]
    #[case(3, 25, true)]
    #[case(4, 25, false)]
    fn checks_page_bounds(#[case] page: usize, #[case] count: usize, #[case] ok: bool) {
        let request = PageRequest::new(page, 10).expect("valid request");
        assert_eq!(request.ensure_within(count).is_ok(), ok);
    }

    #[rstest]
    fn first_page_links_forward_only() {
        let request = PageRequest::default();
        let page = Page::new(&request, 11, vec!['a'], &url("http://h/users/"));
        assert_eq!(page.next.as_deref(), Some("http://h/users/?page=2"));
        assert!(page.previous.is_none());
    }

    #[rstest]
    fn last_page_links_backward_only() {
        let request = PageRequest::new(3, 5).expect("valid request");
        let page = Page::new(
            &request,
            15,
            vec!['a'],
            &url("http://h/rides/?page=3&page_size=5&sort_by=distance"),
        );
        assert!(page.next.is_none());
        assert_eq!(
            page.previous.as_deref(),
            Some("http://h/rides/?page_size=5&sort_by=distance&page=2")
        );
    }

    #[rstest]
    fn map_preserves_metadata() {
        let request = PageRequest::new(2, 1).expect("valid request");
        let page = Page::new(&request, 3, vec![2], &url("http://h/x/?page=2")).map(|n| n * 10);
        assert_eq!(page.results, vec![20]);
        assert_eq!(page.count, 3);
        assert_eq!(page.previous.as_deref(), Some("http://h/x/"));
    }

    #[rstest]
    fn envelope_serialises_drf_shape() {
        let page = Page::new(&PageRequest::default(), 0, Vec::<u8>::new(), &url("http://h/"));
        let json = serde_json::to_value(&page).expect("serialise");
        assert_eq!(
            json,
            serde_json::json!({"count": 0, "next": null, "previous": null, "results": []})
        );
    }
}
