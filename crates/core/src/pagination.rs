//! Page-number pagination for list endpoints.
//!
//! Requests carry a 1-based `page` and an optional `limit`. Responses are
//! wrapped in [`Page`] with absolute links to the neighbouring pages.

use serde::{Deserialize, Serialize};

/// Page size used when `limit` is absent or unusable.
pub const DEFAULT_PAGE_SIZE: u32 = 6;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PaginationError {
    #[error("invalid page")]
    InvalidPage,
}

/// A requested page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Parse `page` and `limit` out of query pairs, ignoring other keys.
    ///
    /// A missing `page` means the first page. A `limit` that is missing,
    /// non-numeric or zero falls back to [`DEFAULT_PAGE_SIZE`]; larger
    /// values are capped at [`MAX_PAGE_SIZE`].
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::InvalidPage`] for a `page` that is not a
    /// positive integer.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, PaginationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut request = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref().trim();
            match key.as_ref() {
                "page" if !value.is_empty() => {
                    request.page = match value.parse::<u32>() {
                        Ok(page) if page >= 1 => page,
                        _ => return Err(PaginationError::InvalidPage),
                    };
                }
                "limit" => {
                    request.size = match value.parse::<u32>() {
                        Ok(0) | Err(_) => DEFAULT_PAGE_SIZE,
                        Ok(size) => size.min(MAX_PAGE_SIZE),
                    };
                }
                _ => {}
            }
        }
        Ok(request)
    }

    /// Rows to skip.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.size)
    }

    /// Rows to fetch.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    /// Reject pages past the end. The first page is always valid, even for
    /// an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::InvalidPage`] when `page` exceeds the
    /// number of pages for `count` rows.
    pub fn check_in_range(&self, count: i64) -> Result<(), PaginationError> {
        if self.page == 1 || self.offset() < count {
            Ok(())
        } else {
            Err(PaginationError::InvalidPage)
        }
    }

    fn has_next(&self, count: i64) -> bool {
        self.offset() + self.limit() < count
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Wrap `results`; `link` turns a page number into an absolute URL.
    pub fn new(
        request: PageRequest,
        count: i64,
        results: Vec<T>,
        link: impl Fn(u32) -> String,
    ) -> Self {
        let next = request.has_next(count).then(|| link(request.page + 1));
        let previous = (request.page > 1).then(|| link(request.page - 1));
        Self {
            count,
            next,
            previous,
            results,
        }
    }

    /// Transform the results, keeping counts and links.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn link(page: u32) -> String {
        format!("http://testserver/api/recipes?page={page}")
    }

    #[test]
    fn test_defaults() {
        let request = PageRequest::from_pairs(Vec::<(&str, &str)>::new()).unwrap();
        assert_eq!(request, PageRequest::default());
        assert_eq!(request.offset(), 0);
        assert_eq!(request.limit(), 6);
    }

    #[test]
    fn test_limit_fallbacks() {
        let bad = PageRequest::from_pairs([("limit", "lots")]).unwrap();
        assert_eq!(bad.size, DEFAULT_PAGE_SIZE);
        let zero = PageRequest::from_pairs([("limit", "0")]).unwrap();
        assert_eq!(zero.size, DEFAULT_PAGE_SIZE);
        let huge = PageRequest::from_pairs([("limit", "100000")]).unwrap();
        assert_eq!(huge.size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_invalid_page_number() {
        assert_eq!(
            PageRequest::from_pairs([("page", "0")]),
            Err(PaginationError::InvalidPage)
        );
        assert_eq!(
            PageRequest::from_pairs([("page", "last")]),
            Err(PaginationError::InvalidPage)
        );
    }

    #[test]
    fn test_out_of_range() {
        let request = PageRequest::from_pairs([("page", "3"), ("limit", "5")]).unwrap();
        assert_eq!(request.offset(), 10);
        assert!(request.check_in_range(11).is_ok());
        assert_eq!(request.check_in_range(10), Err(PaginationError::InvalidPage));
        assert!(PageRequest::default().check_in_range(0).is_ok());
    }

    #[test]
    fn test_links() {
        let middle = PageRequest { page: 2, size: 2 };
        let page = Page::new(middle, 5, vec![3, 4], link);
        assert_eq!(page.next.as_deref(), Some("http://testserver/api/recipes?page=3"));
        assert_eq!(
            page.previous.as_deref(),
            Some("http://testserver/api/recipes?page=1")
        );

        let last = PageRequest { page: 3, size: 2 };
        let page = Page::new(last, 5, vec![5], link);
        assert!(page.next.is_none());

        let only = Page::new(PageRequest::default(), 1, vec!["x"], link);
        assert!(only.next.is_none());
        assert!(only.previous.is_none());
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = Page::new(PageRequest { page: 1, size: 1 }, 2, vec![1], link).map(|n| n * 10);
        assert_eq!(page.results, vec![10]);
        assert_eq!(page.count, 2);
        assert!(page.next.is_some());
    }
}
