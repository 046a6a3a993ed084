//! Page-number pagination envelope `{count, next, previous, results}`.

use axum::http::Uri;
use foodgram_core::error::DomainError;
use foodgram_core::pagination::{Page, PageRequest};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ApiError;
use crate::state::ApiSettings;

/// `page` and `limit` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageParams {
    /// Resolves the request, falling back to the configured page size.
    #[must_use]
    pub fn request(self, settings: &ApiSettings) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(1),
            self.limit.unwrap_or(settings.page_size),
        )
    }
}

/// A paginated response body.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Wraps `page`, linking neighbours relative to the request `uri`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` when the page lies past the last one.
    pub fn from_page(page: Page<T>, public_url: &str, uri: &Uri) -> Result<Self, ApiError> {
        if page.is_out_of_range() {
            return Err(DomainError::not_found("page", i64::from(page.request.page)).into());
        }
        let current = page.request.page;
        let next = page
            .has_next()
            .then(|| page_link(public_url, uri, current + 1))
            .flatten();
        let previous = page
            .has_previous()
            .then(|| page_link(public_url, uri, current - 1))
            .flatten();
        Ok(Self {
            count: page.total,
            next,
            previous,
            results: page.items,
        })
    }
}

/// Absolute URL of `page`, keeping every other query parameter. The first
/// page carries no `page` parameter.
fn page_link(public_url: &str, uri: &Uri, page: u32) -> Option<String> {
    let mut url = Url::parse(&format!("{public_url}{}", uri.path())).ok()?;
    let kept: Vec<(String, String)> =
        url::form_urlencoded::parse(uri.query().unwrap_or_default().as_bytes())
            .into_owned()
            .filter(|(key, _)| key != "page")
            .collect();
    if kept.is_empty() && page <= 1 {
        return Some(url.into());
    }
    {
        let mut pairs = url.query_pairs_mut();
        pairs.extend_pairs(&kept);
        if page > 1 {
            pairs.append_pair("page", &page.to_string());
        }
    }
    Some(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://testserver";

    fn page(items: Vec<i32>, total: i64, page: u32, limit: u32) -> Page<i32> {
        Page::new(items, total, PageRequest::new(page, limit))
    }

    #[test]
    fn test_middle_page_links_both_neighbours() {
        // Arrange
        let uri: Uri = "/api/recipes/?tags=lunch&page=2&limit=2".parse().unwrap();

        // Act
        let body = Paginated::from_page(page(vec![3, 4], 6, 2, 2), BASE, &uri).unwrap();

        // Assert
        assert_eq!(body.count, 6);
        assert_eq!(
            body.next.as_deref(),
            Some("http://testserver/api/recipes/?tags=lunch&limit=2&page=3")
        );
        assert_eq!(
            body.previous.as_deref(),
            Some("http://testserver/api/recipes/?tags=lunch&limit=2")
        );
    }

    #[test]
    fn test_single_page_has_no_links() {
        let uri: Uri = "/api/users/".parse().unwrap();

        let body = Paginated::from_page(page(vec![1], 1, 1, 6), BASE, &uri).unwrap();

        assert!(body.next.is_none());
        assert!(body.previous.is_none());
        assert_eq!(body.results, vec![1]);
    }

    #[test]
    fn test_previous_of_second_page_drops_page_parameter() {
        let uri: Uri = "/api/users/?page=2".parse().unwrap();

        let body = Paginated::from_page(page(vec![7], 7, 2, 6), BASE, &uri).unwrap();

        assert_eq!(body.previous.as_deref(), Some("http://testserver/api/users/"));
    }

    #[test]
    fn test_page_past_the_end_is_not_found() {
        let uri: Uri = "/api/users/?page=9".parse().unwrap();

        let result = Paginated::from_page(page(vec![], 3, 9, 6), BASE, &uri);

        assert!(matches!(
            result,
            Err(ApiError(DomainError::NotFound { entity: "page", id: 9 }))
        ));
    }

    #[test]
    fn test_params_fall_back_to_configured_page_size() {
        let settings = ApiSettings {
            public_url: BASE.to_owned(),
            page_size: 6,
            recipes_limit: 3,
        };

        let request = PageParams::default().request(&settings);
        let capped = PageParams {
            page: Some(2),
            limit: Some(1000),
        }
        .request(&settings);

        assert_eq!(request, PageRequest::new(1, 6));
        assert_eq!(capped.limit, 100);
        assert_eq!(capped.page, 2);
    }
}
