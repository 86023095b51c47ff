//! HTTP handlers, one module per resource.

pub mod example_suggestions;
pub mod examples;
pub mod health;
pub mod word_suggestions;

use axum::http::{HeaderMap, HeaderValue};

use nkowa_core::Window;

use crate::{CONTENT_RANGE, X_TOTAL_COUNT};

/// Pagination headers for a list response.
///
/// `Content-Range` is `{resource} {start}-{end}/{total}` with an inclusive
/// end; an empty page reports `start-start`.
pub(crate) fn list_headers(resource: &str, window: &Window, returned: usize, total: i64) -> HeaderMap {
    let start = window.skip;
    let end = start + (returned as i64 - 1).max(0);
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&format!("{} {}-{}/{}", resource, start, end, total)) {
        headers.insert(CONTENT_RANGE, value);
    }
    headers.insert(X_TOTAL_COUNT, HeaderValue::from(total));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_headers() {
        let headers = list_headers("wordSuggestions", &Window { skip: 10, limit: 10 }, 5, 15);
        assert_eq!(headers[CONTENT_RANGE], "wordSuggestions 10-14/15");
        assert_eq!(headers[X_TOTAL_COUNT], "15");
    }

    #[test]
    fn test_list_headers_empty_page() {
        let headers = list_headers("exampleSuggestions", &Window::default(), 0, 0);
        assert_eq!(headers[CONTENT_RANGE], "exampleSuggestions 0-0/0");
    }
}
