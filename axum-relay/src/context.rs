//! Per-request context handed to filters and handlers
//!
//! [`RequestContext`] is a read-only view of the request head plus a
//! write-once stash for the normalized body text. Cloning is cheap and every
//! clone observes the same stash, so the dispatcher, filters, and response
//! writers all see one consistent picture of the request.

use std::sync::{Arc, OnceLock};

use http::{HeaderMap, Method, Uri};

/// Read-only view of an in-flight request
///
/// # Example
///
/// ```rust
/// use axum_relay::context::RequestContext;
/// use http::{HeaderMap, Method};
///
/// let ctx = RequestContext::new(
///     Method::GET,
///     "/widgets?limit=5".parse().unwrap(),
///     HeaderMap::new(),
/// );
/// assert_eq!(ctx.path(), "/widgets");
/// assert_eq!(ctx.query(), Some("limit=5"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    inner: Arc<ContextInner>,
}

#[derive(Debug)]
struct ContextInner {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    raw_body: OnceLock<String>,
}

impl RequestContext {
    /// Build a context from request head parts
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                method,
                uri,
                headers,
                raw_body: OnceLock::new(),
            }),
        }
    }

    pub(crate) fn from_parts(parts: &http::request::Parts) -> Self {
        Self::new(
            parts.method.clone(),
            parts.uri.clone(),
            parts.headers.clone(),
        )
    }

    /// HTTP method of the request
    pub fn method(&self) -> &Method {
        &self.inner.method
    }

    /// Full request URI
    pub fn uri(&self) -> &Uri {
        &self.inner.uri
    }

    /// Request path without the query string
    pub fn path(&self) -> &str {
        self.inner.uri.path()
    }

    /// Raw query string, if any
    pub fn query(&self) -> Option<&str> {
        self.inner.uri.query()
    }

    /// Request headers
    pub fn headers(&self) -> &HeaderMap {
        &self.inner.headers
    }

    /// Look up a header value as a string
    ///
    /// Returns `None` when the header is absent or not valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Normalized JSON text of the request body, if one was bound
    ///
    /// The dispatcher re-serializes the bound body and stashes the text here
    /// so response writers can log exactly what the handler saw, not the
    /// bytes on the wire.
    pub fn raw_body(&self) -> Option<&str> {
        self.inner.raw_body.get().map(String::as_str)
    }

    /// Stash the normalized body text. The first write wins.
    pub(crate) fn stash_body(&self, body: String) {
        let _ = self.inner.raw_body.set(body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_context() -> RequestContext {
        let mut headers = HeaderMap::new();
        headers.insert("x-client-id", "console".parse().unwrap());
        RequestContext::new(
            Method::POST,
            "/v1/widgets?limit=5".parse().unwrap(),
            headers,
        )
    }

    #[test]
    fn test_accessors() {
        let ctx = sample_context();
        assert_eq!(ctx.method(), Method::POST);
        assert_eq!(ctx.path(), "/v1/widgets");
        assert_eq!(ctx.query(), Some("limit=5"));
        assert_eq!(ctx.header("x-client-id"), Some("console"));
        assert!(ctx.header("x-missing").is_none());
        assert_eq!(ctx.headers().len(), 1);
    }

    #[test]
    fn test_body_stash_first_write_wins() {
        let ctx = sample_context();
        assert!(ctx.raw_body().is_none());

        ctx.stash_body(r#"{"a":1}"#.to_string());
        ctx.stash_body(r#"{"a":2}"#.to_string());
        assert_eq!(ctx.raw_body(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn test_clones_share_stash() {
        let ctx = sample_context();
        let clone = ctx.clone();

        ctx.stash_body("{}".to_string());
        assert_eq!(clone.raw_body(), Some("{}"));
    }
}
