//! Request filter chains
//!
//! Filters guard every dispatched route. Front filters see only the request
//! head and run before any body work; request filters run after binding and
//! also receive the decoded body. Each chain runs in registration order and
//! the first failure aborts the request, skipping the remaining filters and
//! the handler. Filter failures are ordinary `anyhow` errors, so sentinel
//! values registered in the error-code registry resolve the same way handler
//! failures do.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::context::RequestContext;

/// Filter invoked before body binding
///
/// Implemented for any async closure or `async fn` taking a
/// [`RequestContext`] and returning `anyhow::Result<()>`.
///
/// # Example
///
/// ```rust
/// use axum_relay::context::RequestContext;
///
/// async fn require_client_id(ctx: RequestContext) -> anyhow::Result<()> {
///     if ctx.header("x-client-id").is_none() {
///         anyhow::bail!("missing client id");
///     }
///     Ok(())
/// }
/// ```
pub trait FrontFilter: Send + Sync + 'static {
    /// Inspect the request head, rejecting the request on error
    fn check<'a>(&'a self, ctx: &'a RequestContext) -> BoxFuture<'a, anyhow::Result<()>>;
}

impl<F, Fut> FrontFilter for F
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn check<'a>(&'a self, ctx: &'a RequestContext) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin((self)(ctx.clone()))
    }
}

/// Filter invoked after body binding
///
/// Receives the decoded body as loosely-typed JSON. Routes without a body
/// still run request filters, with [`Value::Null`] in place of the body.
pub trait RequestFilter: Send + Sync + 'static {
    /// Inspect the request and its decoded body, rejecting the request on error
    fn check<'a>(
        &'a self,
        ctx: &'a RequestContext,
        body: &'a Value,
    ) -> BoxFuture<'a, anyhow::Result<()>>;
}

impl<F, Fut> RequestFilter for F
where
    F: Fn(RequestContext, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn check<'a>(
        &'a self,
        ctx: &'a RequestContext,
        body: &'a Value,
    ) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin((self)(ctx.clone(), body.clone()))
    }
}

pub(crate) async fn run_front_filters(
    filters: &[Arc<dyn FrontFilter>],
    ctx: &RequestContext,
) -> anyhow::Result<()> {
    for filter in filters {
        filter.check(ctx).await?;
    }
    Ok(())
}

pub(crate) async fn run_request_filters(
    filters: &[Arc<dyn RequestFilter>],
    ctx: &RequestContext,
    body: &Value,
) -> anyhow::Result<()> {
    for filter in filters {
        filter.check(ctx, body).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, Method};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ctx() -> RequestContext {
        RequestContext::new(Method::GET, "/things".parse().unwrap(), HeaderMap::new())
    }

    async fn reject(_ctx: RequestContext) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("blocked"))
    }

    #[tokio::test]
    async fn test_empty_chains_pass() {
        run_front_filters(&[], &ctx()).await.unwrap();
        run_request_filters(&[], &ctx(), &Value::Null).await.unwrap();
    }

    #[tokio::test]
    async fn test_front_filter_failure_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));

        let before = calls.clone();
        let first = move |_ctx: RequestContext| {
            let before = before.clone();
            async move {
                before.fetch_add(1, Ordering::SeqCst);
                anyhow::Ok(())
            }
        };

        let after = calls.clone();
        let third = move |_ctx: RequestContext| {
            let after = after.clone();
            async move {
                after.fetch_add(10, Ordering::SeqCst);
                anyhow::Ok(())
            }
        };

        let filters: Vec<Arc<dyn FrontFilter>> =
            vec![Arc::new(first), Arc::new(reject), Arc::new(third)];
        let err = run_front_filters(&filters, &ctx()).await.unwrap_err();

        assert_eq!(err.to_string(), "blocked");
        // The filter behind the failing one never ran
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_request_filter_sees_body() {
        let check = |_ctx: RequestContext, body: Value| async move {
            if body["name"] == "gadget" {
                anyhow::Ok(())
            } else {
                Err(anyhow::anyhow!("unexpected body"))
            }
        };
        let filters: Vec<Arc<dyn RequestFilter>> = vec![Arc::new(check)];

        let payload = serde_json::json!({"name": "gadget"});
        run_request_filters(&filters, &ctx(), &payload).await.unwrap();

        let other = serde_json::json!({"name": "sprocket"});
        let err = run_request_filters(&filters, &ctx(), &other)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "unexpected body");
    }

    #[tokio::test]
    async fn test_front_filter_reads_context() {
        let check = |ctx: RequestContext| async move {
            if ctx.header("x-client-id").is_none() {
                return Err(anyhow::anyhow!("missing client id"));
            }
            Ok(())
        };
        let filters: Vec<Arc<dyn FrontFilter>> = vec![Arc::new(check)];

        let err = run_front_filters(&filters, &ctx()).await.unwrap_err();
        assert_eq!(err.to_string(), "missing client id");

        let mut headers = HeaderMap::new();
        headers.insert("x-client-id", "console".parse().unwrap());
        let allowed = RequestContext::new(Method::GET, "/things".parse().unwrap(), headers);
        run_front_filters(&filters, &allowed).await.unwrap();
    }
}
