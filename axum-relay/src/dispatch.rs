//! Typed handler dispatch
//!
//! [`Relay`] wraps plain async functions into axum-compatible route
//! handlers. Each wrapped request runs the front-filter chain, binds and
//! stashes the JSON body where the handler shape takes one, runs the
//! request-filter chain, parses the pagination window where the shape is
//! paginated, and finally turns the handler's `anyhow::Result` into a
//! response through the configured [`ResponseWriter`].
//!
//! Four shapes cover the argument combinations; the payload type `()`
//! gives the no-payload variant of each:
//!
//! | adapter | handler signature |
//! |---|---|
//! | [`Relay::handle`] | `async fn(RequestContext) -> anyhow::Result<T>` |
//! | [`Relay::handle_body`] | `async fn(RequestContext, B) -> anyhow::Result<T>` |
//! | [`Relay::paged`] | `async fn(RequestContext, PageQuery) -> anyhow::Result<Page<T>>` |
//! | [`Relay::paged_body`] | `async fn(RequestContext, B, PageQuery) -> anyhow::Result<Page<T>>` |
//!
//! # Example
//!
//! ```rust,no_run
//! use axum::{routing::get, Router};
//! use axum_relay::codes::ErrorCodes;
//! use axum_relay::context::RequestContext;
//! use axum_relay::dispatch::Relay;
//! use axum_relay::pagination::{Page, PageQuery};
//!
//! async fn list_widgets(_ctx: RequestContext, query: PageQuery) -> anyhow::Result<Page<String>> {
//!     let items = vec!["anvil".to_string(), "sprocket".to_string()];
//!     Ok(Page::new(items, 2))
//! }
//!
//! let relay = Relay::builder().error_codes(ErrorCodes::new()).build();
//! let app: Router = Router::new().route("/widgets", get(relay.paged(list_widgets)));
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Context as _;
use axum::extract::{FromRequest, Request};
use axum::response::Response;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::codes::ErrorCodes;
use crate::config::Config;
use crate::context::RequestContext;
use crate::filter::{run_front_filters, run_request_filters, FrontFilter, RequestFilter};
use crate::pagination::{Page, PageLimits, PageQuery, Pager};
use crate::response::{ResponseMode, ResponseWriter};

struct RelayInner {
    front_filters: Vec<Arc<dyn FrontFilter>>,
    request_filters: Vec<Arc<dyn RequestFilter>>,
    codes: ErrorCodes,
    writer: Arc<dyn ResponseWriter>,
    limits: PageLimits,
}

/// Shared dispatch pipeline for a group of routes
///
/// Fixed at construction and cheap to clone; one `Relay` typically serves
/// every route of a service, with variants built for route groups that
/// need different filters or codes.
#[derive(Clone)]
pub struct Relay {
    inner: Arc<RelayInner>,
}

impl std::fmt::Debug for Relay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relay")
            .field("front_filters", &self.inner.front_filters.len())
            .field("request_filters", &self.inner.request_filters.len())
            .field("codes", &self.inner.codes)
            .field("limits", &self.inner.limits)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Relay`]
///
/// Filters run in registration order. The writer defaults to the standard
/// envelope unless a mode or a custom writer is supplied.
#[derive(Default)]
pub struct RelayBuilder {
    front_filters: Vec<Arc<dyn FrontFilter>>,
    request_filters: Vec<Arc<dyn RequestFilter>>,
    codes: ErrorCodes,
    mode: ResponseMode,
    writer: Option<Arc<dyn ResponseWriter>>,
    limits: PageLimits,
}

impl RelayBuilder {
    /// Append a filter that runs before the body is touched
    #[must_use]
    pub fn front_filter(mut self, filter: impl FrontFilter) -> Self {
        self.front_filters.push(Arc::new(filter));
        self
    }

    /// Append a filter that inspects the bound request body
    #[must_use]
    pub fn request_filter(mut self, filter: impl RequestFilter) -> Self {
        self.request_filters.push(Arc::new(filter));
        self
    }

    /// Set the error-to-code registry
    #[must_use]
    pub fn error_codes(mut self, codes: ErrorCodes) -> Self {
        self.codes = codes;
        self
    }

    /// Select one of the built-in response shapes
    #[must_use]
    pub fn response_mode(mut self, mode: ResponseMode) -> Self {
        self.mode = mode;
        self
    }

    /// Install a custom response writer, overriding the mode
    #[must_use]
    pub fn response_writer(mut self, writer: impl ResponseWriter) -> Self {
        self.writer = Some(Arc::new(writer));
        self
    }

    /// Set the pagination window bounds
    #[must_use]
    pub fn page_limits(mut self, limits: PageLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Finish the builder
    #[must_use]
    pub fn build(self) -> Relay {
        let RelayBuilder {
            front_filters,
            request_filters,
            codes,
            mode,
            writer,
            limits,
        } = self;
        let writer = writer.unwrap_or_else(|| mode.writer());
        Relay {
            inner: Arc::new(RelayInner {
                front_filters,
                request_filters,
                codes,
                writer,
                limits,
            }),
        }
    }
}

impl Relay {
    /// Start a builder with the standard writer and stock page limits
    #[must_use]
    pub fn builder() -> RelayBuilder {
        RelayBuilder::default()
    }

    /// Start a builder seeded from the `[relay]` configuration section
    #[must_use]
    pub fn from_config(config: &Config) -> RelayBuilder {
        RelayBuilder::default()
            .response_mode(config.relay.response_mode)
            .page_limits(PageLimits {
                default_limit: config.relay.default_page_limit,
                max_limit: config.relay.max_page_limit,
            })
    }

    fn write_error(&self, ctx: &RequestContext, err: &anyhow::Error) -> Response {
        let code = self.inner.codes.resolve(err);
        self.inner.writer.write_error(ctx, err, code)
    }

    fn write_success<T: Serialize>(&self, ctx: &RequestContext, payload: &T) -> Response {
        match serde_json::to_value(payload) {
            Ok(Value::Null) => self.inner.writer.write_success(ctx, None),
            Ok(value) => self.inner.writer.write_success(ctx, Some(value)),
            Err(err) => {
                let err = anyhow::Error::new(err).context("serialize response payload");
                self.write_error(ctx, &err)
            }
        }
    }

    fn write_paginated<T: Serialize>(
        &self,
        ctx: &RequestContext,
        query: PageQuery,
        page: Page<T>,
    ) -> Response {
        let pager = Pager::new(query, page.items.len(), page.total);
        match serde_json::to_value(&page.items) {
            Ok(value) => self.inner.writer.write_paginated(ctx, value, &pager),
            Err(err) => {
                let err = anyhow::Error::new(err).context("serialize response payload");
                self.write_error(ctx, &err)
            }
        }
    }
}

/// Serialize the bound body once: the compact text goes into the context
/// for failure logging, the `Value` feeds the request filters.
fn stash_and_convert<B: Serialize>(ctx: &RequestContext, body: &B) -> anyhow::Result<Value> {
    let value = serde_json::to_value(body).context("serialize request body")?;
    ctx.stash_body(value.to_string());
    Ok(value)
}

impl Relay {
    /// Wrap a body-less handler
    pub fn handle<F, Fut, T>(
        &self,
        handler: F,
    ) -> impl Fn(Request) -> Pin<Box<dyn Future<Output = Response> + Send>>
           + Clone
           + Send
           + Sync
           + 'static
    where
        F: Fn(RequestContext) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Serialize + 'static,
    {
        let relay = self.clone();
        move |request: Request| {
            let relay = relay.clone();
            let handler = handler.clone();
            Box::pin(async move {
                let (parts, _body) = request.into_parts();
                let ctx = RequestContext::from_parts(&parts);

                if let Err(err) = run_front_filters(&relay.inner.front_filters, &ctx).await {
                    return relay.write_error(&ctx, &err);
                }
                if let Err(err) =
                    run_request_filters(&relay.inner.request_filters, &ctx, &Value::Null).await
                {
                    return relay.write_error(&ctx, &err);
                }

                match handler(ctx.clone()).await {
                    Ok(payload) => relay.write_success(&ctx, &payload),
                    Err(err) => relay.write_error(&ctx, &err),
                }
            })
        }
    }

    /// Wrap a handler that binds a JSON body
    pub fn handle_body<F, Fut, B, T>(
        &self,
        handler: F,
    ) -> impl Fn(Request) -> Pin<Box<dyn Future<Output = Response> + Send>>
           + Clone
           + Send
           + Sync
           + 'static
    where
        F: Fn(RequestContext, B) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        B: DeserializeOwned + Serialize + Send + 'static,
        T: Serialize + 'static,
    {
        let relay = self.clone();
        move |request: Request| {
            let relay = relay.clone();
            let handler = handler.clone();
            Box::pin(async move {
                let (parts, body) = request.into_parts();
                let ctx = RequestContext::from_parts(&parts);

                if let Err(err) = run_front_filters(&relay.inner.front_filters, &ctx).await {
                    return relay.write_error(&ctx, &err);
                }

                let request = Request::from_parts(parts, body);
                let bound = match Json::<B>::from_request(request, &()).await {
                    Ok(Json(body)) => body,
                    Err(err) => {
                        let err = anyhow::Error::new(err).context("bind request body");
                        return relay.write_error(&ctx, &err);
                    }
                };
                let value = match stash_and_convert(&ctx, &bound) {
                    Ok(value) => value,
                    Err(err) => return relay.write_error(&ctx, &err),
                };
                if let Err(err) =
                    run_request_filters(&relay.inner.request_filters, &ctx, &value).await
                {
                    return relay.write_error(&ctx, &err);
                }

                match handler(ctx.clone(), bound).await {
                    Ok(payload) => relay.write_success(&ctx, &payload),
                    Err(err) => relay.write_error(&ctx, &err),
                }
            })
        }
    }

    /// Wrap a paginated handler
    pub fn paged<F, Fut, T>(
        &self,
        handler: F,
    ) -> impl Fn(Request) -> Pin<Box<dyn Future<Output = Response> + Send>>
           + Clone
           + Send
           + Sync
           + 'static
    where
        F: Fn(RequestContext, PageQuery) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Page<T>>> + Send + 'static,
        T: Serialize + 'static,
    {
        let relay = self.clone();
        move |request: Request| {
            let relay = relay.clone();
            let handler = handler.clone();
            Box::pin(async move {
                let (parts, _body) = request.into_parts();
                let ctx = RequestContext::from_parts(&parts);

                if let Err(err) = run_front_filters(&relay.inner.front_filters, &ctx).await {
                    return relay.write_error(&ctx, &err);
                }
                if let Err(err) =
                    run_request_filters(&relay.inner.request_filters, &ctx, &Value::Null).await
                {
                    return relay.write_error(&ctx, &err);
                }

                let query = match PageQuery::from_uri_with(ctx.uri(), relay.inner.limits) {
                    Ok(query) => query,
                    Err(err) => {
                        let err = anyhow::Error::new(err);
                        return relay.write_error(&ctx, &err);
                    }
                };

                match handler(ctx.clone(), query).await {
                    Ok(page) => relay.write_paginated(&ctx, query, page),
                    Err(err) => relay.write_error(&ctx, &err),
                }
            })
        }
    }

    /// Wrap a paginated handler that also binds a JSON body
    pub fn paged_body<F, Fut, B, T>(
        &self,
        handler: F,
    ) -> impl Fn(Request) -> Pin<Box<dyn Future<Output = Response> + Send>>
           + Clone
           + Send
           + Sync
           + 'static
    where
        F: Fn(RequestContext, B, PageQuery) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Page<T>>> + Send + 'static,
        B: DeserializeOwned + Serialize + Send + 'static,
        T: Serialize + 'static,
    {
        let relay = self.clone();
        move |request: Request| {
            let relay = relay.clone();
            let handler = handler.clone();
            Box::pin(async move {
                let (parts, body) = request.into_parts();
                let ctx = RequestContext::from_parts(&parts);

                if let Err(err) = run_front_filters(&relay.inner.front_filters, &ctx).await {
                    return relay.write_error(&ctx, &err);
                }

                let request = Request::from_parts(parts, body);
                let bound = match Json::<B>::from_request(request, &()).await {
                    Ok(Json(body)) => body,
                    Err(err) => {
                        let err = anyhow::Error::new(err).context("bind request body");
                        return relay.write_error(&ctx, &err);
                    }
                };
                let value = match stash_and_convert(&ctx, &bound) {
                    Ok(value) => value,
                    Err(err) => return relay.write_error(&ctx, &err),
                };
                if let Err(err) =
                    run_request_filters(&relay.inner.request_filters, &ctx, &value).await
                {
                    return relay.write_error(&ctx, &err);
                }

                let query = match PageQuery::from_uri_with(ctx.uri(), relay.inner.limits) {
                    Ok(query) => query,
                    Err(err) => {
                        let err = anyhow::Error::new(err);
                        return relay.write_error(&ctx, &err);
                    }
                };

                match handler(ctx.clone(), bound, query).await {
                    Ok(page) => relay.write_paginated(&ctx, query, page),
                    Err(err) => relay.write_error(&ctx, &err),
                }
            })
        }
    }
}
