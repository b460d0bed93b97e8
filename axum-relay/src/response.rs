//! Response envelope and writers
//!
//! Every response leaves with transport status 200; the outcome of the
//! request lives in the body. The standard writer wraps payloads in an
//! `Envelope` carrying an application code and message, the simple writer
//! emits the payload bare. Services that need another shape implement
//! [`ResponseWriter`] themselves.
//!
//! # Example
//!
//! ```rust
//! use axum_relay::response::Envelope;
//! use serde_json::json;
//!
//! let body = serde_json::to_value(Envelope::success(Some(json!({"id": 7})))).unwrap();
//! assert_eq!(body, json!({"code": 200, "msg": "", "data": {"id": 7}}));
//! ```

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::RequestContext;
use crate::pagination::{PageLinks, Pager};

/// Application code reported on success
pub const CODE_OK: i64 = 200;

/// Application code reported for errors with no registered code
pub const CODE_REQUEST_ERROR: i64 = 300;

/// Message reported for errors with no registered code
pub const MSG_REQUEST_ERROR: &str = "request error";

// ============================================================================
// Wire types
// ============================================================================

/// Pagination block of the envelope
///
/// Echoes the window back to the client together with relative navigation
/// links under `_links`. A zero total is omitted from the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Item offset of the window
    pub start: u64,
    /// Window size
    pub limit: u64,
    /// Total items across all pages, omitted when zero
    #[serde(default, skip_serializing_if = "is_zero")]
    pub total: u64,
    /// Relative navigation links
    #[serde(rename = "_links")]
    pub links: PageLinks,
}

fn is_zero(v: &u64) -> bool {
    *v == 0
}

impl PageMeta {
    /// Build the pagination block from a processor and the request base path
    #[must_use]
    pub fn from_pager(pager: &Pager, base: &str) -> Self {
        Self {
            start: pager.start(),
            limit: pager.limit(),
            total: pager.total(),
            links: pager.links(base),
        }
    }
}

/// Standard response body
///
/// `code` and `msg` are always present on the wire; `data` only on
/// success with a payload, `pagination` only on paginated success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Application outcome code
    pub code: i64,
    /// Human-readable outcome, empty on success
    pub msg: String,
    /// Success payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Pagination block for windowed results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageMeta>,
}

impl Envelope {
    /// Success envelope, with or without a payload
    #[must_use]
    pub fn success(data: Option<Value>) -> Self {
        Self {
            code: CODE_OK,
            msg: String::new(),
            data,
            pagination: None,
        }
    }

    /// Success envelope for a paginated result
    #[must_use]
    pub fn paginated(data: Value, meta: PageMeta) -> Self {
        Self {
            code: CODE_OK,
            msg: String::new(),
            data: Some(data),
            pagination: Some(meta),
        }
    }

    /// Error envelope with an application code and message
    #[must_use]
    pub fn failure(code: i64, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            data: None,
            pagination: None,
        }
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

// ============================================================================
// Writers
// ============================================================================

/// Body shape selector, settable from `[relay]` configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// Full envelope with code, message, and pagination block
    #[default]
    Standard,
    /// Bare payload, errors as a bare message string
    Simple,
}

impl ResponseMode {
    pub(crate) fn writer(self) -> Arc<dyn ResponseWriter> {
        match self {
            ResponseMode::Standard => Arc::new(StandardWriter),
            ResponseMode::Simple => Arc::new(SimpleWriter),
        }
    }
}

/// Terminal response construction for dispatched handlers
///
/// The dispatcher resolves the application code before calling in, so
/// implementations only decide the body shape. `code` is `None` when the
/// error matched nothing in the registry.
pub trait ResponseWriter: Send + Sync + 'static {
    /// Write a failed request
    fn write_error(&self, ctx: &RequestContext, err: &anyhow::Error, code: Option<i64>)
        -> Response;

    /// Write a successful request, `data` absent for unit payloads
    fn write_success(&self, ctx: &RequestContext, data: Option<Value>) -> Response;

    /// Write a successful paginated request
    fn write_paginated(&self, ctx: &RequestContext, data: Value, pager: &Pager) -> Response;
}

fn resolve(err: &anyhow::Error, code: Option<i64>) -> (i64, String) {
    match code {
        Some(code) => (code, err.root_cause().to_string()),
        None => (CODE_REQUEST_ERROR, MSG_REQUEST_ERROR.to_string()),
    }
}

fn log_failure(ctx: &RequestContext, err: &anyhow::Error, code: i64) {
    tracing::error!(
        url = %ctx.uri(),
        body = ctx.raw_body().unwrap_or(""),
        code,
        error = ?err,
        "request failed"
    );
}

/// Writer producing the full [`Envelope`] shape
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardWriter;

impl ResponseWriter for StandardWriter {
    fn write_error(
        &self,
        ctx: &RequestContext,
        err: &anyhow::Error,
        code: Option<i64>,
    ) -> Response {
        let (code, msg) = resolve(err, code);
        log_failure(ctx, err, code);
        Envelope::failure(code, msg).into_response()
    }

    fn write_success(&self, _ctx: &RequestContext, data: Option<Value>) -> Response {
        Envelope::success(data).into_response()
    }

    fn write_paginated(&self, ctx: &RequestContext, data: Value, pager: &Pager) -> Response {
        let meta = PageMeta::from_pager(pager, ctx.path());
        Envelope::paginated(data, meta).into_response()
    }
}

/// Writer producing bare payloads without the envelope
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleWriter;

impl ResponseWriter for SimpleWriter {
    fn write_error(
        &self,
        ctx: &RequestContext,
        err: &anyhow::Error,
        code: Option<i64>,
    ) -> Response {
        let (code, msg) = resolve(err, code);
        log_failure(ctx, err, code);
        (StatusCode::OK, Json(msg)).into_response()
    }

    fn write_success(&self, _ctx: &RequestContext, data: Option<Value>) -> Response {
        (StatusCode::OK, Json(data.unwrap_or(Value::Null))).into_response()
    }

    fn write_paginated(&self, _ctx: &RequestContext, data: Value, _pager: &Pager) -> Response {
        (StatusCode::OK, Json(data)).into_response()
    }
}
