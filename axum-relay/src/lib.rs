//! # axum-relay
//!
//! Typed handler dispatch for axum services: plain async functions become
//! enveloped JSON endpoints with filter chains, error-code mapping, and
//! offset pagination.
//!
//! ## Features
//!
//! - **Typed dispatch**: four handler shapes (with/without JSON body,
//!   with/without pagination) wrapped into axum routes
//! - **Filter chains**: ordered front and request filters with
//!   short-circuit rejection
//! - **Error codes**: domain error types and values mapped to application
//!   codes in the response envelope
//! - **Pagination**: Confluence-style start/limit windows with next/prev
//!   links
//! - **Middleware stack**: request IDs, tracing, compression, CORS, panic
//!   recovery, body size limits
//! - **Graceful shutdown**: proper signal handling (SIGTERM, SIGINT)
//!
//! ## Example
//!
//! ```rust,no_run
//! use axum_relay::prelude::*;
//!
//! #[derive(Debug, Error)]
//! enum CatalogError {
//!     #[error("widget not found")]
//!     NotFound,
//! }
//!
//! async fn list_widgets(_ctx: RequestContext, _query: PageQuery) -> anyhow::Result<Page<String>> {
//!     Ok(Page::new(vec!["anvil".to_string(), "sprocket".to_string()], 2))
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Load configuration
//!     let config = Config::load()?;
//!
//!     // Initialize tracing
//!     init_tracing(&config)?;
//!
//!     // Build the dispatch pipeline
//!     let relay = Relay::from_config(&config)
//!         .error_codes(ErrorCodes::new().register::<CatalogError>(40401))
//!         .build();
//!
//!     // Create router
//!     let app = Router::new().route("/widgets", get(relay.paged(list_widgets)));
//!
//!     // Run server
//!     Server::new(config).serve(app).await
//! }
//! ```

pub mod codes;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod observability;
pub mod pagination;
pub mod request;
pub mod response;
pub mod server;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::codes::ErrorCodes;
    pub use crate::config::Config;
    pub use crate::context::RequestContext;
    pub use crate::dispatch::{Relay, RelayBuilder};
    pub use crate::error::{Error, Result};
    pub use crate::filter::{FrontFilter, RequestFilter};
    pub use crate::observability::init_tracing;
    pub use crate::pagination::{
        Page, PageError, PageLimits, PageLinks, PageQuery, Pager, DEFAULT_PAGE_LIMIT,
        DEFAULT_PAGE_START, MAX_PAGE_LIMIT,
    };
    pub use crate::request::{DisplayError, DisplaySpec, Orderable, Sorter};
    pub use crate::response::{
        Envelope, PageMeta, ResponseMode, ResponseWriter, SimpleWriter, StandardWriter, CODE_OK,
        CODE_REQUEST_ERROR, MSG_REQUEST_ERROR,
    };
    pub use crate::server::{
        request_id_layer, request_id_propagation_layer, sensitive_headers_layer, MakeUuidRequestId,
        Server, SENSITIVE_HEADERS,
    };

    pub use axum::{
        http::{HeaderMap, HeaderValue, StatusCode},
        response::{IntoResponse, Response},
        routing::{delete, get, patch, post, put},
        Json, Router,
    };

    pub use serde::{Deserialize, Serialize};

    // Re-export tracing macros
    pub use tracing::{debug, error, info, instrument, trace, warn};

    // Re-export error handling utilities
    pub use anyhow::{self, Context as AnyhowContext};
    pub use thiserror::Error;

    // Re-export the boxed future alias used by hand-written filters
    pub use futures::future::BoxFuture;

    // Re-export UUID
    pub use uuid::Uuid;
}
