//! Per-request context handed to core operations
//!
//! Core operations never reach for an ambient logger. The caller passes a
//! [`RequestContext`] whose span becomes the parent of every span the core
//! opens, so ledger logs carry the request id set at the boundary.

use tracing::{Span, info_span};

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub span: Span,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        let request_id = request_id.into();
        let span = info_span!("request", request_id = %request_id);
        Self { request_id, span }
    }

    /// Context for work not triggered by an inbound request (tests, tools).
    pub fn detached() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    /// Attach to an existing span, e.g. the one opened by HTTP middleware.
    pub fn with_span(request_id: impl Into<String>, span: Span) -> Self {
        Self {
            request_id: request_id.into(),
            span,
        }
    }
}
