//! `x-request-id` handling: generation, propagation and the per-request span.

use std::time::Duration;

use axum::http::{HeaderName, Request, Response};
use axum::{body::Body, middleware::Next};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::request_id::{MakeRequestId, RequestId};
use tower_http::trace::{DefaultOnRequest, MakeSpan, OnResponse, TraceLayer};
use tracing::{field::Empty, Span};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Length of generated ids. Client-supplied ids are kept as sent.
pub const GENERATED_ID_LEN: usize = 16;

/// Request id as seen by handlers (`Extension<XRequestId>`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XRequestId(pub String);

pub fn header() -> HeaderName {
    HeaderName::from_static(REQUEST_ID_HEADER)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MakeReqId;

impl MakeRequestId for MakeReqId {
    fn make_request_id<B>(&mut self, _req: &Request<B>) -> Option<RequestId> {
        let id = nanoid::nanoid!(GENERATED_ID_LEN);
        id.parse().ok().map(RequestId::new)
    }
}

fn request_id_of<B>(req: &Request<B>) -> Option<&str> {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
}

/// Copies the id set by `SetRequestIdLayer` into request extensions.
pub async fn record_request_id(mut req: Request<Body>, next: Next) -> axum::response::Response {
    if let Some(rid) = request_id_of(&req).map(str::to_owned) {
        req.extensions_mut().insert(XRequestId(rid));
    }
    next.run(req).await
}

/// One `http_request` span per request, carrying method, path and id.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, req: &Request<B>) -> Span {
        tracing::info_span!(
            "http_request",
            method = %req.method(),
            path = %req.uri().path(),
            request_id = %request_id_of(req).unwrap_or("-"),
            status = Empty,
            latency_ms = Empty,
        )
    }
}

/// Fills `status` and `latency_ms` on the request span.
#[derive(Clone, Copy, Debug, Default)]
pub struct RecordOutcome;

impl<B> OnResponse<B> for RecordOutcome {
    fn on_response(self, response: &Response<B>, latency: Duration, span: &Span) {
        let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        span.record("status", response.status().as_u16());
        span.record("latency_ms", latency_ms);
        tracing::debug!(parent: span, "request finished");
    }
}

pub type HttpTraceLayer = TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    RequestSpan,
    DefaultOnRequest,
    RecordOutcome,
>;

pub fn create_trace_layer() -> HttpTraceLayer {
    TraceLayer::new_for_http()
        .make_span_with(RequestSpan)
        .on_response(RecordOutcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_have_fixed_length_and_differ() {
        let req = Request::new(());
        let mut make = MakeReqId;
        let a = make.make_request_id(&req).unwrap();
        let b = make.make_request_id(&req).unwrap();
        assert_eq!(a.header_value().len(), GENERATED_ID_LEN);
        assert_ne!(a.header_value(), b.header_value());
    }

    #[test]
    fn reads_id_from_header() {
        let req = Request::builder()
            .header(REQUEST_ID_HEADER, "abc-123")
            .body(())
            .unwrap();
        assert_eq!(request_id_of(&req), Some("abc-123"));
        assert_eq!(request_id_of(&Request::new(())), None);
    }
}
