use axum::{
    body::{Body, Bytes},
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use tokio_util::sync::CancellationToken;
use tower::util::ServiceExt;

use api_ingress::{ApiIngress, ApiIngressConfig};
use modkit::{ModuleCtx, ModuleCtxBuilder, RestHostModule};

fn ctx() -> ModuleCtx {
    ModuleCtxBuilder::new(CancellationToken::new())
        .build()
        .for_module(api_ingress::MODULE_NAME)
}

fn docs() -> utoipa::openapi::OpenApi {
    utoipa::openapi::OpenApi::new(
        utoipa::openapi::Info::new("test", "0.0.0"),
        utoipa::openapi::Paths::new(),
    )
}

fn host_router(cfg: ApiIngressConfig) -> Router {
    let host = ApiIngress::new(cfg);
    let router = host.rest_prepare(&ctx(), Router::new()).unwrap();
    let router = router
        .route("/ping", get(|| async { "pong" }))
        .route("/upload", post(|body: Bytes| async move { body.len().to_string() }));
    host.rest_finalize(&ctx(), router, docs()).unwrap()
}

async fn get_status(router: Router, uri: &str) -> StatusCode {
    router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn health_and_module_routes_are_served() {
    let router = host_router(ApiIngressConfig::default());
    let response = router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");

    assert_eq!(get_status(router, "/ping").await, StatusCode::OK);
}

#[tokio::test]
async fn openapi_served_only_when_enabled() {
    let enabled = host_router(ApiIngressConfig::default());
    let response = enabled
        .oneshot(
            Request::builder()
                .uri("/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["openapi"].as_str().is_some_and(|v| v.starts_with("3.")));
    assert_eq!(json["info"]["title"], "test");

    let disabled = host_router(ApiIngressConfig {
        enable_docs: false,
        ..Default::default()
    });
    assert_eq!(
        get_status(disabled, "/openapi.json").await,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let router = host_router(ApiIngressConfig {
        body_limit_bytes: 8,
        ..Default::default()
    });

    let small = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/upload")
                .body(Body::from("1234"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(small.status(), StatusCode::OK);

    let large = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/upload")
                .header("content-length", "32")
                .body(Body::from(vec![0u8; 32]))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(large.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
