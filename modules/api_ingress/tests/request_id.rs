use axum::{
    body::Body,
    extract::{Extension, OriginalUri},
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use tower::util::ServiceExt;
use tracing_test::traced_test;

use api_ingress::request_id::{XRequestId, GENERATED_ID_LEN, REQUEST_ID_HEADER};
use api_ingress::{ApiIngress, ApiIngressConfig};
use modkit::{Problem, ProblemResponse};

fn app() -> Router {
    let routes = Router::new()
        .route("/whoami", get(echo_id))
        .route("/sessions/stale", get(stale_session));
    ApiIngress::apply_layers(routes, &ApiIngressConfig::default())
}

async fn echo_id(Extension(XRequestId(id)): Extension<XRequestId>) -> String {
    tracing::info!("handling whoami");
    id
}

async fn stale_session(OriginalUri(uri): OriginalUri) -> ProblemResponse {
    Problem::from_status(StatusCode::CONFLICT, "session is exhausted")
        .with_code("invalid_state")
        .with_instance(uri.path())
        .into()
}

fn get_req(uri: &str, id: Option<&str>) -> Request<Body> {
    let mut b = Request::builder().uri(uri);
    if let Some(id) = id {
        b = b.header(REQUEST_ID_HEADER, id);
    }
    b.body(Body::empty()).unwrap()
}

fn header_id(resp: &axum::response::Response) -> Option<String> {
    resp.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

async fn body_text(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn missing_id_is_generated_and_visible_to_handler() {
    let resp = app().oneshot(get_req("/whoami", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let id = header_id(&resp).expect("x-request-id should be set");
    assert_eq!(id.len(), GENERATED_ID_LEN);
    assert_eq!(body_text(resp).await, id);
}

#[tokio::test]
async fn client_id_is_echoed() {
    let resp = app()
        .oneshot(get_req("/whoami", Some("swipe-batch-7")))
        .await
        .unwrap();
    assert_eq!(header_id(&resp).as_deref(), Some("swipe-batch-7"));
    assert_eq!(body_text(resp).await, "swipe-batch-7");
}

#[tokio::test]
async fn problem_responses_keep_the_id_header() {
    let resp = app()
        .oneshot(get_req("/sessions/stale", Some("rid-409")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(header_id(&resp).as_deref(), Some("rid-409"));
    let problem: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(problem["code"], "invalid_state");
    assert_eq!(problem["instance"], "/sessions/stale");
}

#[traced_test]
#[tokio::test]
async fn handler_logs_run_inside_request_span() {
    let resp = app()
        .oneshot(get_req("/whoami", Some("trace-me")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    assert!(logs_contain("handling whoami"));
    assert!(logs_contain("request_id=trace-me"));
    assert!(logs_contain("path=/whoami"));
}
