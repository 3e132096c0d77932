//! HTTP host for HackMatch modules.
//!
//! `ApiIngress` owns the axum server: it prepares the base router (`/health`),
//! lets REST modules attach their routes, then wraps everything in the global
//! middleware stack and serves it until the runtime cancels.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use async_trait::async_trait;
use axum::{extract::DefaultBodyLimit, middleware::from_fn, routing::get, Router};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;

pub const MODULE_NAME: &str = "api_ingress";

const STOP_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ApiIngress {
    config: ArcSwap<ApiIngressConfig>,
    // Router finalized during the REST phase, taken by `start`
    final_router: Mutex<Option<Router>>,
    server: Mutex<Option<JoinHandle<Result<()>>>>,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default())
    }
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
            final_router: Mutex::new(None),
            server: Mutex::new(None),
        }
    }

    pub fn get_config(&self) -> ApiIngressConfig {
        (**self.config.load()).clone()
    }

    /// Wraps `router` in the global middleware stack.
    ///
    /// Outermost first: SetRequestId → PropagateRequestId → Trace →
    /// record_request_id → Timeout → CORS → body limit.
    pub fn apply_layers(router: Router, cfg: &ApiIngressConfig) -> Router {
        let x_request_id = request_id::header();

        let mut router = router
            .layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes))
            .layer(DefaultBodyLimit::disable());
        if cfg.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }
        router
            .layer(TimeoutLayer::new(Duration::from_secs(cfg.request_timeout_sec)))
            .layer(from_fn(request_id::record_request_id))
            .layer(request_id::create_trace_layer())
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId))
    }

    fn take_router(&self, cfg: &ApiIngressConfig) -> Router {
        match self.final_router.lock().take() {
            Some(r) => {
                tracing::debug!("Using router from REST phase");
                r
            }
            None => {
                tracing::debug!("No router from REST phase, serving health only");
                Self::apply_layers(
                    Router::new().route("/health", get(web::health_check)),
                    cfg,
                )
            }
        }
    }
}

#[async_trait]
impl modkit::Module for ApiIngress {
    async fn init(&self, ctx: &modkit::ModuleCtx) -> Result<()> {
        let cfg = ctx.module_config::<ApiIngressConfig>();
        tracing::debug!(module = MODULE_NAME, bind_addr = %cfg.bind_addr, "config loaded");
        self.config.store(Arc::new(cfg));
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

// REST host role: prepare/finalize the router, but do not start the server here.
impl modkit::RestHostModule for ApiIngress {
    fn rest_prepare(&self, _ctx: &modkit::ModuleCtx, router: Router) -> Result<Router> {
        tracing::debug!("REST host prepared base router with health check");
        Ok(router.route("/health", get(web::health_check)))
    }

    fn rest_finalize(
        &self,
        _ctx: &modkit::ModuleCtx,
        mut router: Router,
        docs: utoipa::openapi::OpenApi,
    ) -> Result<Router> {
        let cfg = self.get_config();

        if cfg.enable_docs {
            tracing::info!(paths = docs.paths.paths.len(), "emitting OpenAPI document");
            let doc = Arc::new(serde_json::to_value(&docs).context("serialize OpenAPI")?);
            router = router.route(
                "/openapi.json",
                get(move || web::openapi_json(doc.clone())),
            );
        }

        let router = Self::apply_layers(router, &cfg);
        *self.final_router.lock() = Some(router.clone());
        Ok(router)
    }
}

#[async_trait]
impl modkit::StatefulModule for ApiIngress {
    async fn start(&self, cancel: CancellationToken) -> Result<()> {
        let cfg = self.get_config();
        let addr: SocketAddr = cfg
            .bind_addr
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", cfg.bind_addr))?;
        let router = self.take_router(&cfg);

        // Bind before returning so address errors fail the start phase
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("bind {addr}"))?;
        tracing::info!(addr = %listener.local_addr()?, "HTTP server bound");

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    cancel.cancelled().await;
                    tracing::info!("HTTP server shutting down gracefully");
                })
                .await
                .map_err(anyhow::Error::from)
        });
        *self.server.lock() = Some(handle);
        Ok(())
    }

    async fn stop(&self, cancel: CancellationToken) -> Result<()> {
        cancel.cancel();
        let handle = self.server.lock().take();
        let Some(handle) = handle else {
            return Ok(());
        };
        match tokio::time::timeout(STOP_TIMEOUT, handle).await {
            Ok(joined) => joined.context("HTTP server task panicked")?,
            Err(_) => {
                tracing::warn!("HTTP server did not stop within {:?}", STOP_TIMEOUT);
                Ok(())
            }
        }
    }
}
