use async_trait::async_trait;
use axum::Router;
use tokio_util::sync::CancellationToken;

use crate::context::ModuleCtx;

/// Core module: DI/wiring.
#[async_trait]
pub trait Module: Send + Sync + 'static {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()>;
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Pure wiring; must be sync. Runs AFTER init.
pub trait RestfulModule: Send + Sync {
    fn register_rest(&self, ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router>;

    /// OpenAPI fragment describing the routes this module registers.
    fn openapi(&self) -> Option<utoipa::openapi::OpenApi> {
        None
    }
}

/// REST host module: handles ingress hosting with prepare/finalize phases.
/// Must be sync. Runs during REST phase, but doesn't start the server.
pub trait RestHostModule: Send + Sync + 'static {
    /// Prepare a base Router (e.g., /health). Do NOT start the server here.
    fn rest_prepare(&self, ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router>;

    /// Finalize before start: attach global middlewares and `/openapi.json`,
    /// keep the Router for serving. Do NOT start the server here.
    fn rest_finalize(
        &self,
        ctx: &ModuleCtx,
        router: Router,
        docs: utoipa::openapi::OpenApi,
    ) -> anyhow::Result<Router>;
}

#[async_trait]
pub trait StatefulModule: Send + Sync {
    async fn start(&self, cancel: CancellationToken) -> anyhow::Result<()>;
    async fn stop(&self, cancel: CancellationToken) -> anyhow::Result<()>;
}
