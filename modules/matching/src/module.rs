use std::sync::Arc;

use anyhow::Context;
use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use modkit::api::OpenApiDocRegistry;
use modkit::{Module, ModuleCtx, RestfulModule};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::MatchingConfig;
use crate::contract::client::MatchingApi;
use crate::domain::ports::BlobStorage;
use crate::domain::service::Service;
use crate::gateways::local::MatchingLocalClient;
use crate::infra::blob::{local_fs::LocalFsBlobStorage, memory::InMemoryBlobStorage};
use crate::infra::storage::memory::{InMemoryProfileRepository, InMemorySwipeRepository};

pub const MODULE_NAME: &str = "matching";

/// The matching engine module: profile store, swipe ledger, candidate
/// queues and browsing sessions.
#[derive(Default)]
pub struct Matching {
    service: ArcSwapOption<Service>,
    docs: Mutex<Option<utoipa::openapi::OpenApi>>,
}

impl Matching {
    /// Service built by `init`, if it ran.
    pub fn service(&self) -> Option<Arc<Service>> {
        self.service.load_full()
    }
}

fn build_blobs(cfg: &MatchingConfig) -> anyhow::Result<Arc<dyn BlobStorage>> {
    Ok(match &cfg.blob_dir {
        Some(dir) => {
            info!(dir = %dir, "Storing photos on the local filesystem");
            Arc::new(LocalFsBlobStorage::new(dir, &cfg.blob_public_base_url)?)
        }
        None => {
            info!("Storing photos in memory");
            Arc::new(InMemoryBlobStorage::new(&cfg.blob_public_base_url)?)
        }
    })
}

/// Wire the in-process adapters into a service.
pub fn build_service(cfg: &MatchingConfig) -> anyhow::Result<Service> {
    cfg.validate().context("invalid matching config")?;
    let profiles = Arc::new(InMemoryProfileRepository::new());
    let swipes = Arc::new(InMemorySwipeRepository::new());
    Ok(Service::new(
        profiles.clone(),
        profiles,
        swipes,
        build_blobs(cfg)?,
        cfg.order()?,
        cfg.service_config(),
    ))
}

#[async_trait]
impl Module for Matching {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        info!("Initializing matching module");

        let cfg: MatchingConfig = ctx.module_config();
        debug!(
            min_photos = cfg.min_photos,
            max_photos = cfg.max_photos,
            candidate_order = %cfg.candidate_order,
            "Loaded matching config"
        );

        let service = Arc::new(build_service(&cfg)?);
        self.service.store(Some(service.clone()));

        let api: Arc<dyn MatchingApi> = Arc::new(MatchingLocalClient::new(service));
        ctx.client_hub().register::<dyn MatchingApi>(api);
        info!("Matching API exposed to ClientHub");
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl RestfulModule for Matching {
    fn register_rest(
        &self,
        _ctx: &ModuleCtx,
        router: axum::Router,
    ) -> anyhow::Result<axum::Router> {
        info!("Registering matching REST routes");

        let service = self
            .service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))?;

        let registry = OpenApiDocRegistry::new();
        let router = routes::register_routes(router, &registry, service)?;
        let docs = registry.build("HackMatch Matching API", env!("CARGO_PKG_VERSION"));
        *self.docs.lock() = Some(docs);

        info!(operations = registry.operation_count(), "Matching REST routes registered");
        Ok(router)
    }

    fn openapi(&self) -> Option<utoipa::openapi::OpenApi> {
        self.docs.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modkit::{ConfigProvider, ModuleCtxBuilder};

    struct Cfg(serde_json::Value);

    impl ConfigProvider for Cfg {
        fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
            self.0.get(module_name)
        }
    }

    fn ctx(modules: serde_json::Value) -> ModuleCtx {
        ModuleCtxBuilder::new(Default::default())
            .with_config_provider(Arc::new(Cfg(modules)))
            .build()
            .for_module(MODULE_NAME)
    }

    #[tokio::test]
    async fn init_publishes_client() {
        let m = Matching::default();
        let ctx = ctx(serde_json::json!({}));
        m.init(&ctx).await.unwrap();

        assert!(m.service().is_some());
        let Ok(api) = ctx.client_hub().get::<dyn MatchingApi>() else {
            panic!("MatchingApi not registered");
        };
        assert!(api.list_profiles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn init_rejects_invalid_config() {
        let m = Matching::default();
        let ctx = ctx(serde_json::json!({ "matching": { "min_photos": 4, "max_photos": 1 } }));
        assert!(m.init(&ctx).await.is_err());
        assert!(m.service().is_none());
    }

    #[test]
    fn rest_requires_init() {
        let m = Matching::default();
        let res = m.register_rest(&ctx(serde_json::json!({})), axum::Router::new());
        assert!(res.is_err());
        assert!(m.openapi().is_none());
    }

    #[tokio::test]
    async fn rest_registration_produces_docs() {
        let m = Matching::default();
        let ctx = ctx(serde_json::json!({}));
        m.init(&ctx).await.unwrap();
        let _router = m.register_rest(&ctx, axum::Router::new()).unwrap();

        let docs = serde_json::to_value(m.openapi().unwrap()).unwrap();
        assert!(docs["paths"]["/matching/v1/sessions/{id}/decide"]["post"].is_object());
        assert!(docs["components"]["schemas"]["ProfileDto"].is_object());
    }
}
