use std::sync::Arc;

use axum::Router;
use tokio_util::sync::CancellationToken;

use crate::context::ModuleCtx;
use crate::contracts::{Module, RestHostModule, RestfulModule, StatefulModule};

pub struct ModuleEntry {
    pub name: &'static str,
    pub core: Arc<dyn Module>,
    pub rest: Option<Arc<dyn RestfulModule>>,
    pub rest_host: Option<Arc<dyn RestHostModule>>,
    pub stateful: Option<Arc<dyn StatefulModule>>,
}

impl std::fmt::Debug for ModuleEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleEntry")
            .field("name", &self.name)
            .field("rest", &self.rest.is_some())
            .field("rest_host", &self.rest_host.is_some())
            .field("stateful", &self.stateful.is_some())
            .finish()
    }
}

/// Modules in registration order; phases run in that order (stop runs reversed).
#[derive(Default, Debug)]
pub struct ModuleRegistry {
    modules: Vec<ModuleEntry>,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("module '{0}' is registered twice")]
    Duplicate(&'static str),
    #[error("capability registered for unknown module '{0}'")]
    UnknownModule(&'static str),
    #[error("REST modules are registered but no REST host is present")]
    RestRequiresHost,
    #[error("more than one REST host module is registered")]
    MultipleRestHosts,
    #[error("module '{module}' failed to init")]
    Init {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("module '{module}' failed to register REST routes")]
    RestRegister {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST host '{module}' failed")]
    RestHost {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("module '{module}' failed to start")]
    Start {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ModuleRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn modules(&self) -> &[ModuleEntry] {
        &self.modules
    }

    // ---- Ordered phases: init → REST (sync) → start → stop ----

    pub async fn run_init_phase(&self, base_ctx: &ModuleCtx) -> Result<(), RegistryError> {
        for e in &self.modules {
            let ctx = base_ctx.clone().for_module(e.name);
            tracing::debug!(module = e.name, "init");
            e.core
                .init(&ctx)
                .await
                .map_err(|source| RegistryError::Init {
                    module: e.name,
                    source,
                })?;
        }
        Ok(())
    }

    pub fn run_rest_phase(
        &self,
        base_ctx: &ModuleCtx,
        mut router: Router,
    ) -> Result<Router, RegistryError> {
        let hosts: Vec<&ModuleEntry> = self
            .modules
            .iter()
            .filter(|e| e.rest_host.is_some())
            .collect();

        let host_entry = match hosts.as_slice() {
            [] if self.modules.iter().any(|e| e.rest.is_some()) => {
                return Err(RegistryError::RestRequiresHost)
            }
            [] => return Ok(router),
            [one] => *one,
            _ => return Err(RegistryError::MultipleRestHosts),
        };
        let Some(host) = host_entry.rest_host.as_ref() else {
            return Err(RegistryError::RestRequiresHost);
        };
        let host_ctx = base_ctx.clone().for_module(host_entry.name);
        let host_err = |source| RegistryError::RestHost {
            module: host_entry.name,
            source,
        };

        // 1) Host prepare: base Router
        router = host.rest_prepare(&host_ctx, router).map_err(host_err)?;

        // 2) Register all REST providers and merge their OpenAPI fragments
        let mut docs = utoipa::openapi::OpenApi::new(
            utoipa::openapi::Info::new("HackMatch API", env!("CARGO_PKG_VERSION")),
            utoipa::openapi::Paths::new(),
        );
        for e in &self.modules {
            if let Some(rest) = &e.rest {
                let ctx = base_ctx.clone().for_module(e.name);
                router = rest
                    .register_rest(&ctx, router)
                    .map_err(|source| RegistryError::RestRegister {
                        module: e.name,
                        source,
                    })?;
                if let Some(fragment) = rest.openapi() {
                    docs.merge(fragment);
                }
            }
        }

        // 3) Host finalize: middlewares, /openapi.json (no server start)
        host.rest_finalize(&host_ctx, router, docs)
            .map_err(host_err)
    }

    pub async fn run_start_phase(&self, cancel: CancellationToken) -> Result<(), RegistryError> {
        for e in &self.modules {
            if let Some(s) = &e.stateful {
                s.start(cancel.clone())
                    .await
                    .map_err(|source| RegistryError::Start {
                        module: e.name,
                        source,
                    })?;
            }
        }
        Ok(())
    }

    pub async fn run_stop_phase(&self, cancel: CancellationToken) {
        for e in self.modules.iter().rev() {
            if let Some(s) = &e.stateful {
                if let Err(err) = s.stop(cancel.clone()).await {
                    tracing::warn!(module = e.name, error = %err, "Failed to stop module");
                }
            }
        }
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    modules: Vec<ModuleEntry>,
    error: Option<RegistryError>,
}

impl RegistryBuilder {
    pub fn core(mut self, name: &'static str, m: Arc<dyn Module>) -> Self {
        if self.modules.iter().any(|e| e.name == name) {
            self.error.get_or_insert(RegistryError::Duplicate(name));
            return self;
        }
        self.modules.push(ModuleEntry {
            name,
            core: m,
            rest: None,
            rest_host: None,
            stateful: None,
        });
        self
    }

    pub fn rest(self, name: &'static str, m: Arc<dyn RestfulModule>) -> Self {
        self.with_entry(name, |e| e.rest = Some(m))
    }

    pub fn rest_host(self, name: &'static str, m: Arc<dyn RestHostModule>) -> Self {
        self.with_entry(name, |e| e.rest_host = Some(m))
    }

    pub fn stateful(self, name: &'static str, m: Arc<dyn StatefulModule>) -> Self {
        self.with_entry(name, |e| e.stateful = Some(m))
    }

    fn with_entry(mut self, name: &'static str, f: impl FnOnce(&mut ModuleEntry)) -> Self {
        match self.modules.iter_mut().find(|e| e.name == name) {
            Some(entry) => f(entry),
            None => {
                self.error.get_or_insert(RegistryError::UnknownModule(name));
            }
        }
        self
    }

    pub fn build(self) -> Result<ModuleRegistry, RegistryError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(ModuleRegistry {
                modules: self.modules,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ModuleCtxBuilder;
    use async_trait::async_trait;
    use axum::routing::get;

    struct Dummy;

    #[async_trait]
    impl Module for Dummy {
        async fn init(&self, _ctx: &ModuleCtx) -> anyhow::Result<()> {
            Ok(())
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    impl RestfulModule for Dummy {
        fn register_rest(&self, _ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router> {
            Ok(router.route("/dummy", get(|| async { "dummy" })))
        }
    }

    struct Host;

    #[async_trait]
    impl Module for Host {
        async fn init(&self, _ctx: &ModuleCtx) -> anyhow::Result<()> {
            Ok(())
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    impl RestHostModule for Host {
        fn rest_prepare(&self, _ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router> {
            Ok(router)
        }
        fn rest_finalize(
            &self,
            _ctx: &ModuleCtx,
            router: Router,
            _docs: utoipa::openapi::OpenApi,
        ) -> anyhow::Result<Router> {
            Ok(router)
        }
    }

    fn ctx() -> ModuleCtx {
        ModuleCtxBuilder::new(CancellationToken::new()).build()
    }

    #[test]
    fn duplicate_module_is_rejected() {
        let res = ModuleRegistry::builder()
            .core("a", Arc::new(Dummy))
            .core("a", Arc::new(Dummy))
            .build();
        assert!(matches!(res, Err(RegistryError::Duplicate("a"))));
    }

    #[test]
    fn capability_for_unknown_module_is_rejected() {
        let res = ModuleRegistry::builder()
            .rest("ghost", Arc::new(Dummy))
            .build();
        assert!(matches!(res, Err(RegistryError::UnknownModule("ghost"))));
    }

    #[test]
    fn rest_without_host_fails() {
        let registry = ModuleRegistry::builder()
            .core("a", Arc::new(Dummy))
            .rest("a", Arc::new(Dummy))
            .build()
            .unwrap();
        let err = registry.run_rest_phase(&ctx(), Router::new()).unwrap_err();
        assert!(matches!(err, RegistryError::RestRequiresHost));
    }

    #[tokio::test]
    async fn phases_run_with_host() {
        let registry = ModuleRegistry::builder()
            .core("host", Arc::new(Host))
            .rest_host("host", Arc::new(Host))
            .core("a", Arc::new(Dummy))
            .rest("a", Arc::new(Dummy))
            .build()
            .unwrap();
        assert_eq!(registry.modules().len(), 2);

        registry.run_init_phase(&ctx()).await.unwrap();
        registry.run_rest_phase(&ctx(), Router::new()).unwrap();
    }
}
