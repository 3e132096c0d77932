use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::client_hub::ClientHub;

/// Source of per-module config sections, keyed by module name.
pub trait ConfigProvider: Send + Sync {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value>;
}

/// Everything a module sees during its lifecycle hooks.
#[derive(Clone)]
pub struct ModuleCtx {
    pub(crate) config_provider: Option<Arc<dyn ConfigProvider>>,
    pub(crate) client_hub: Arc<ClientHub>,
    pub(crate) cancellation_token: CancellationToken,
    pub(crate) module_name: Option<Arc<str>>,
}

pub struct ModuleCtxBuilder {
    ctx: ModuleCtx,
}

impl ModuleCtxBuilder {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            ctx: ModuleCtx {
                config_provider: None,
                client_hub: Arc::default(),
                cancellation_token: token,
                module_name: None,
            },
        }
    }

    pub fn with_config_provider(self, provider: Arc<dyn ConfigProvider>) -> Self {
        Self {
            ctx: ModuleCtx {
                config_provider: Some(provider),
                ..self.ctx
            },
        }
    }

    pub fn with_client_hub(self, client_hub: Arc<ClientHub>) -> Self {
        Self {
            ctx: ModuleCtx {
                client_hub,
                ..self.ctx
            },
        }
    }

    pub fn build(self) -> ModuleCtx {
        self.ctx
    }
}

impl ModuleCtx {
    /// Copy of this context scoped to `name`; config lookups use that section.
    pub fn for_module(self, name: &str) -> Self {
        Self {
            module_name: Some(Arc::from(name)),
            ..self
        }
    }

    pub fn client_hub(&self) -> Arc<ClientHub> {
        Arc::clone(&self.client_hub)
    }

    /// Cancelled when the runtime begins shutting down.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation_token
    }

    pub fn current_module(&self) -> Option<&str> {
        self.module_name.as_deref()
    }

    fn section(&self) -> Option<(&str, &serde_json::Value)> {
        let name = self.module_name.as_deref()?;
        let value = self.config_provider.as_ref()?.get_module_config(name)?;
        Some((name, value))
    }

    /// The module's section as `T`. A missing section yields `T::default()`,
    /// and so does one that fails to deserialize (logged at warn).
    pub fn module_config<T: DeserializeOwned + Default>(&self) -> T {
        let Some((name, value)) = self.section() else {
            return T::default();
        };
        T::deserialize(value).unwrap_or_else(|e| {
            tracing::warn!(
                module = %name,
                error = %e,
                "Invalid module config, falling back to defaults"
            );
            T::default()
        })
    }
}
