//! Drives a [`ModuleRegistry`] through init → rest → start → wait → stop.
//!
//! Every phase shares one `ModuleCtx`, so clients published to the
//! `ClientHub` during init are visible to later phases.

use std::{future::Future, pin::Pin, sync::Arc};

use tokio_util::sync::CancellationToken;

use crate::client_hub::ClientHub;
use crate::context::{ConfigProvider, ModuleCtxBuilder};
use crate::registry::ModuleRegistry;
use crate::runtime::shutdown;

/// What ends the wait phase.
pub enum ShutdownOptions {
    /// Ctrl+C, or SIGTERM on unix.
    Signals,
    /// Caller cancels the token.
    Token(CancellationToken),
    /// Shutdown begins when the future resolves.
    Future(Pin<Box<dyn Future<Output = ()> + Send>>),
}

pub struct RunOptions {
    pub registry: ModuleRegistry,
    pub modules_cfg: Arc<dyn ConfigProvider>,
    pub shutdown: ShutdownOptions,
}

/// Token that is cancelled when `shutdown` fires.
fn shutdown_token(shutdown: ShutdownOptions) -> CancellationToken {
    let waiter: Pin<Box<dyn Future<Output = ()> + Send>> = match shutdown {
        ShutdownOptions::Token(token) => return token,
        ShutdownOptions::Future(waiter) => waiter,
        ShutdownOptions::Signals => Box::pin(async {
            if let Err(e) = shutdown::wait_for_shutdown().await {
                tracing::warn!(error = %e, "Signal listener failed, waiting on ctrl_c only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }),
    };
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        waiter.await;
        tracing::info!("Shutdown requested");
        trigger.cancel();
    });
    token
}

pub async fn run(opts: RunOptions) -> anyhow::Result<()> {
    let RunOptions {
        registry,
        modules_cfg,
        shutdown,
    } = opts;
    let cancel = shutdown_token(shutdown);
    let ctx = ModuleCtxBuilder::new(cancel.clone())
        .with_client_hub(Arc::new(ClientHub::new()))
        .with_config_provider(modules_cfg)
        .build();

    tracing::info!("Phase: init");
    registry.run_init_phase(&ctx).await?;

    tracing::info!("Phase: rest");
    // The REST host keeps the finished router; nothing to do with it here
    let _ = registry.run_rest_phase(&ctx, axum::Router::new())?;

    tracing::info!("Phase: start");
    registry.run_start_phase(cancel.clone()).await?;

    cancel.cancelled().await;

    tracing::info!("Phase: stop");
    registry.run_stop_phase(cancel).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{Module, StatefulModule};
    use crate::context::ModuleCtx;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NoConfig;

    impl ConfigProvider for NoConfig {
        fn get_module_config(&self, _module_name: &str) -> Option<&serde_json::Value> {
            None
        }
    }

    #[derive(Default)]
    struct Counting {
        inits: AtomicUsize,
        starts: AtomicUsize,
        stops: AtomicUsize,
    }

    #[async_trait]
    impl Module for Counting {
        async fn init(&self, _ctx: &ModuleCtx) -> anyhow::Result<()> {
            self.inits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    #[async_trait]
    impl StatefulModule for Counting {
        async fn start(&self, _cancel: CancellationToken) -> anyhow::Result<()> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn stop(&self, _cancel: CancellationToken) -> anyhow::Result<()> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn runs_all_phases_until_token_cancelled() {
        let m = Arc::new(Counting::default());
        let registry = ModuleRegistry::builder()
            .core("counting", m.clone())
            .stateful("counting", m.clone())
            .build()
            .unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();

        run(RunOptions {
            registry,
            modules_cfg: Arc::new(NoConfig),
            shutdown: ShutdownOptions::Token(cancel),
        })
        .await
        .unwrap();

        assert_eq!(m.inits.load(Ordering::SeqCst), 1);
        assert_eq!(m.starts.load(Ordering::SeqCst), 1);
        assert_eq!(m.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn future_shutdown_stops_runner() {
        let registry = ModuleRegistry::builder().build().unwrap();
        run(RunOptions {
            registry,
            modules_cfg: Arc::new(NoConfig),
            shutdown: ShutdownOptions::Future(Box::pin(async {})),
        })
        .await
        .unwrap();
    }
}
