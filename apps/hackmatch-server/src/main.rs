use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, AppConfigProvider, CliArgs};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use api_ingress::{ApiIngress, ApiIngressConfig};
use matching::config::MatchingConfig;
use matching::Matching;
use modkit::runtime::{run, RunOptions, ShutdownOptions};
use modkit::ModuleRegistry;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

// Adapter to make AppConfigProvider implement modkit::ConfigProvider
struct ModkitConfigAdapter(Arc<AppConfigProvider>);

impl modkit::ConfigProvider for ModkitConfigAdapter {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
        self.0.get_module_config(module_name)
    }
}

/// HackMatch Server - teammate matching for hackathons
#[derive(Parser)]
#[command(name = "hackmatch-server")]
#[command(about = "HackMatch Server - teammate matching for hackathons")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);
    inject_ingress_bind_addr(&mut config, args.port.is_some())?;

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "HackMatch Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
    }
}

/// The ingress listens on `server.host:server.port` unless its own section
/// names an address. An explicit `--port` always wins.
fn inject_ingress_bind_addr(config: &mut AppConfig, port_overridden: bool) -> Result<()> {
    let bind_addr = config.bind_addr();
    let section = config
        .modules
        .entry(api_ingress::MODULE_NAME.to_string())
        .or_insert_with(|| serde_json::json!({}));
    let obj = section
        .as_object_mut()
        .context("modules.api_ingress must be a mapping")?;
    if port_overridden || !obj.contains_key("bind_addr") {
        obj.insert("bind_addr".to_string(), serde_json::Value::String(bind_addr));
    }
    Ok(())
}

fn module_section<T: serde::de::DeserializeOwned + Default>(
    config: &AppConfig,
    name: &str,
) -> Result<T> {
    match config.modules.get(name) {
        Some(v) => serde_json::from_value(v.clone())
            .with_context(|| format!("invalid modules.{name} config")),
        None => Ok(T::default()),
    }
}

fn build_registry() -> Result<ModuleRegistry> {
    let ingress = Arc::new(ApiIngress::default());
    let matching = Arc::new(Matching::default());

    let registry = ModuleRegistry::builder()
        .core(api_ingress::MODULE_NAME, ingress.clone())
        .rest_host(api_ingress::MODULE_NAME, ingress.clone())
        .stateful(api_ingress::MODULE_NAME, ingress)
        .core(matching::MODULE_NAME, matching.clone())
        .rest(matching::MODULE_NAME, matching)
        .build()?;
    Ok(registry)
}

async fn run_server(config: AppConfig) -> Result<()> {
    tracing::info!("Initializing modules...");

    let config_provider = Arc::new(ModkitConfigAdapter(Arc::new(AppConfigProvider::new(
        config,
    ))));

    run(RunOptions {
        registry: build_registry()?,
        modules_cfg: config_provider,
        shutdown: ShutdownOptions::Signals,
    })
    .await
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    let ingress: ApiIngressConfig = module_section(config, api_ingress::MODULE_NAME)?;
    ingress
        .bind_addr
        .parse::<std::net::SocketAddr>()
        .with_context(|| format!("invalid bind address '{}'", ingress.bind_addr))?;

    let matching_cfg: MatchingConfig = module_section(config, matching::MODULE_NAME)?;
    matching_cfg
        .validate()
        .context("invalid modules.matching config")?;

    build_registry()?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
