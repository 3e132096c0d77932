//! `tracing` setup driven by the `logging` config section.
//!
//! Every key other than `default` names a target prefix (`matching`,
//! `api_ingress`, ...) and owns all records under it. `default` gets the
//! records no named section owns. Each section writes to the console and,
//! when `file` is set, to a size-rotated JSON log file.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};
use tracing::{Level, Metadata};
use tracing_subscriber::{
    filter::FilterFn, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry,
};

use crate::config::{LoggingConfig, Section};

const DEFAULT_SECTION: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_BACKUPS: usize = 5;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;
type LogFile = Mutex<FileRotate<AppendTimestamp>>;

/// `None` means the sink is off. Unknown names fall back to `info`.
fn level_of(name: &str) -> Option<Level> {
    match name.trim().to_ascii_lowercase().as_str() {
        "off" | "none" => None,
        "error" => Some(Level::ERROR),
        "warn" => Some(Level::WARN),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => Some(Level::INFO),
    }
}

/// `matching` owns `matching` and `matching::domain`, not `matching_ext`.
fn is_under(target: &str, prefix: &str) -> bool {
    target
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

/// Which records a section receives.
#[derive(Debug, Clone)]
enum Scope {
    Owned(String),
    Unclaimed(Vec<String>),
}

impl Scope {
    fn admits(&self, target: &str) -> bool {
        match self {
            Scope::Owned(prefix) => is_under(target, prefix),
            Scope::Unclaimed(owned) => !owned.iter().any(|p| is_under(target, p)),
        }
    }
}

fn scoped_filter(
    scope: Arc<Scope>,
    max: Level,
) -> FilterFn<impl Fn(&Metadata<'_>) -> bool + Send + Sync + 'static> {
    FilterFn::new(move |meta: &Metadata<'_>| *meta.level() <= max && scope.admits(meta.target()))
}

fn resolve_log_path(file: &str, home_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        home_dir.join(p)
    }
}

/// Backup count wins over age when both are configured.
fn retention(section: &Section) -> FileLimit {
    match (section.max_backups, section.max_age_days) {
        (Some(n), _) => FileLimit::MaxFiles(n),
        (None, Some(days)) => FileLimit::Age(chrono::Duration::days(i64::from(days))),
        (None, None) => FileLimit::MaxFiles(DEFAULT_MAX_BACKUPS),
    }
}

fn open_log_file(path: &Path, section: &Section) -> std::io::Result<LogFile> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let rotate = FileRotate::new(
        path,
        AppendTimestamp::default(retention(section)),
        ContentLimit::BytesSurpassed(usize::try_from(max_bytes).unwrap_or(usize::MAX)),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    Ok(Mutex::new(rotate))
}

fn console_layer(scope: Arc<Scope>, level: Level, ansi: bool) -> BoxedLayer {
    fmt::layer()
        .with_ansi(ansi)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(scoped_filter(scope, level))
        .boxed()
}

fn file_layer(scope: Arc<Scope>, level: Level, file: LogFile) -> BoxedLayer {
    fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_writer(file)
        .with_filter(scoped_filter(scope, level))
        .boxed()
}

fn section_layers(
    name: &str,
    scope: Scope,
    section: &Section,
    home_dir: &Path,
    ansi: bool,
) -> Vec<BoxedLayer> {
    let scope = Arc::new(scope);
    let mut layers = Vec::new();

    if let Some(level) = level_of(&section.console_level) {
        layers.push(console_layer(scope.clone(), level, ansi));
    }

    let Some(file_level) = level_of(&section.file_level) else {
        return layers;
    };
    if section.file.trim().is_empty() {
        return layers;
    }
    let path = resolve_log_path(&section.file, home_dir);
    match open_log_file(&path, section) {
        Ok(file) => layers.push(file_layer(scope, file_level, file)),
        // Subscriber is not installed yet
        Err(e) => eprintln!("log file for '{name}' at {} unavailable: {e}", path.display()),
    }
    layers
}

fn build_layers(cfg: &LoggingConfig, home_dir: &Path, ansi: bool) -> Vec<BoxedLayer> {
    let mut owned: Vec<&String> = cfg.keys().filter(|k| *k != DEFAULT_SECTION).collect();
    owned.sort();

    let mut layers: Vec<BoxedLayer> = owned
        .iter()
        .flat_map(|name| {
            section_layers(name, Scope::Owned((*name).clone()), &cfg[*name], home_dir, ansi)
        })
        .collect();

    if let Some(section) = cfg.get(DEFAULT_SECTION) {
        let rest = Scope::Unclaimed(owned.into_iter().cloned().collect());
        layers.extend(section_layers(DEFAULT_SECTION, rest, section, home_dir, ansi));
    }
    layers
}

/// Install the global subscriber. Relative log files resolve against
/// `home_dir`. An empty config falls back to a plain console subscriber.
/// A second call is a no-op.
pub fn init_logging_from_config(cfg: &LoggingConfig, home_dir: &Path) {
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        let _ = fmt()
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .try_init();
        return;
    }

    let ansi = atty::is(atty::Stream::Stdout);
    let _ = Registry::default()
        .with(build_layers(cfg, home_dir, ansi))
        .try_init();
}
