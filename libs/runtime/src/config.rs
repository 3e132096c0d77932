//! Application configuration for HackMatch binaries.
//!
//! Sources, lowest precedence first: built-in defaults, the YAML config
//! file, per-module files from `modules_dir`, then `HACKMATCH__*`
//! environment variables (`HACKMATCH__SERVER__PORT=9000` → `server.port`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::paths::home_dir::resolve_home_dir;

/// Environment prefix; `__` separates nested keys.
pub const ENV_PREFIX: &str = "HACKMATCH__";

/// Directory under the platform home used when `server.home_dir` is empty.
const DEFAULT_HOME_SUBDIR: &str = ".hackmatch";

/// Typed global sections plus a free-form bag of module sections.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// `None` means "use the built-in console + file setup".
    pub logging: Option<LoggingConfig>,
    /// Directory of `<module>.yaml` files; relative to the config file.
    #[serde(default)]
    pub modules_dir: Option<String>,
    /// Module name → raw section, deserialized by the module itself.
    #[serde(default)]
    pub modules: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Empty selects `$HOME/.hackmatch` (`%APPDATA%\.hackmatch` on Windows).
    /// Always absolute after loading.
    pub home_dir: String,
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub timeout_sec: u64,
}

/// Logging sections keyed by crate/target prefix; `default` catches the rest.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    /// `trace` … `error`, or `off`.
    pub console_level: String,
    /// Relative paths resolve against `server.home_dir`. Empty disables the file sink.
    pub file: String,
    #[serde(default)]
    pub file_level: String,
    pub max_age_days: Option<u32>,
    #[serde(default)]
    pub max_backups: Option<usize>,
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            home_dir: String::new(),
            host: "127.0.0.1".to_string(),
            port: 8087,
            timeout_sec: 0,
        }
    }
}

/// Console at `info`, rotated JSON file at `debug` under `logs/`.
pub fn default_logging_config() -> LoggingConfig {
    HashMap::from([(
        "default".to_string(),
        Section {
            console_level: "info".to_string(),
            file: "logs/hackmatch.log".to_string(),
            file_level: "debug".to_string(),
            max_age_days: Some(7),
            max_backups: Some(3),
            max_size_mb: Some(100),
        },
    )])
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: Some(default_logging_config()),
            modules_dir: None,
            modules: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Load `config_path` over the defaults, then apply `modules_dir` files
    /// and the environment. `server.home_dir` comes back absolute and exists.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let path = config_path.as_ref();
        if !path.is_file() {
            bail!("Config file not found: {}", path.display());
        }

        // Only `server` has defaults here; a file without `logging` keeps it None.
        let base = AppConfig {
            logging: None,
            ..AppConfig::default()
        };
        let mut config: AppConfig = Figment::new()
            .merge(Serialized::defaults(base))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        if let Some(dir) = config.modules_dir.as_deref() {
            let dir = relative_to(path, dir);
            load_module_files(&dir, &mut config.modules)?;
        }
        config.server.home_dir = normalize_home_dir(&config.server.home_dir)?;
        Ok(config)
    }

    /// Load from `config_path` when given; defaults otherwise.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_layered(path);
        }
        let mut config = Self::default();
        config.server.home_dir = normalize_home_dir(&config.server.home_dir)?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }

    /// `--port` replaces `server.port`; each `-v` raises the default console
    /// level one step (`debug`, then `trace`).
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.server.port = port;
        }

        let level = match args.verbose {
            0 => return,
            1 => "debug",
            _ => "trace",
        };
        let logging = self.logging.get_or_insert_with(default_logging_config);
        if let Some(section) = logging.get_mut("default") {
            section.console_level = level.to_string();
        }
    }

    /// `host:port` the HTTP server should bind to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Flags the binary forwards to the config layer.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub port: Option<u16>,
    pub print_config: bool,
    pub verbose: u8,
}

/// Read-only view over the loaded config, handed to the module runtime.
#[derive(Debug, Clone)]
pub struct AppConfigProvider(AppConfig);

impl AppConfigProvider {
    pub fn new(config: AppConfig) -> Self {
        Self(config)
    }

    pub fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
        self.0.modules.get(module_name)
    }

    pub fn app(&self) -> &AppConfig {
        &self.0
    }
}

fn normalize_home_dir(raw: &str) -> Result<String> {
    let explicit = Some(raw.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let resolved = resolve_home_dir(explicit, DEFAULT_HOME_SUBDIR, true)
        .context("Failed to resolve server.home_dir")?;
    Ok(resolved.to_string_lossy().into_owned())
}

fn relative_to(config_path: &Path, dir: &str) -> PathBuf {
    let dir = Path::new(dir);
    match config_path.parent() {
        Some(parent) if dir.is_relative() => parent.join(dir),
        _ => dir.to_path_buf(),
    }
}

/// Each `<name>.yaml`/`<name>.yml` replaces `modules.<name>`. A missing
/// directory is not an error.
fn load_module_files(dir: &Path, modules: &mut HashMap<String, serde_json::Value>) -> Result<()> {
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "modules_dir not found, skipping");
        return Ok(());
    }
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list modules_dir {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if !path.is_file() || !is_yaml {
            continue;
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read module config {}", path.display()))?;
        let section: serde_json::Value = serde_yaml::from_str(&raw)
            .with_context(|| format!("Invalid YAML in {}", path.display()))?;
        modules.insert(name.to_string(), section);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    /// Write `body` as `hackmatch.yaml` with `server.home_dir` inside the temp dir.
    fn config_file(body: &str) -> (TempDir, PathBuf) {
        let tmp = tempdir().unwrap();
        let home = tmp.path().join("home").to_string_lossy().replace('\\', "/");
        let path = tmp.path().join("hackmatch.yaml");
        let server = format!("server:\n  home_dir: \"{home}\"\n  host: \"127.0.0.1\"\n  port: 8087\n");
        fs::write(&path, server + body).unwrap();
        (tmp, path)
    }

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:8087");
        assert_eq!(config.server.home_dir, "");
        assert!(config.modules.is_empty());

        let default = &config.logging.as_ref().unwrap()["default"];
        assert_eq!(default.console_level, "info");
        assert_eq!(default.file, "logs/hackmatch.log");
    }

    #[test]
    fn file_values_override_defaults() {
        let (tmp, path) = config_file(
            r#"
logging:
  default:
    console_level: warn
    file: ""
modules:
  matching:
    max_photos: 6
"#,
        );
        let config = AppConfig::load_layered(&path).unwrap();

        let home = PathBuf::from(&config.server.home_dir);
        assert!(home.is_absolute());
        assert_eq!(home, tmp.path().join("home"));
        assert!(home.is_dir());

        assert_eq!(config.logging.as_ref().unwrap()["default"].console_level, "warn");
        let provider = AppConfigProvider::new(config);
        assert_eq!(provider.get_module_config("matching").unwrap()["max_photos"], 6);
        assert!(provider.get_module_config("api_ingress").is_none());
    }

    #[test]
    fn logging_stays_unset_when_file_omits_it() {
        let (_tmp, path) = config_file("");
        let config = AppConfig::load_layered(&path).unwrap();
        assert!(config.logging.is_none());
        assert_eq!(config.server.timeout_sec, 0);
    }

    #[test]
    fn missing_file_and_unknown_keys_are_errors() {
        let tmp = tempdir().unwrap();
        let err = AppConfig::load_layered(tmp.path().join("absent.yaml")).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));

        let (_tmp, path) = config_file("database:\n  url: \"sqlite://x.db\"\n");
        let err = AppConfig::load_layered(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn modules_dir_is_relative_to_config_and_wins() {
        let (tmp, path) = config_file(
            r#"
modules_dir: "modules.d"
modules:
  api_ingress:
    bind_addr: "127.0.0.1:1111"
  matching:
    candidate_order: "source"
"#,
        );
        let dir = tmp.path().join("modules.d");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("api_ingress.yml"), "bind_addr: \"0.0.0.0:9999\"\n").unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let config = AppConfig::load_layered(&path).unwrap();
        assert_eq!(config.modules["api_ingress"]["bind_addr"], "0.0.0.0:9999");
        assert_eq!(config.modules["matching"]["candidate_order"], "source");
        assert!(!config.modules.contains_key("notes"));
    }

    #[test]
    fn missing_modules_dir_is_ignored() {
        let (_tmp, path) = config_file("modules_dir: \"nowhere\"\n");
        assert!(AppConfig::load_layered(&path).unwrap().modules.is_empty());
    }

    #[test]
    fn cli_overrides_port_and_verbosity() {
        for (verbose, expected) in [(0, "info"), (1, "debug"), (2, "trace"), (5, "trace")] {
            let mut config = AppConfig::default();
            config.apply_cli_overrides(&CliArgs {
                port: Some(3000),
                verbose,
                ..Default::default()
            });
            assert_eq!(config.server.port, 3000);
            assert_eq!(
                config.logging.as_ref().unwrap()["default"].console_level,
                expected
            );
        }
    }

    #[test]
    fn verbosity_restores_logging_dropped_by_file() {
        let mut config = AppConfig {
            logging: None,
            ..AppConfig::default()
        };
        config.apply_cli_overrides(&CliArgs {
            verbose: 1,
            ..Default::default()
        });
        assert_eq!(
            config.logging.as_ref().unwrap()["default"].console_level,
            "debug"
        );
    }

    #[test]
    fn yaml_output_contains_server_section() {
        let yaml = AppConfig::default().to_yaml().unwrap();
        assert!(yaml.contains("port: 8087"));
        assert!(yaml.contains("127.0.0.1"));
    }
}
