use config::{Config, ConfigError, Environment, File, FileFormat};
use engine::MalformedUriPolicy;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Defaults compiled into the binary. Installed builds have no source tree
/// to read them from.
const DEFAULT_CONFIG: &str = include_str!("../global_config.yaml");

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_dev_env")]
    pub dev_env: String,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub deep_link: DeepLinkConfig,
}

fn default_dev_env() -> String {
    "dev".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct DeepLinkConfig {
    /// Abort startup when a deep link cannot be rewritten, instead of
    /// forwarding it unchanged. Meant for development builds.
    #[serde(default)]
    pub strict: bool,
}

impl DeepLinkConfig {
    pub fn policy(&self) -> MalformedUriPolicy {
        if self.strict {
            MalformedUriPolicy::Strict
        } else {
            MalformedUriPolicy::PassThrough
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub verbose: bool,
    pub format: LoggingFormatConfig,
    pub levels: LoggingLevelsConfig,
    #[serde(default)]
    pub redaction: RedactionConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingFormatConfig {
    pub show_time: bool,
    pub location: LoggingLocationConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingLocationConfig {
    pub show_file: bool,
    pub show_line: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingLevelsConfig {
    pub debug: bool,
    pub info: bool,
    pub warning: bool,
    pub error: bool,
    pub critical: bool,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct RedactionConfig {
    #[serde(default = "true_default")]
    pub enabled: bool,
    #[serde(default = "true_default")]
    pub use_default_pii: bool,
    #[serde(default)]
    pub patterns: Vec<RedactionPattern>,
}

fn true_default() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RedactionPattern {
    pub name: String,
    pub regex: String,
    pub placeholder: String,
}

static CONFIG: RwLock<Option<&'static AppConfig>> = RwLock::new(None);

pub fn get_config() -> &'static AppConfig {
    if let Some(cfg) = *CONFIG.read().unwrap_or_else(|e| e.into_inner()) {
        return cfg;
    }

    let mut write = CONFIG.write().unwrap_or_else(|e| e.into_inner());
    if let Some(cfg) = *write {
        return cfg;
    }

    // The subscriber is configured from this value, so a bad override can
    // only be reported on stderr.
    let config = load_config().unwrap_or_else(|e| {
        eprintln!("ignoring configuration overrides: {}", e);
        fallback_config()
    });
    let cfg: &'static AppConfig = Box::leak(Box::new(config));
    *write = Some(cfg);
    cfg
}

#[cfg(test)]
pub fn reset_config() {
    let mut write = CONFIG.write().unwrap();
    *write = None;
}

/// Resolve an override file next to Cargo.toml, falling back to a path
/// relative to the repo root.
fn config_file(name: &str) -> std::path::PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let base_path = std::path::Path::new(&manifest_dir);
    if base_path.join(name).exists() {
        base_path.join(name)
    } else {
        std::path::Path::new("src-tauri").join(name)
    }
}

fn load_config() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Yaml))
        // Deployment overrides
        .add_source(File::from(config_file("production_config.yaml")).required(false))
        // Load local override
        .add_source(File::from(config_file(".global_config.yaml")).required(false))
        // Map nested env vars like APP__DEEP_LINK__STRICT=true
        .add_source(Environment::with_prefix("APP").separator("__"));

    builder.build()?.try_deserialize()
}

/// The compiled-in defaults alone, used when an override does not load.
fn fallback_config() -> AppConfig {
    Config::builder()
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Yaml))
        .build()
        .and_then(|c| c.try_deserialize::<AppConfig>())
        .unwrap_or_else(|e| {
            eprintln!("built-in configuration is invalid: {}", e);
            AppConfig::default()
        })
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dev_env: default_dev_env(),
            logging: LoggingConfig {
                verbose: false,
                format: LoggingFormatConfig {
                    show_time: true,
                    location: LoggingLocationConfig {
                        show_file: false,
                        show_line: false,
                    },
                },
                levels: LoggingLevelsConfig {
                    debug: false,
                    info: true,
                    warning: true,
                    error: true,
                    critical: true,
                },
                redaction: RedactionConfig {
                    enabled: true,
                    use_default_pii: true,
                    patterns: Vec::new(),
                },
            },
            deep_link: DeepLinkConfig::default(),
        }
    }
}
