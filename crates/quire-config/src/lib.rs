//! Configuration management for Quire.
//!
//! Parses `quire.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `storage.templates_dir`
//! - `pdf.chrome_path`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override template store directory.
    pub templates_dir: Option<PathBuf>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
    /// Override Chrome executable path.
    pub chrome_path: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "quire.toml";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PAPER_WIDTH_IN: f64 = 8.27;
const DEFAULT_PAPER_HEIGHT_IN: f64 = 11.7;
const DEFAULT_PRICE_DECIMALS: usize = 2;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration (paths are relative strings from TOML).
    storage: StorageConfigRaw,
    /// Template cache configuration.
    pub cache: CacheConfig,
    /// PDF configuration as parsed from TOML.
    pdf: PdfConfigRaw,
    /// Rendering configuration.
    pub render: RenderConfig,

    /// Resolved storage configuration (set after loading).
    #[serde(skip)]
    pub storage_resolved: StorageConfig,
    /// Resolved PDF configuration (set after loading).
    #[serde(skip)]
    pub pdf_resolved: PdfConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StorageConfigRaw {
    templates_dir: Option<String>,
}

/// Resolved storage configuration with absolute paths.
#[derive(Debug, Default)]
pub struct StorageConfig {
    /// Directory holding template records.
    pub templates_dir: PathBuf,
}

/// Template cache configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache `find_by_type` lookups in memory.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PdfConfigRaw {
    chrome_path: Option<String>,
    timeout_secs: Option<u64>,
    paper_width_in: Option<f64>,
    paper_height_in: Option<f64>,
}

/// Resolved PDF configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfConfig {
    /// Explicit Chrome executable. `None` means discover at runtime.
    pub chrome_path: Option<PathBuf>,
    /// Conversion timeout.
    pub timeout: Duration,
    /// Paper width in inches.
    pub paper_width_in: f64,
    /// Paper height in inches.
    pub paper_height_in: f64,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            paper_width_in: DEFAULT_PAPER_WIDTH_IN,
            paper_height_in: DEFAULT_PAPER_HEIGHT_IN,
        }
    }
}

/// Rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Decimal places for price-like quotation variables.
    pub price_decimals: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            price_decimals: DEFAULT_PRICE_DECIMALS,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`pdf.chrome_path`").
        field: String,
        /// Error message (e.g., "${`CHROME`} not set").
        message: String,
    },
}

fn require_positive(value: f64, field: &str) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "{field} must be a positive number"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `quire.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails
    /// or a value is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(templates_dir) = &settings.templates_dir {
            self.storage_resolved.templates_dir.clone_from(templates_dir);
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.cache.enabled = cache_enabled;
        }
        if let Some(chrome_path) = &settings.chrome_path {
            self.pdf_resolved.chrome_path = Some(chrome_path.clone());
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_from(current)
    }

    fn discover_from(mut current: PathBuf) -> Option<PathBuf> {
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            storage: StorageConfigRaw::default(),
            cache: CacheConfig::default(),
            pdf: PdfConfigRaw::default(),
            render: RenderConfig::default(),
            storage_resolved: StorageConfig {
                templates_dir: base.join("templates"),
            },
            pdf_resolved: PdfConfig::default(),
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        const MAX_PRICE_DECIMALS: usize = 10;

        if self.pdf_resolved.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "pdf.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        require_positive(self.pdf_resolved.paper_width_in, "pdf.paper_width_in")?;
        require_positive(self.pdf_resolved.paper_height_in, "pdf.paper_height_in")?;

        if self.render.price_decimals > MAX_PRICE_DECIMALS {
            return Err(ConfigError::Validation(format!(
                "render.price_decimals cannot exceed {MAX_PRICE_DECIMALS}"
            )));
        }

        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.storage.templates_dir {
            self.storage.templates_dir = Some(expand::expand_env(dir, "storage.templates_dir")?);
        }
        if let Some(ref chrome) = self.pdf.chrome_path {
            self.pdf.chrome_path = Some(expand::expand_env(chrome, "pdf.chrome_path")?);
        }
        Ok(())
    }

    /// Resolve relative paths against the config directory and fill defaults.
    fn resolve(&mut self, config_dir: &Path) {
        self.storage_resolved = StorageConfig {
            templates_dir: config_dir
                .join(self.storage.templates_dir.as_deref().unwrap_or("templates")),
        };

        let defaults = PdfConfig::default();
        self.pdf_resolved = PdfConfig {
            chrome_path: self.pdf.chrome_path.as_deref().map(|p| config_dir.join(p)),
            timeout: self
                .pdf
                .timeout_secs
                .map_or(defaults.timeout, Duration::from_secs),
            paper_width_in: self.pdf.paper_width_in.unwrap_or(defaults.paper_width_in),
            paper_height_in: self.pdf.paper_height_in.unwrap_or(defaults.paper_height_in),
        };
    }
}
