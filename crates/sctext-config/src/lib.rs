//! Configuration management for sctext.
//!
//! Parses `sctext.toml` configuration files with serde and provides
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
//! - `store.root`
//!
//! ## Example
//!
//! ```toml
//! [store]
//! root = "${SITE_ROOT:-pages}"
//!
//! [grammar]
//! enabled = true
//!
//! [catalog]
//! structural = ["dipi_grid"]
//!
//! [[catalog.tags]]
//! name = "dipi_typing_text"
//! inner_content = false
//! attributes = ["before_text", "after_text"]
//!
//! [access]
//! editable = ["home.txt", "layouts/footer.txt"]
//! ```

mod expand;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use sctext_shortcode::{Catalog, FallbackExtractor, Grammar, TagPolicy};
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override document store root.
    pub store_root: Option<PathBuf>,
    /// Override whether the host grammar is used.
    pub grammar_enabled: Option<bool>,
    /// Override fallback tag prefix.
    pub fallback_prefix: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "sctext.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store configuration (paths are relative strings from TOML).
    store: StoreConfigRaw,
    /// Host grammar configuration.
    pub grammar: GrammarConfig,
    /// Tag catalog additions.
    pub catalog: CatalogConfig,
    /// Regex fallback configuration.
    pub fallback: FallbackConfig,
    /// Editable document allow-list.
    pub access: AccessConfig,

    /// Resolved store configuration (set after loading).
    #[serde(skip)]
    pub store_resolved: StoreConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw store configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StoreConfigRaw {
    root: Option<String>,
}

/// Resolved store configuration with absolute paths.
#[derive(Debug, Default)]
pub struct StoreConfig {
    /// Root directory of the filesystem document store.
    pub root: PathBuf,
}

/// Host grammar configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GrammarConfig {
    /// Whether the host grammar is available. When false, the regex
    /// fallback is used.
    pub enabled: bool,
    /// Registered tag names. When unset, every valid name is a shortcode.
    pub tags: Option<Vec<String>>,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tags: None,
        }
    }
}

/// Tag catalog configuration, layered over the built-in catalog.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Start from the built-in page-builder catalog.
    pub builtin: bool,
    /// Additional structural tags.
    pub structural: Vec<String>,
    /// Replacement heuristic attribute priority list.
    pub heuristic_attributes: Option<Vec<String>>,
    /// Additional or overriding tag policies.
    pub tags: Vec<TagConfig>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            builtin: true,
            structural: Vec::new(),
            heuristic_attributes: None,
            tags: Vec::new(),
        }
    }
}

/// One tag policy.
#[derive(Debug, Deserialize)]
pub struct TagConfig {
    /// Tag name.
    pub name: String,
    /// Whether the body is text.
    #[serde(default)]
    pub inner_content: bool,
    /// Text attribute names.
    #[serde(default)]
    pub attributes: Vec<String>,
}

/// Regex fallback configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Tag name prefix.
    pub prefix: String,
    /// Replacement attribute priority list.
    pub attributes: Option<Vec<String>>,
    /// Replacement structural name suffixes.
    pub structural_prefixes: Option<Vec<String>>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            prefix: sctext_shortcode::DEFAULT_FALLBACK_PREFIX.to_owned(),
            attributes: None,
            structural_prefixes: None,
        }
    }
}

/// Access configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct AccessConfig {
    /// Document ids that may be edited. When unset, every document may be.
    pub editable: Option<Vec<String>>,
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
        /// Config field path (e.g., "`store.root`").
        field: String,
        /// Error message (e.g., "${`SITE_ROOT`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require every entry of a list to be non-empty.
fn require_entries(values: &[String], field: &str) -> Result<(), ConfigError> {
    values
        .iter()
        .try_for_each(|value| require_non_empty(value, field))
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `sctext.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_from(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(root) = &settings.store_root {
            self.store_resolved.root.clone_from(root);
        }
        if let Some(enabled) = settings.grammar_enabled {
            self.grammar.enabled = enabled;
        }
        if let Some(prefix) = &settings.fallback_prefix {
            self.fallback.prefix.clone_from(prefix);
        }
    }

    /// Build the tag catalog: the built-in table (unless disabled) with the
    /// configured structural tags, heuristic list and tag policies on top.
    #[must_use]
    pub fn catalog(&self) -> Catalog {
        let mut catalog = if self.catalog.builtin {
            Catalog::builtin()
        } else {
            Catalog::empty()
        };

        for name in &self.catalog.structural {
            catalog = catalog.with_structural(name.as_str());
        }
        if let Some(heuristic) = &self.catalog.heuristic_attributes {
            catalog = catalog.with_heuristic_attributes(heuristic.iter().map(String::as_str));
        }
        for tag in &self.catalog.tags {
            let mut policy = TagPolicy::attributes(tag.attributes.iter().map(String::as_str));
            if tag.inner_content {
                policy = policy.with_inner_content();
            }
            catalog = catalog.with_tag(tag.name.as_str(), policy);
        }

        catalog
    }

    /// Host grammar, or `None` when disabled.
    #[must_use]
    pub fn grammar(&self) -> Option<Grammar> {
        if !self.grammar.enabled {
            return None;
        }
        Some(match &self.grammar.tags {
            Some(tags) => Grammar::registered(tags.iter().map(String::as_str)),
            None => Grammar::permissive(),
        })
    }

    /// Regex fallback extractor.
    #[must_use]
    pub fn fallback(&self) -> FallbackExtractor {
        let mut fallback = FallbackExtractor::new().with_prefix(self.fallback.prefix.as_str());
        if let Some(attributes) = &self.fallback.attributes {
            fallback = fallback.with_attributes(attributes.iter().map(String::as_str));
        }
        if let Some(structural) = &self.fallback.structural_prefixes {
            fallback = fallback.with_structural_prefixes(structural.iter().map(String::as_str));
        }
        fallback
    }

    /// Search for config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
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

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            store: StoreConfigRaw::default(),
            grammar: GrammarConfig::default(),
            catalog: CatalogConfig::default(),
            fallback: FallbackConfig::default(),
            access: AccessConfig::default(),
            store_resolved: StoreConfig {
                root: base.to_path_buf(),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        // Validate configuration after loading and resolution
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_grammar()?;
        self.validate_catalog()?;
        self.validate_fallback()?;
        if let Some(editable) = &self.access.editable {
            require_entries(editable, "access.editable")?;
        }
        Ok(())
    }

    fn validate_grammar(&self) -> Result<(), ConfigError> {
        if let Some(tags) = &self.grammar.tags {
            if tags.is_empty() {
                return Err(ConfigError::Validation(
                    "grammar.tags cannot be an empty list".to_owned(),
                ));
            }
            require_entries(tags, "grammar.tags")?;
        }
        Ok(())
    }

    fn validate_catalog(&self) -> Result<(), ConfigError> {
        require_entries(&self.catalog.structural, "catalog.structural")?;
        if let Some(heuristic) = &self.catalog.heuristic_attributes {
            require_entries(heuristic, "catalog.heuristic_attributes")?;
        }

        let mut seen = HashSet::new();
        for tag in &self.catalog.tags {
            require_non_empty(&tag.name, "catalog.tags.name")?;
            require_entries(&tag.attributes, "catalog.tags.attributes")?;
            if !seen.insert(tag.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "catalog.tags has duplicate tag {}",
                    tag.name
                )));
            }
            if self.catalog.structural.contains(&tag.name) {
                return Err(ConfigError::Validation(format!(
                    "catalog tag {} cannot be both structural and text",
                    tag.name
                )));
            }
        }
        Ok(())
    }

    fn validate_fallback(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.fallback.prefix, "fallback.prefix")?;
        if let Some(attributes) = &self.fallback.attributes {
            require_entries(attributes, "fallback.attributes")?;
        }
        if let Some(structural) = &self.fallback.structural_prefixes {
            require_entries(structural, "fallback.structural_prefixes")?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref root) = self.store.root {
            self.store.root = Some(expand::expand_env(root, "store.root")?);
        }
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.store_resolved = StoreConfig {
            root: config_dir.join(self.store.root.as_deref().unwrap_or(".")),
        };
    }
}
