//! Parser settings with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/<app>/<app>.toml`
//! 3. Explicit config file passed by the host
//! 4. Environment variables: `<APP>_*` prefix
//!
//! Only parser behavior is configurable here. The command model itself is
//! always declared in code.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::infrastructure::error::{InfraError, InfraResult};

/// Knobs that change how an argument vector is parsed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ParserSettings {
    /// Match command and option names exactly
    pub case_sensitive: bool,
    /// Reject surplus plain strings instead of passing them on as remaining
    pub strict: bool,
    /// Offer "did you mean" corrections for unknown names
    pub suggestions: bool,
    /// Largest edit distance still offered as a suggestion
    pub suggestion_distance: usize,
    /// Derive `--key value` pairs from the arguments after `--`
    pub parse_remaining_pairs: bool,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            strict: false,
            suggestions: true,
            suggestion_distance: 2,
            parse_remaining_pairs: true,
        }
    }
}

/// Raw settings for layered merging (`None` = not specified, inherit).
#[derive(Debug, Clone, Default, Deserialize)]
struct RawParserSettings {
    case_sensitive: Option<bool>,
    strict: Option<bool>,
    suggestions: Option<bool>,
    suggestion_distance: Option<usize>,
    parse_remaining_pairs: Option<bool>,
}

/// Get the XDG config directory for `app`.
pub fn global_config_dir(app: &str) -> Option<PathBuf> {
    ProjectDirs::from("", "", app).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file for `app`.
pub fn global_config_path(app: &str) -> Option<PathBuf> {
    global_config_dir(app).map(|dir| dir.join(format!("{app}.toml")))
}

/// Environment variable prefix for `app`: `my-tool` becomes `MY_TOOL`.
pub fn env_prefix(app: &str) -> String {
    app.to_uppercase().replace('-', "_")
}

/// Load a TOML file into RawParserSettings for manual merging.
fn load_raw_settings(path: &Path) -> InfraResult<RawParserSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| InfraError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| InfraError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl ParserSettings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawParserSettings) -> Self {
        Self {
            case_sensitive: overlay.case_sensitive.unwrap_or(self.case_sensitive),
            strict: overlay.strict.unwrap_or(self.strict),
            suggestions: overlay.suggestions.unwrap_or(self.suggestions),
            suggestion_distance: overlay
                .suggestion_distance
                .unwrap_or(self.suggestion_distance),
            parse_remaining_pairs: overlay
                .parse_remaining_pairs
                .unwrap_or(self.parse_remaining_pairs),
        }
    }

    /// Load settings for `app` with layered precedence.
    ///
    /// # Arguments
    /// * `app` - Application name, selects the global file and env prefix
    /// * `explicit` - Optional config file given by the host, must exist
    pub fn load(app: &str, explicit: Option<&Path>) -> InfraResult<Self> {
        let global = global_config_path(app);
        Self::load_layers(global.as_deref(), explicit, &env_prefix(app))
    }

    /// Layered loading with every source made explicit.
    #[instrument(level = "debug")]
    pub fn load_layers(
        global: Option<&Path>,
        explicit: Option<&Path>,
        env_prefix: &str,
    ) -> InfraResult<Self> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config, optional
        if let Some(global_path) = global {
            if global_path.exists() {
                debug!("global config: {}", global_path.display());
                current = current.merge_with(&load_raw_settings(global_path)?);
            }
        }

        // 3. Explicit config, required when given
        if let Some(path) = explicit {
            current = current.merge_with(&load_raw_settings(path)?);
        }

        // 4. Environment variables
        Self::apply_env_overrides(current, env_prefix)
    }

    fn apply_env_overrides(mut settings: Self, prefix: &str) -> InfraResult<Self> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_bool("case_sensitive") {
            settings.case_sensitive = val;
        }
        if let Ok(val) = config.get_bool("strict") {
            settings.strict = val;
        }
        if let Ok(val) = config.get_bool("suggestions") {
            settings.suggestions = val;
        }
        if let Ok(val) = config.get::<usize>("suggestion_distance") {
            settings.suggestion_distance = val;
        }
        if let Ok(val) = config.get_bool("parse_remaining_pairs") {
            settings.parse_remaining_pairs = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> InfraResult<String> {
        toml::to_string_pretty(self).map_err(|e| InfraError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template(app: &str) -> String {
        format!(
            r#"# {app} parser configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/{app}/{app}.toml
#   Explicit file passed by the application
#   Env:    {prefix}_* environment variables

# Match command and option names exactly
# case_sensitive = true

# Reject surplus arguments instead of collecting them as remaining
# strict = false

# "did you mean" corrections for unknown commands and options
# suggestions = true
# suggestion_distance = 2

# Collect --key value pairs after "--"
# parse_remaining_pairs = true
"#,
            prefix = env_prefix(app)
        )
    }
}

fn config_err(e: ConfigError) -> InfraError {
    InfraError::Config {
        message: e.to_string(),
    }
}
