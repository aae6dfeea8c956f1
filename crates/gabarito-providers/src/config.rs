//! Oracle configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use gabarito_core::traits::VisionOracle;

use crate::anthropic::AnthropicOracle;
use crate::gemini::GeminiOracle;

/// Configuration for a single vision oracle.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OracleConfig {
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Anthropic {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
}

impl std::fmt::Debug for OracleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OracleConfig::Gemini {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            OracleConfig::Anthropic {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

/// Top-level gabarito configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GabaritoConfig {
    /// Oracle configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, OracleConfig>,
    /// Default oracle to use for grading.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Default model to use.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Path of the single-slot exam collection file.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    /// Output directory for rendered sheets.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-3-pro-image-preview".to_string()
}
fn default_store_path() -> PathBuf {
    PathBuf::from("./gabarito-exams.json")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./gabarito-output")
}

impl Default for GabaritoConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            store_path: default_store_path(),
            output_dir: default_output_dir(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_oracle_config(config: &OracleConfig) -> OracleConfig {
    match config {
        OracleConfig::Gemini { api_key, base_url } => OracleConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
        OracleConfig::Anthropic { api_key, base_url } => OracleConfig::Anthropic {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `gabarito.toml` in the current directory
/// 2. `~/.config/gabarito/config.toml`
///
/// Environment variable overrides: `GABARITO_GEMINI_KEY`,
/// `GABARITO_ANTHROPIC_KEY`.
pub fn load_config() -> Result<GabaritoConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<GabaritoConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("gabarito.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            global.exists().then_some(global)
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<GabaritoConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GabaritoConfig::default(),
    };

    // Apply env var overrides
    if let Ok(key) = std::env::var("GABARITO_GEMINI_KEY") {
        config
            .providers
            .entry("gemini".into())
            .or_insert(OracleConfig::Gemini {
                api_key: String::new(),
                base_url: None,
            });
        if let Some(OracleConfig::Gemini { api_key, .. }) = config.providers.get_mut("gemini") {
            *api_key = key;
        }
    }

    if let Ok(key) = std::env::var("GABARITO_ANTHROPIC_KEY") {
        config
            .providers
            .entry("anthropic".into())
            .or_insert(OracleConfig::Anthropic {
                api_key: String::new(),
                base_url: None,
            });
        if let Some(OracleConfig::Anthropic { api_key, .. }) =
            config.providers.get_mut("anthropic")
        {
            *api_key = key;
        }
    }

    // Resolve env vars in all oracle configs
    let resolved: HashMap<String, OracleConfig> = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_oracle_config(v)))
        .collect();
    config.providers = resolved;

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("gabarito"))
}

/// Create an oracle instance from its configuration.
pub fn create_oracle(config: &OracleConfig) -> Result<Box<dyn VisionOracle>> {
    match config {
        OracleConfig::Gemini { api_key, base_url } => {
            Ok(Box::new(GeminiOracle::new(api_key, base_url.clone())))
        }
        OracleConfig::Anthropic { api_key, base_url } => {
            Ok(Box::new(AnthropicOracle::new(api_key, base_url.clone())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_GABARITO_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_GABARITO_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_GABARITO_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_GABARITO_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = GabaritoConfig::default();
        assert_eq!(config.default_provider, "gemini");
        assert_eq!(config.default_model, "gemini-3-pro-image-preview");
        assert_eq!(config.store_path, PathBuf::from("./gabarito-exams.json"));
    }

    #[test]
    fn parse_oracle_config() {
        let toml_str = r#"
default_provider = "gemini"
default_model = "gemini-3-pro-image-preview"
store_path = "./provas.json"

[providers.gemini]
type = "gemini"
api_key = "sk-gemini"

[providers.anthropic]
type = "anthropic"
api_key = "sk-anthropic"
"#;
        let config: GabaritoConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.providers.len(), 2);
        assert!(matches!(
            config.providers.get("gemini"),
            Some(OracleConfig::Gemini { .. })
        ));
        assert_eq!(config.store_path, PathBuf::from("./provas.json"));
    }

    #[test]
    fn debug_masks_api_keys() {
        let config = OracleConfig::Gemini {
            api_key: "super-secret".into(),
            base_url: None,
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("***"));
    }
}
