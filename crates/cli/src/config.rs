//! Configuration loading and management

use anyhow::{Context, Result};
use expense_ocr_domain::ModelSelection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub secrets: SecretsConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Echo `url` and the type field in success envelopes
    #[serde(default)]
    pub echo_input: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// 0 keeps the HTTP client's default
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub models: ModelSelection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretsConfig {
    /// none, ssm, secrets_manager
    #[serde(default = "default_secret_store")]
    pub store: String,

    #[serde(default = "default_secret_name")]
    pub name: String,

    #[serde(default = "default_secret_region")]
    pub region: String,

    #[serde(default = "default_aws_command")]
    pub command: String,

    #[serde(default = "default_secret_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

// Default value functions
fn default_provider() -> String {
    "mistral".to_string()
}

fn default_base_url() -> String {
    "https://api.mistral.ai".to_string()
}

fn default_api_key_env() -> String {
    "MISTRAL_API_KEY".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_secret_store() -> String {
    "ssm".to_string()
}

fn default_secret_name() -> String {
    "MISTRAL_API_KEY".to_string()
}

fn default_secret_region() -> String {
    "eu-west-3".to_string()
}

fn default_aws_command() -> String {
    "aws".to_string()
}

fn default_secret_timeout() -> u64 {
    10
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout(),
            models: ModelSelection::default(),
        }
    }
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            store: default_secret_store(),
            name: default_secret_name(),
            region: default_secret_region(),
            command: default_aws_command(),
            timeout_secs: default_secret_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("EXPENSE_OCR")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# expense-ocr configuration

[general]
# Echo url and the type field back in success envelopes
echo_input = false

[llm]
provider = "mistral"  # mistral, stub
base_url = "https://api.mistral.ai"
api_key_env = "MISTRAL_API_KEY"
# 0 keeps the HTTP client default
timeout_secs = 60

[llm.models]
image = "pixtral-large-latest"
document = "mistral-small-latest"

# Used when the api_key_env variable is unset
[secrets]
store = "ssm"  # none, ssm, secrets_manager
name = "MISTRAL_API_KEY"
region = "eu-west-3"
command = "aws"
timeout_secs = 10

[server]
bind = "0.0.0.0:8080"
"#
        .to_string()
    }
}
