use anyhow::Result;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure that can be loaded from CLI, config file, or environment
///
/// Example configuration file content
/// # Sora Proxy Configuration
///
/// # Server configuration
/// listen_on_port = 8787
///
/// # Upstream provider
/// upstream_base_url = "https://api.openai.com/v1"
///
/// # Browser UI (served as router fallback when the directory exists)
/// static_dir = "public"
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(version, about, long_about = None)]
#[serde(default)]
pub struct Config {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8787)]
    #[serde(default = "default_port")]
    pub listen_on_port: u16,

    /// Base URL of the video generation provider
    #[arg(short, long, default_value = "https://api.openai.com/v1")]
    #[serde(default = "default_upstream_base_url")]
    pub upstream_base_url: String,

    /// Directory of static assets served at the root
    #[arg(short, long, default_value = "public")]
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Configuration file path (overrides all other arguments)
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_on_port: default_port(),
            upstream_base_url: default_upstream_base_url(),
            static_dir: default_static_dir(),
            config: None,
        }
    }
}

impl Config {
    /// Load configuration from CLI args, optionally merging with a config file
    pub fn load() -> Result<Self> {
        // First parse CLI args
        let mut config = Config::parse();

        // If a config file is specified, load it and merge
        if let Some(config_path) = &config.config {
            let file_config = Self::from_file(Path::new(config_path))?;
            config = config.merge_with_file(file_config);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Merge with file config, CLI args take precedence
    fn merge_with_file(mut self, file_config: Config) -> Self {
        // If CLI value is default, use file value
        if self.listen_on_port == default_port() {
            self.listen_on_port = file_config.listen_on_port;
        }
        if self.upstream_base_url == default_upstream_base_url() {
            self.upstream_base_url = file_config.upstream_base_url;
        }
        if self.static_dir == default_static_dir() {
            self.static_dir = file_config.static_dir;
        }

        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.upstream_base_url.is_empty() {
            return Err(anyhow::anyhow!("Upstream base URL cannot be empty"));
        }
        if !self.upstream_base_url.starts_with("http://")
            && !self.upstream_base_url.starts_with("https://")
        {
            return Err(anyhow::anyhow!(
                "Upstream base URL must start with http:// or https://"
            ));
        }

        Ok(())
    }
}

// Default value functions
fn default_port() -> u16 {
    8787
}

fn default_upstream_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_static_dir() -> String {
    "public".to_string()
}
