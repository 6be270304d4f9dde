pub mod cli;
pub mod toml_config;

pub use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use crate::domain::model::MatchMode;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "tier1-mirrors")]
#[command(about = "List Arch Linux tier 1 mirror URLs grouped by protocol")]
pub struct CliConfig {
    /// TOML file with [source], [correlate] and [output] sections
    #[arg(short, long)]
    pub config: Option<String>,

    /// Mirror directory host, e.g. https://archlinux.org
    #[arg(long)]
    pub base_url: Option<String>,

    #[arg(long)]
    pub tier1_path: Option<String>,

    #[arg(long)]
    pub status_path: Option<String>,

    /// Per-request timeout; a timed out request counts as no data
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, value_enum)]
    pub match_mode: Option<MatchMode>,

    /// Write the JSON index to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Pretty-print the JSON index
    #[arg(long)]
    pub pretty: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    pub json_logs: bool,

    /// Show the resolved endpoints without fetching anything
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the config file (or defaults) and applies command line overrides.
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.source.base_url = base_url.clone();
        }
        if let Some(tier1_path) = &self.tier1_path {
            config.source.tier1_path = tier1_path.clone();
        }
        if let Some(status_path) = &self.status_path {
            config.source.status_path = status_path.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            config.source.timeout_seconds = timeout;
        }
        if let Some(mode) = self.match_mode {
            config.correlate.match_mode = mode;
        }
        if let Some(output) = &self.output {
            config.output.path = Some(output.clone());
        }
        if self.pretty {
            config.output.pretty = true;
        }

        Ok(config)
    }
}
