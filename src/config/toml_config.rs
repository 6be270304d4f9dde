use crate::core::ConfigProvider;
use crate::domain::model::MatchMode;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://archlinux.org";
pub const DEFAULT_TIER1_PATH: &str = "/mirrors/tier/1/";
pub const DEFAULT_STATUS_PATH: &str = "/mirrors/status/json/";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

const MAX_TIMEOUT_SECONDS: u64 = 300;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub source: SourceConfig,
    pub correlate: CorrelateConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub tier1_path: String,
    pub status_path: String,
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            tier1_path: DEFAULT_TIER1_PATH.to_string(),
            status_path: DEFAULT_STATUS_PATH.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelateConfig {
    pub match_mode: MatchMode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Write the index to this file instead of stdout.
    pub path: Option<String>,
    pub pretty: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(&path).map_err(|e| EtlError::ConfigError {
                message: format!("cannot read {}: {}", path.as_ref().display(), e),
            })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MIRROR_BASE_URL})；未設定的變數回報 MissingConfigError
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        use std::sync::LazyLock;

        static ENV_VAR: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

        if let Some(missing) = ENV_VAR
            .captures_iter(content)
            .map(|caps| caps[1].to_string())
            .find(|var_name| std::env::var(var_name).is_err())
        {
            return Err(EtlError::MissingConfigError {
                field: format!("${{{}}}", missing),
            });
        }

        Ok(ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                std::env::var(&caps[1]).unwrap_or_default()
            })
            .into_owned())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("source.base_url", &self.source.base_url)?;
        validation::validate_endpoint_path("source.tier1_path", &self.source.tier1_path)?;
        validation::validate_endpoint_path("source.status_path", &self.source.status_path)?;
        validation::validate_range(
            "source.timeout_seconds",
            self.source.timeout_seconds,
            1,
            MAX_TIMEOUT_SECONDS,
        )?;

        if let Some(path) = &self.output.path {
            validation::validate_path("output.path", path)?;
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn base_url(&self) -> &str {
        &self.source.base_url
    }

    fn tier1_path(&self) -> &str {
        &self.source.tier1_path
    }

    fn status_path(&self) -> &str {
        &self.source.status_path
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_seconds)
    }

    fn match_mode(&self) -> MatchMode {
        self.correlate.match_mode
    }

    fn output_path(&self) -> Option<&str> {
        self.output.path.as_deref()
    }

    fn pretty(&self) -> bool {
        self.output.pretty
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
