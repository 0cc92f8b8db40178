use crate::adapters::weatherstack::DEFAULT_BASE_URL;
use crate::core::ServiceConfig;
use crate::utils::error::ConfigError;
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerSection,
    pub store: StoreSection,
    pub weather: WeatherSection,
    pub logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_port")]
    pub port: u16,
    pub request_timeout_seconds: Option<u64>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            request_timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSection {
    pub url: String,
    pub api_key: String,
    pub table: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSection {
    pub base_url: Option<String>,
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

fn default_port() -> u16 {
    4000
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ConfigError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${WEATHERSTACK_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn verbose(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.verbose)
            .unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl ServiceConfig for TomlConfig {
    fn listen_port(&self) -> u16 {
        self.server.port
    }

    fn store_url(&self) -> &str {
        &self.store.url
    }

    fn store_api_key(&self) -> &str {
        &self.store.api_key
    }

    fn properties_table(&self) -> &str {
        self.store.table.as_deref().unwrap_or("properties")
    }

    fn weather_base_url(&self) -> &str {
        self.weather.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    fn weather_api_key(&self) -> &str {
        &self.weather.api_key
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.server.request_timeout_seconds.unwrap_or(30)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("store.url", &self.store.url)?;
        validation::validate_url("weather.base_url", self.weather_base_url())?;

        // 未替換的 ${VAR} 代表環境變數不存在
        for (field, value) in [
            ("store.api_key", &self.store.api_key),
            ("weather.api_key", &self.weather.api_key),
        ] {
            if value.starts_with("${") {
                return Err(ConfigError::MissingConfigError {
                    field: field.to_string(),
                });
            }
            validation::validate_secret(field, value)?;
        }

        validation::validate_non_empty_string("store.table", self.properties_table())?;
        validation::validate_range("server.port", self.server.port, 1, u16::MAX)?;
        validation::validate_positive_number(
            "server.request_timeout_seconds",
            self.request_timeout_seconds(),
            1,
        )?;
        Ok(())
    }
}
