use crate::adapters::weatherstack::DEFAULT_BASE_URL;
use crate::core::ServiceConfig;
use crate::utils::error::ConfigError;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "property-weather")]
#[command(about = "GraphQL service for properties enriched with current weather")]
pub struct CliConfig {
    #[arg(long, help = "Load settings from a TOML file instead of flags/environment")]
    pub config: Option<String>,

    #[arg(long, env = "PORT", default_value = "4000")]
    pub port: u16,

    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    pub supabase_key: Option<String>,

    #[arg(long, env = "PROPERTIES_TABLE", default_value = "properties")]
    pub properties_table: String,

    #[arg(long, env = "WEATHERSTACK_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub weatherstack_base_url: String,

    #[arg(long, env = "WEATHERSTACK_API_KEY", hide_env_values = true)]
    pub weatherstack_api_key: Option<String>,

    #[arg(long, env = "REQUEST_TIMEOUT_SECONDS", default_value = "30")]
    pub request_timeout_seconds: u64,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl ServiceConfig for CliConfig {
    fn listen_port(&self) -> u16 {
        self.port
    }

    fn store_url(&self) -> &str {
        self.supabase_url.as_deref().unwrap_or_default()
    }

    fn store_api_key(&self) -> &str {
        self.supabase_key.as_deref().unwrap_or_default()
    }

    fn properties_table(&self) -> &str {
        &self.properties_table
    }

    fn weather_base_url(&self) -> &str {
        &self.weatherstack_base_url
    }

    fn weather_api_key(&self) -> &str {
        self.weatherstack_api_key.as_deref().unwrap_or_default()
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.request_timeout_seconds
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let supabase_url = validation::validate_required_field("SUPABASE_URL", &self.supabase_url)?;
        validation::validate_url("SUPABASE_URL", supabase_url)?;

        let supabase_key =
            validation::validate_required_field("SUPABASE_ANON_KEY", &self.supabase_key)?;
        validation::validate_secret("SUPABASE_ANON_KEY", supabase_key)?;

        let weather_key =
            validation::validate_required_field("WEATHERSTACK_API_KEY", &self.weatherstack_api_key)?;
        validation::validate_secret("WEATHERSTACK_API_KEY", weather_key)?;

        validation::validate_url("WEATHERSTACK_BASE_URL", &self.weatherstack_base_url)?;
        validation::validate_non_empty_string("PROPERTIES_TABLE", &self.properties_table)?;
        validation::validate_range("PORT", self.port, 1, u16::MAX)?;
        validation::validate_positive_number(
            "REQUEST_TIMEOUT_SECONDS",
            self.request_timeout_seconds,
            1,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliConfig {
        let mut argv = vec!["property-weather"];
        argv.extend_from_slice(args);
        CliConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_cli_flags_validate() {
        let config = parse(&[
            "--supabase-url",
            "https://abc.supabase.co",
            "--supabase-key",
            "anon",
            "--weatherstack-api-key",
            "ws-key",
            "--port",
            "8080",
        ]);

        assert!(config.validate().is_ok());
        assert_eq!(config.listen_port(), 8080);
        assert_eq!(config.properties_table(), "properties");
        assert_eq!(config.weather_base_url(), "http://api.weatherstack.com");
    }

    #[test]
    fn test_cli_missing_store_url_is_rejected() {
        let config = CliConfig {
            config: None,
            port: 4000,
            supabase_url: None,
            supabase_key: Some("anon".into()),
            properties_table: "properties".into(),
            weatherstack_base_url: DEFAULT_BASE_URL.into(),
            weatherstack_api_key: Some("ws-key".into()),
            request_timeout_seconds: 30,
            verbose: false,
            json_logs: false,
        };

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingConfigError { ref field } if field == "SUPABASE_URL"));
    }

    #[test]
    fn test_cli_zero_timeout_is_rejected() {
        let config = parse(&[
            "--supabase-url",
            "https://abc.supabase.co",
            "--supabase-key",
            "anon",
            "--weatherstack-api-key",
            "ws-key",
            "--request-timeout-seconds",
            "0",
        ]);

        assert!(config.validate().is_err());
    }
}
