use std::env;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Settings {
    telemetry: TelemetrySettings,
}

#[derive(Debug, Clone)]
pub struct TelemetrySettings {
    pub log_level: String,
    pub json: bool,
}

impl Settings {
    /// Reads settings from the environment; the embedding service owns env
    /// loading (dotenv or otherwise) before calling this.
    pub fn load() -> Result<Self, ConfigError> {
        let telemetry = TelemetrySettings {
            log_level: env_or_default("LOG_LEVEL", "info"),
            json: parse_bool("LOG_JSON", env_or_default("LOG_JSON", "0"))?,
        };
        Ok(Self { telemetry })
    }

    pub fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }
}

fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn env_or_default(key: &str, default: &str) -> String {
    env_optional(key).unwrap_or_else(|| default.to_string())
}

fn parse_bool(field: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue { field, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert!(parse_bool("X", "1".to_string()).unwrap());
        assert!(parse_bool("X", "TRUE".to_string()).unwrap());
        assert!(!parse_bool("X", "off".to_string()).unwrap());
        assert!(parse_bool("X", "maybe".to_string()).is_err());
    }
}
