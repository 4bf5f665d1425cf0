//! Configuration loading and management
//!
//! Configuration is read once at startup and validated immediately; a bad
//! revenue-split section rejects the whole config instead of being
//! silently ignored at charge time.

use anyhow::{Context, Result, bail};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::payment::RevenueSplit;

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Revenue-split section: a share of each charge routed to a secondary
/// recipient. Percentage must be in (0, 100].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    pub recipient_id: String,
    pub percentage: Decimal,
}

/// Payment settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentConfig {
    #[serde(default)]
    pub split: Option<SplitConfig>,
}

/// PostgreSQL settings; absent means the in-memory backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub payment: PaymentConfig,
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
}

impl AppConfig {
    /// Load and validate configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path))?;
        Self::from_yaml_str(&content)
    }

    /// Load and validate configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).context("failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration, failing fast on a bad split section
    pub fn validate(&self) -> Result<()> {
        if let Some(split) = &self.payment.split {
            if split.recipient_id.trim().is_empty() {
                bail!("payment.split.recipient_id must not be empty");
            }
            if split.percentage <= Decimal::ZERO || split.percentage > Decimal::ONE_HUNDRED {
                bail!(
                    "payment.split.percentage must be in (0, 100], got {}",
                    split.percentage
                );
            }
        }
        Ok(())
    }

    /// The validated revenue split, ready to inject into the order service
    pub fn revenue_split(&self) -> Option<RevenueSplit> {
        self.payment.split.as_ref().map(|split| RevenueSplit {
            recipient_id: split.recipient_id.clone(),
            percentage: split.percentage,
        })
    }

    /// Bind address for the HTTP server
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert!(config.revenue_split().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
server:
  host: 0.0.0.0
  port: 8080
payment:
  split:
    recipient_id: rcpt_wellness
    percentage: 12.5
"#;
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");

        let split = config.revenue_split().unwrap();
        assert_eq!(split.recipient_id, "rcpt_wellness");
        assert_eq!(split.percentage, dec!(12.5));
    }

    #[test]
    fn test_split_percentage_bounds() {
        for bad in ["0", "-5", "100.01"] {
            let yaml = format!(
                "payment:\n  split:\n    recipient_id: rcpt\n    percentage: {}\n",
                bad
            );
            assert!(
                AppConfig::from_yaml_str(&yaml).is_err(),
                "percentage {} should be rejected",
                bad
            );
        }

        // 100 is inclusive
        let yaml = "payment:\n  split:\n    recipient_id: rcpt\n    percentage: 100\n";
        assert!(AppConfig::from_yaml_str(yaml).is_ok());
    }

    #[test]
    fn test_split_requires_recipient() {
        let yaml = "payment:\n  split:\n    recipient_id: \"\"\n    percentage: 10\n";
        assert!(AppConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  port: 4000").unwrap();

        let config = AppConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 4000);
    }
}
