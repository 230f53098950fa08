//! Configuration for the DHO engine
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::Name;

/// Prefix for environment overrides, e.g. `DHO_VOTING_DURATION_SEC`
pub const ENV_PREFIX: &str = "DHO";

/// Base trait for all configuration types
pub trait Configuration: Serialize + for<'de> Deserialize<'de> + Default {
    /// Validate the configuration
    fn validate(&self) -> Result<()>;

    /// Apply `<PREFIX>_<FIELD>` environment overrides
    fn apply_env(&mut self, _prefix: &str) -> Result<()> {
        Ok(())
    }

    /// Load configuration from a file
    fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        debug!("Loading configuration from {}", path.as_ref().display());
        let content = fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::configuration(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| Error::configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Load configuration from defaults plus environment variables
    fn from_env(prefix: &str) -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(prefix)?;
        config.validate()?;
        Ok(config)
    }
}

/// DAO-wide settings, mirrored into the settings document of the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaoSettings {
    /// Account that owns the root document
    #[serde(default = "default_dao_name")]
    pub dao_name: Name,

    /// Length of the voting window opened by a proposal
    #[serde(default = "default_voting_duration_sec")]
    pub voting_duration_sec: i64,

    /// Periods granted to an assignment that does not name a count
    #[serde(default = "default_period_count")]
    pub default_period_count: i64,

    #[serde(default = "default_seeds_deferral_factor")]
    pub seeds_deferral_factor_x100: i64,

    /// HYPHA paid per deferred USD, in hundredths
    #[serde(default = "default_hypha_deferral_factor")]
    pub hypha_deferral_factor_x100: i64,

    /// Share of the voice supply that must take part for a vote to count
    #[serde(default)]
    pub voting_quorum_factor_x100: i64,

    /// Share of pass+fail power that `pass` must exceed
    #[serde(default = "default_alignment_factor")]
    pub voting_alignment_factor_x100: i64,

    /// SEEDS per USD for the SEEDS share of compensation; unset pays no SEEDS
    #[serde(default)]
    pub seeds_per_usd: Option<Decimal>,

    #[serde(default = "default_hypha_token")]
    pub hypha_token_contract: Name,

    #[serde(default = "default_hvoice_token")]
    pub hvoice_token_contract: Name,

    #[serde(default = "default_husd_token")]
    pub husd_token_contract: Name,

    #[serde(default = "default_seeds_token")]
    pub seeds_token_contract: Name,

    #[serde(default = "default_treasury")]
    pub treasury_contract: Name,

    #[serde(default = "default_seeds_escrow")]
    pub seeds_escrow_contract: Name,

    #[serde(default = "default_publisher")]
    pub publisher_contract: Name,

    /// Reject every action while set
    #[serde(default)]
    pub paused: bool,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory for file-backed storage; in-memory when unset
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn name(value: &'static str) -> Name {
    Name::from_static(value)
}

fn default_dao_name() -> Name {
    name("dao.hypha")
}

fn default_voting_duration_sec() -> i64 {
    30
}

fn default_period_count() -> i64 {
    13
}

fn default_seeds_deferral_factor() -> i64 {
    100
}

fn default_hypha_deferral_factor() -> i64 {
    25
}

fn default_alignment_factor() -> i64 {
    50
}

fn default_hypha_token() -> Name {
    name("token.hypha")
}

fn default_hvoice_token() -> Name {
    name("voice.hypha")
}

fn default_husd_token() -> Name {
    name("husd.hypha")
}

fn default_seeds_token() -> Name {
    name("token.seeds")
}

fn default_treasury() -> Name {
    name("bank.hypha")
}

fn default_seeds_escrow() -> Name {
    name("escrow.seeds")
}

fn default_publisher() -> Name {
    name("publsh.hypha")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DaoSettings {
    fn default() -> Self {
        Self {
            dao_name: default_dao_name(),
            voting_duration_sec: default_voting_duration_sec(),
            default_period_count: default_period_count(),
            seeds_deferral_factor_x100: default_seeds_deferral_factor(),
            hypha_deferral_factor_x100: default_hypha_deferral_factor(),
            voting_quorum_factor_x100: 0,
            voting_alignment_factor_x100: default_alignment_factor(),
            seeds_per_usd: None,
            hypha_token_contract: default_hypha_token(),
            hvoice_token_contract: default_hvoice_token(),
            husd_token_contract: default_husd_token(),
            seeds_token_contract: default_seeds_token(),
            treasury_contract: default_treasury(),
            seeds_escrow_contract: default_seeds_escrow(),
            publisher_contract: default_publisher(),
            paused: false,
            log_level: default_log_level(),
            data_dir: None,
        }
    }
}

fn env_override<T>(prefix: &str, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    let var = format!("{}_{}", prefix, key);
    match std::env::var(&var) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| Error::configuration(format!("Invalid value for {}: {}", var, e))),
        Err(_) => Ok(None),
    }
}

fn check_range(field: &str, value: i64, min: i64, max: i64) -> Result<()> {
    if value < min || value > max {
        return Err(Error::configuration(format!(
            "{} must be between {} and {}, got {}",
            field, min, max, value
        )));
    }
    Ok(())
}

impl Configuration for DaoSettings {
    fn validate(&self) -> Result<()> {
        if self.voting_duration_sec <= 0 {
            return Err(Error::configuration("voting_duration_sec must be positive"));
        }
        if self.default_period_count <= 0 {
            return Err(Error::configuration("default_period_count must be positive"));
        }
        check_range("seeds_deferral_factor_x100", self.seeds_deferral_factor_x100, 0, i64::MAX)?;
        check_range("hypha_deferral_factor_x100", self.hypha_deferral_factor_x100, 0, i64::MAX)?;
        check_range("voting_quorum_factor_x100", self.voting_quorum_factor_x100, 0, 100)?;
        check_range("voting_alignment_factor_x100", self.voting_alignment_factor_x100, 0, 100)?;

        if let Some(price) = self.seeds_per_usd {
            if price <= Decimal::ZERO {
                return Err(Error::configuration("seeds_per_usd must be positive"));
            }
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(Error::configuration(format!(
                    "Invalid log level: {}",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    fn apply_env(&mut self, prefix: &str) -> Result<()> {
        if let Some(v) = env_override(prefix, "DAO_NAME")? {
            self.dao_name = v;
        }
        if let Some(v) = env_override(prefix, "VOTING_DURATION_SEC")? {
            self.voting_duration_sec = v;
        }
        if let Some(v) = env_override(prefix, "DEFAULT_PERIOD_COUNT")? {
            self.default_period_count = v;
        }
        if let Some(v) = env_override(prefix, "SEEDS_DEFERRAL_FACTOR_X100")? {
            self.seeds_deferral_factor_x100 = v;
        }
        if let Some(v) = env_override(prefix, "HYPHA_DEFERRAL_FACTOR_X100")? {
            self.hypha_deferral_factor_x100 = v;
        }
        if let Some(v) = env_override(prefix, "VOTING_QUORUM_FACTOR_X100")? {
            self.voting_quorum_factor_x100 = v;
        }
        if let Some(v) = env_override(prefix, "VOTING_ALIGNMENT_FACTOR_X100")? {
            self.voting_alignment_factor_x100 = v;
        }
        if let Some(v) = env_override::<Decimal>(prefix, "SEEDS_PER_USD")? {
            self.seeds_per_usd = Some(v);
        }
        if let Some(v) = env_override(prefix, "PAUSED")? {
            self.paused = v;
        }
        if let Some(v) = env_override(prefix, "LOG_LEVEL")? {
            self.log_level = v;
        }
        if let Some(v) = env_override::<PathBuf>(prefix, "DATA_DIR")? {
            self.data_dir = Some(v);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let settings = DaoSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.voting_duration_sec, 30);
        assert_eq!(settings.hypha_deferral_factor_x100, 25);
        assert_eq!(settings.voting_alignment_factor_x100, 50);
    }

    #[test]
    fn test_from_str_fills_defaults() {
        let settings = DaoSettings::from_str(
            r#"
            dao_name = "dao.test"
            voting_duration_sec = 120
            seeds_per_usd = "25.5"
            "#,
        )
        .unwrap();

        assert_eq!(settings.dao_name.as_str(), "dao.test");
        assert_eq!(settings.voting_duration_sec, 120);
        assert_eq!(settings.seeds_per_usd, Some(Decimal::new(255, 1)));
        assert_eq!(settings.default_period_count, 13);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        assert!(DaoSettings::from_str("voting_duration_sec = 0").is_err());
        assert!(DaoSettings::from_str("voting_quorum_factor_x100 = 101").is_err());
        assert!(DaoSettings::from_str("log_level = \"loud\"").is_err());
        assert!(DaoSettings::from_str("dao_name = \"Not A Name\"").is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dho.toml");

        let settings = DaoSettings {
            voting_duration_sec: 600,
            paused: true,
            ..DaoSettings::default()
        };
        settings.save_to_file(&path).unwrap();

        let loaded = DaoSettings::from_file(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("DHOTEST_VOTING_DURATION_SEC", "45");
        std::env::set_var("DHOTEST_PAUSED", "true");

        let settings = DaoSettings::from_env("DHOTEST").unwrap();
        assert_eq!(settings.voting_duration_sec, 45);
        assert!(settings.paused);

        std::env::set_var("DHOTEST_VOTING_DURATION_SEC", "soon");
        assert!(DaoSettings::from_env("DHOTEST").is_err());

        std::env::remove_var("DHOTEST_VOTING_DURATION_SEC");
        std::env::remove_var("DHOTEST_PAUSED");
    }
}
