use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::execution::SyntheticFeedConfig;
use crate::strategy::StrategyConfig;

/// Config file read when none is given explicitly (optional)
pub const DEFAULT_CONFIG_FILE: &str = "turtle.toml";

/// Environment prefix, e.g. `TURTLE__STRATEGY__ENTRY_CHANNEL_DAYS=55`
pub const ENV_PREFIX: &str = "TURTLE";

/// Top-level runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TurtleConfig {
    pub symbol: String,
    pub state_file: PathBuf,
    pub startup_deadline_secs: u64, // Abort if no usable data arrives within this window
    pub strategy: StrategyConfig,
    pub paper: SyntheticFeedConfig,
}

impl Default for TurtleConfig {
    fn default() -> Self {
        Self {
            symbol: "SHFE.hc1901".to_string(),
            state_file: PathBuf::from("turtle_state.json"),
            startup_deadline_secs: 5,
            strategy: StrategyConfig::default(),
            paper: SyntheticFeedConfig::default(),
        }
    }
}

impl TurtleConfig {
    /// Layer defaults, an optional config file and `TURTLE__*` env vars
    ///
    /// An explicitly named file must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("failed to read configuration")?;

        let config: TurtleConfig = settings
            .try_deserialize()
            .context("invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn startup_deadline(&self) -> Duration {
        Duration::from_secs(self.startup_deadline_secs)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let s = &self.strategy;
        if s.entry_channel_days == 0 || s.exit_channel_days == 0 || s.atr_days == 0 {
            anyhow::bail!(
                "channel and ATR lookbacks must be at least 1 day (entry {}, exit {}, atr {})",
                s.entry_channel_days,
                s.exit_channel_days,
                s.atr_days
            );
        }
        if s.pyramid_step_n <= 0.0 || s.stop_loss_n <= 0.0 {
            anyhow::bail!(
                "pyramid step ({}) and stop distance ({}) must be positive multiples of N",
                s.pyramid_step_n,
                s.stop_loss_n
            );
        }
        if self.symbol.trim().is_empty() {
            anyhow::bail!("symbol must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults() {
        let config = TurtleConfig::default();

        assert_eq!(config.symbol, "SHFE.hc1901");
        assert_eq!(config.state_file, PathBuf::from("turtle_state.json"));
        assert_eq!(config.startup_deadline(), Duration::from_secs(5));
        assert_eq!(config.strategy.entry_channel_days, 20);
        assert_eq!(config.strategy.risk.max_risk_ratio, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("turtle-{}.toml", uuid::Uuid::new_v4()));
        fs::write(
            &path,
            r#"
symbol = "SHFE.rb2410"

[strategy]
entry_channel_days = 55
atr_smoothing = "wilder"

[paper]
scenario = "volatile"
"#,
        )
        .unwrap();

        let config = TurtleConfig::load(Some(&path)).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(config.symbol, "SHFE.rb2410");
        assert_eq!(config.strategy.entry_channel_days, 55);
        assert_eq!(config.strategy.exit_channel_days, 10);
        assert_eq!(
            config.strategy.atr_smoothing,
            crate::indicators::AtrSmoothing::Wilder
        );
        assert_eq!(config.paper.scenario, crate::execution::MarketScenario::Volatile);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let path = std::env::temp_dir().join("turtle-does-not-exist.toml");
        assert!(TurtleConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn test_zero_lookback_rejected() {
        let mut config = TurtleConfig::default();
        config.strategy.exit_channel_days = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at least 1 day"));
    }
}
