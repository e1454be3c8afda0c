//! Daemon configuration.
//!
//! Process-level settings come from environment variables (a `.env` file is
//! honoured). Robot definitions come from a JSON file:
//!
//! ```json
//! [{
//!   "symbol": "BTCUSDT",
//!   "timeframe": { "unit": "minute", "interval": 5 },
//!   "order": { "percentage_from_deposit": 10, "futures_multiplier": 1, "stop_loss_pct": 0.02 },
//!   "historical_data_file": "btcusdt-5m.json",
//!   "multipliers": { "not_ready": 0, "minor": 1, "medium": 2, "major": 3 },
//!   "explorers": [{ "type": "rsi", "severity": 2 }, { "type": "macd" }],
//!   "blockers": [{ "type": "atr", "period": 7 }]
//! }]
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use shadow_domain::Timeframe;
use shadow_engine::{BlockerConfig, ExplorerConfig, SeverityMultipliers};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{DaemonError, DaemonResult};

// =============================================================================
// Configuration
// =============================================================================

/// Daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment (test, development, production)
    pub environment: Environment,

    /// Where robot definitions were loaded from
    pub robots_file: PathBuf,

    /// Starting balance of the shared virtual account
    pub virtual_balance: Decimal,

    /// Upper bound on waiting for in-flight cycles at shutdown
    pub shutdown_timeout: Duration,

    /// One entry per robot to run
    pub robots: Vec<RobotConfig>,
}

/// Environment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Test environment
    Test,
    /// Development environment
    Development,
    /// Production environment
    Production,
}

/// Definition of a single robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotConfig {
    /// Trading pair
    pub symbol: String,

    /// Bar granularity and scheduling period
    pub timeframe: Timeframe,

    /// Order sizing and protection
    pub order: OrderConfig,

    /// Candlestick file replayed by the simulated venue
    #[serde(default)]
    pub historical_data_file: Option<String>,

    /// Multiplier per exploration state
    #[serde(default)]
    pub multipliers: SeverityMultipliers,

    /// Explorers voting for this robot
    #[serde(default = "ExplorerConfig::default_set")]
    pub explorers: Vec<ExplorerConfig>,

    /// Blockers able to veto trading
    #[serde(default = "default_blockers")]
    pub blockers: Vec<BlockerConfig>,
}

/// Order settings of a robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderConfig {
    /// Share of the deposit committed per order, in percent (10 = 10%)
    pub percentage_from_deposit: Decimal,

    /// Futures leverage multiplier
    #[serde(default = "default_futures_multiplier")]
    pub futures_multiplier: u32,

    /// Stop-loss distance as a fraction of the entry close (0.02 = 2%)
    #[serde(default = "default_stop_loss_pct")]
    pub stop_loss_pct: Decimal,
}

fn default_blockers() -> Vec<BlockerConfig> {
    vec![BlockerConfig::default()]
}

fn default_futures_multiplier() -> u32 {
    1
}

fn default_stop_loss_pct() -> Decimal {
    dec!(0.02)
}

impl Config {
    /// Load configuration from environment variables and the robots file.
    pub fn from_env() -> DaemonResult<Self> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let environment = Self::load_environment()?;
        let robots_file = PathBuf::from(
            env::var("SHADOW_ROBOTS_FILE").unwrap_or_else(|_| "robots.json".to_string()),
        );
        let virtual_balance = Self::load_decimal_env("SHADOW_VIRTUAL_BALANCE", dec!(10000))?;
        let shutdown_timeout =
            Duration::from_secs(Self::load_u64_env("SHADOW_SHUTDOWN_TIMEOUT_SECS", 10)?);
        let robots = load_robots(&robots_file)?;

        Ok(Self {
            environment,
            robots_file,
            virtual_balance,
            shutdown_timeout,
            robots,
        })
    }

    /// Create test configuration.
    pub fn test() -> Self {
        Self {
            environment: Environment::Test,
            robots_file: PathBuf::from("robots.json"),
            virtual_balance: dec!(10000),
            shutdown_timeout: Duration::from_secs(1),
            robots: vec![RobotConfig::test("BTCUSDT")],
        }
    }

    /// Check every robot definition, reporting all problems at once.
    pub fn validate(&self) -> DaemonResult<()> {
        let mut problems = Vec::new();

        if self.virtual_balance <= Decimal::ZERO {
            problems.push(format!(
                "virtual balance must be positive, got {}",
                self.virtual_balance
            ));
        }
        if self.robots.is_empty() {
            problems.push(format!("no robots configured in {}", self.robots_file.display()));
        }

        for (index, robot) in self.robots.iter().enumerate() {
            problems.extend(
                robot
                    .problems()
                    .into_iter()
                    .map(|p| format!("robot #{} ({}): {}", index, robot.symbol, p)),
            );
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(DaemonError::Config(problems.join("; ")))
        }
    }

    fn load_environment() -> DaemonResult<Environment> {
        let env_str = env::var("SHADOW_ENV").unwrap_or_else(|_| "development".to_string());

        match env_str.to_lowercase().as_str() {
            "test" => Ok(Environment::Test),
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(DaemonError::Config(format!(
                "Invalid SHADOW_ENV: {}. Expected: test, development, production",
                other
            ))),
        }
    }

    fn load_decimal_env(key: &str, default: Decimal) -> DaemonResult<Decimal> {
        match env::var(key) {
            Ok(val) => Decimal::from_str(&val)
                .map_err(|_| DaemonError::Config(format!("Invalid {} value: {}", key, val))),
            Err(_) => Ok(default),
        }
    }

    fn load_u64_env(key: &str, default: u64) -> DaemonResult<u64> {
        match env::var(key) {
            Ok(val) => val
                .parse::<u64>()
                .map_err(|_| DaemonError::Config(format!("Invalid {} value: {}", key, val))),
            Err(_) => Ok(default),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            robots_file: PathBuf::from("robots.json"),
            virtual_balance: dec!(10000),
            shutdown_timeout: Duration::from_secs(10),
            robots: Vec::new(),
        }
    }
}

impl RobotConfig {
    /// One-minute robot with the default explorers and blocker.
    pub fn test(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            timeframe: Timeframe::ONE_MINUTE,
            order: OrderConfig {
                percentage_from_deposit: dec!(10),
                futures_multiplier: 1,
                stop_loss_pct: dec!(0.02),
            },
            historical_data_file: Some(format!("{}.json", symbol.to_lowercase())),
            multipliers: SeverityMultipliers::default(),
            explorers: ExplorerConfig::default_set(),
            blockers: default_blockers(),
        }
    }

    fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.symbol.trim().is_empty() {
            problems.push("symbol must not be empty".to_string());
        }

        let pct = self.order.percentage_from_deposit;
        if pct <= Decimal::ZERO || pct > dec!(100) {
            problems.push(format!("percentage_from_deposit must be in (0, 100], got {}", pct));
        }
        if self.order.stop_loss_pct < Decimal::ZERO || self.order.stop_loss_pct >= Decimal::ONE {
            problems.push(format!(
                "stop_loss_pct must be a fraction in [0, 1), got {}",
                self.order.stop_loss_pct
            ));
        }
        if self.order.futures_multiplier == 0 {
            problems.push("futures_multiplier must be at least 1".to_string());
        }

        match self.historical_data_file.as_deref() {
            Some(file) if !file.trim().is_empty() => {}
            _ => problems
                .push("historical_data_file is required by the simulated venue".to_string()),
        }

        if self.explorers.is_empty() {
            problems.push("at least one explorer is required".to_string());
        }
        for explorer in &self.explorers {
            if let Err(e) = explorer.build() {
                problems.push(e.to_string());
            }
        }
        for blocker in &self.blockers {
            if let Err(e) = blocker.build() {
                problems.push(e.to_string());
            }
        }

        problems
    }
}

/// Read robot definitions from a JSON file.
pub fn load_robots(path: &Path) -> DaemonResult<Vec<RobotConfig>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        DaemonError::Config(format!("Failed to read robots file {}: {}", path.display(), e))
    })?;
    parse_robots(&content)
        .map_err(|e| DaemonError::Config(format!("{} in {}", e, path.display())))
}

/// Parse robot definitions from JSON text.
pub fn parse_robots(json: &str) -> DaemonResult<Vec<RobotConfig>> {
    serde_json::from_str(json)
        .map_err(|e| DaemonError::Config(format!("Invalid robot definitions: {}", e)))
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Test => write!(f, "test"),
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
