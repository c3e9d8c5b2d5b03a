use crate::error::ConfigError;
use core_types::Instrument;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub execution: ExecutionSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default = "default_instruments")]
    pub instruments: Vec<InstrumentSeed>,
}

/// Contains parameters for the asynchronous execution engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecutionSettings {
    /// Processing lag between submission and the execution attempt, in milliseconds.
    pub delay_ms: u64,

    /// How far the market may sit on the wrong side of a limit price and still fill.
    /// 0.05 corresponds to 5%.
    pub limit_tolerance: Decimal,
}

/// Where the HTTP API listens.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive such as `info` or `engine=debug,info`.
    /// `RUST_LOG` takes precedence when set.
    pub filter: String,
    /// When non-empty, logs are also written to a daily rolling file in this directory.
    pub directory: String,
}

/// One entry of the instrument catalogue loaded at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentSeed {
    pub symbol: String,
    pub exchange: String,
    #[serde(default = "default_instrument_type")]
    pub instrument_type: String,
    pub last_traded_price: Decimal,
}

// --- Default Implementations ---
// Every section may be omitted from the toml; these mirror the values the
// simulator has always shipped with.

impl Default for Config {
    fn default() -> Self {
        Self {
            execution: ExecutionSettings::default(),
            server: ServerSettings::default(),
            logging: LoggingSettings::default(),
            instruments: default_instruments(),
        }
    }
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            delay_ms: 1000,
            limit_tolerance: dec!(0.05),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            directory: String::new(),
        }
    }
}

fn default_instrument_type() -> String {
    "EQUITY".to_string()
}

fn seed(symbol: &str, price: Decimal) -> InstrumentSeed {
    InstrumentSeed {
        symbol: symbol.to_string(),
        exchange: "NSE".to_string(),
        instrument_type: default_instrument_type(),
        last_traded_price: price,
    }
}

fn default_instruments() -> Vec<InstrumentSeed> {
    vec![
        seed("RELIANCE", dec!(2450.50)),
        seed("TCS", dec!(3420.75)),
        seed("INFY", dec!(1520.25)),
        seed("HDFCBANK", dec!(1680.00)),
        seed("ICICIBANK", dec!(980.50)),
        seed("BHARTIARTL", dec!(1120.75)),
        seed("SBIN", dec!(625.25)),
        seed("WIPRO", dec!(485.50)),
        seed("HCLTECH", dec!(1320.00)),
        seed("LT", dec!(3425.75)),
    ]
}

impl ExecutionSettings {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&InstrumentSeed> for Instrument {
    fn from(seed: &InstrumentSeed) -> Self {
        Instrument {
            symbol: seed.symbol.clone(),
            exchange: seed.exchange.clone(),
            instrument_type: seed.instrument_type.clone(),
            last_traded_price: seed.last_traded_price,
        }
    }
}

impl Config {
    /// Rejects settings that would make the engine misbehave at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tolerance = self.execution.limit_tolerance;
        if tolerance < Decimal::ZERO || tolerance >= Decimal::ONE {
            return Err(ConfigError::ValidationError(format!(
                "execution.limit_tolerance must be within [0, 1), got {}",
                tolerance
            )));
        }

        let mut seen = HashSet::new();
        for seed in &self.instruments {
            if seed.last_traded_price <= Decimal::ZERO {
                return Err(ConfigError::ValidationError(format!(
                    "instrument {}/{} must have a positive last_traded_price",
                    seed.symbol, seed.exchange
                )));
            }
            if !seen.insert((seed.symbol.as_str(), seed.exchange.as_str())) {
                return Err(ConfigError::ValidationError(format!(
                    "instrument {}/{} is listed more than once",
                    seed.symbol, seed.exchange
                )));
            }
        }

        Ok(())
    }

    /// The seed catalogue converted into domain instruments.
    pub fn seed_instruments(&self) -> Vec<Instrument> {
        self.instruments.iter().map(Instrument::from).collect()
    }
}
