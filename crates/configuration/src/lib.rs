use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{Config, ExecutionSettings, InstrumentSeed, LoggingSettings, ServerSettings};

/// Environment variables starting with this prefix override file settings,
/// e.g. `MERIDIAN_EXECUTION__DELAY_MS=0`.
pub const ENV_PREFIX: &str = "MERIDIAN";

/// Loads the application configuration.
///
/// The TOML file at `path` is optional; anything it does not set falls back to
/// defaults, and `MERIDIAN_*` environment variables override both.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    finish(builder)
}

/// Parses configuration from an in-memory TOML document. No environment overrides apply.
pub fn load_config_from_str(toml: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    finish(builder)
}

fn finish(builder: config::Config) -> Result<Config, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_document_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.execution.delay_ms, 1000);
        assert_eq!(config.execution.limit_tolerance, dec!(0.05));
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.instruments.len(), 10);
        assert_eq!(config.instruments[0].symbol, "RELIANCE");
    }

    #[test]
    fn sections_override_defaults() {
        let config = load_config_from_str(
            r#"
            [execution]
            delay_ms = 0
            limit_tolerance = "0.10"

            [[instruments]]
            symbol = "ACME"
            exchange = "BSE"
            last_traded_price = "12.5"
            "#,
        )
        .unwrap();

        assert_eq!(config.execution.delay_ms, 0);
        assert_eq!(config.execution.limit_tolerance, dec!(0.10));
        assert_eq!(config.instruments.len(), 1);

        let seeded = config.seed_instruments();
        assert_eq!(seeded[0].instrument_type, "EQUITY");
        assert_eq!(seeded[0].last_traded_price, dec!(12.5));
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = load_config_from_str(
            r#"
            [execution]
            delay_ms = 5

            [server]
            port = 8080
            "#,
        )
        .unwrap();

        assert_eq!(config.execution.delay_ms, 5);
        assert_eq!(config.execution.limit_tolerance, dec!(0.05));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn rejects_out_of_range_tolerance() {
        let err = load_config_from_str(
            r#"
            [execution]
            delay_ms = 10
            limit_tolerance = "1.5"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn rejects_duplicate_instruments() {
        let err = load_config_from_str(
            r#"
            [[instruments]]
            symbol = "ACME"
            exchange = "BSE"
            last_traded_price = "1"

            [[instruments]]
            symbol = "ACME"
            exchange = "BSE"
            last_traded_price = "2"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
