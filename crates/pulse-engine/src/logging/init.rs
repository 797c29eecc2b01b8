use std::sync::Once;

use env_logger::fmt::TimestampPrecision;
use log::LevelFilter;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info", "warn",
/// "pulse_loop=trace,winit=warn"). When unset, `RUST_LOG` is consulted and
/// then `default_level`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: LevelFilter,
    pub write_style: env_logger::WriteStyle,
    /// Millisecond timestamps make per-tick traces readable.
    pub timestamps: Option<TimestampPrecision>,
    /// Route output through the test harness capture.
    pub is_test: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
            timestamps: Some(TimestampPrecision::Millis),
            is_test: false,
        }
    }
}

impl LoggingConfig {
    /// Configuration for unit tests: captured output, everything at debug.
    pub fn for_tests() -> Self {
        Self {
            default_level: LevelFilter::Debug,
            write_style: env_logger::WriteStyle::Never,
            is_test: true,
            ..Self::default()
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// Idempotent; subsequent calls are ignored. If another logger was installed
/// first, the failure is swallowed and the existing logger stays in place.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(config.default_level);
        }

        builder
            .write_style(config.write_style)
            .format_timestamp(config.timestamps)
            .is_test(config.is_test);

        if builder.try_init().is_err() {
            return;
        }

        log::debug!("logging initialized");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_logging(LoggingConfig::for_tests());
        init_logging(LoggingConfig::default());
        log::debug!("still alive");
    }

    #[test]
    fn test_config_overrides() {
        let cfg = LoggingConfig::for_tests();
        assert!(cfg.is_test);
        assert_eq!(cfg.default_level, LevelFilter::Debug);
        assert!(cfg.timestamps.is_some());
    }
}
