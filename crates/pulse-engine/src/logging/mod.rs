//! Logging utilities.
//!
//! Centralizes logger initialization. Library code only talks to the `log`
//! facade; binaries and tests pick the `env_logger` backend through here.

mod init;

pub use init::{init_logging, LoggingConfig};
