use std::str::FromStr;
use std::sync::Once;
use tracing::Level;

use bp_core::{Error, Result};

static INIT: Once = Once::new();

/// Install the global `fmt` subscriber once. Later calls, or calls made after
/// another subscriber was installed, do nothing.
pub fn init_logging(level: Level) {
    if !tracing::dispatcher::has_been_set() {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_max_level(level)
                .with_target(false)
                .try_init();
        });
    }
}

pub fn parse_level(level: &str) -> Result<Level> {
    Level::from_str(level)
        .map_err(|_| Error::Validation(format!("Invalid log level '{}' (use error, warn, info, debug or trace)", level)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_level("WARN").unwrap(), Level::WARN);
        assert!(parse_level("loud").is_err());
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging(Level::INFO);
        init_logging(Level::DEBUG);
        tracing::info!("logging initialised twice without panicking");
    }
}
