use tracing_subscriber::EnvFilter;

/// Output format of the global subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Plain,
}

/// Initialize structured logging with JSON format
pub fn init() {
    init_with_level("info")
}

/// Initialize logging with specific level; `RUST_LOG` takes precedence
pub fn init_with_level(level: &str) {
    init_with(level, LogFormat::Json)
}

/// Initialize logging with specific level and format.
///
/// A second call is ignored so that embedding code and tests can both call it.
pub fn init_with(level: &str, format: LogFormat) {
    let builder = tracing_subscriber::fmt().with_env_filter(filter(level));
    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Plain => builder.try_init(),
    };
}

/// Initialize logging for tests (plain format)
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("trace"))
        .with_test_writer()
        .try_init();
}

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{debug, trace};

    #[test]
    fn test_logging_init() {
        init_test();
        debug!(app_id = 4, "Dictionary lookup");
        trace!(app_id = 16777251, fallback = 4, "AVP resolved through fallback");
    }

    #[test]
    fn test_repeated_init_is_harmless() {
        init_test();
        init_with("debug", LogFormat::Plain);
        init_with_level("warn");
    }

    #[test]
    fn test_default_format() {
        assert_eq!(LogFormat::default(), LogFormat::Json);
    }
}
