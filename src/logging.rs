use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Initializes console logging. `RUST_LOG` overrides the default
/// `pace_import=info` filter. Logs go to stderr so reports on stdout stay clean.
pub fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pace_import=info"));

    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };

    if let Err(err) = installed {
        // Another subscriber is already global (tests, embedding); keep it
        tracing::debug!(error = %err, "logging already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice_keeps_first() {
        init_logging(LogFormat::Json);
        init_logging(LogFormat::Pretty);
        tracing::info!("still logging");
    }
}
