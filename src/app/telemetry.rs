//! Tracing subscriber construction
use std::{fmt, path::Path};
use tracing::{subscriber::set_global_default, Subscriber};
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

/// Verbosity used when `RUST_LOG` is not set
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Per-slice events
    Trace,
    /// Validation events
    Debug,
    /// One event per computation
    #[default]
    Info,
    /// Errors only
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Error => "error",
        };
        write!(f, "{level}")
    }
}

/// Creates a subscriber which write to `console::Term::stdout` and to a json log file `log.log`
/// located in `log_directory`.
pub fn get_subscriber(
    env_filter: LogLevel,
    log_directory: impl AsRef<Path>,
) -> (
    impl Subscriber + Send + Sync,
    tracing_appender::non_blocking::WorkerGuard,
) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(env_filter.to_string()));

    let fmt_layer = tracing_subscriber::fmt::Layer::new()
        .with_writer(console::Term::stdout)
        .without_time();

    let appender = tracing_appender::rolling::never(log_directory, "log.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    (
        Registry::default().with(env_filter).with(fmt_layer).with(
            tracing_subscriber::fmt::Layer::new()
                .with_writer(non_blocking)
                .json(),
        ),
        guard,
    )
}

/// Installs `subscriber` as the global default, bridging `log` records into it
pub fn init_subscriber(
    subscriber: impl Subscriber + Send + Sync,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    LogTracer::init()?;
    set_global_default(subscriber)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::LogLevel;

    #[test]
    fn log_levels_render_as_env_filter_directives() {
        assert_eq!(LogLevel::default().to_string(), "info");
        assert_eq!(LogLevel::Trace.to_string(), "trace");
    }

    #[test]
    fn subscriber_dispatches_events_from_self_energy_scope() {
        let directory = std::env::temp_dir();
        let (subscriber, _guard) = super::get_subscriber(LogLevel::Debug, &directory);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(energy_index = 0, "Calculating deformation potential self energy");
        });
    }
}
