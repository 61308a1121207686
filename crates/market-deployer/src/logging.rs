use anyhow::{Context, Result};
use tracing::{info_span, Span};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Initialise the global tracing subscriber.
///
/// Everything goes to stderr; stdout is reserved for calldata and reports.
/// When `log_dir` is set, a daily-rolling JSON file carries the same events
/// tagged with the command span. The returned [`WorkerGuard`] **must** be
/// held for the lifetime of the process; dropping it flushes the file writer.
pub fn init_tracing(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let env_filter = build_filter(env.as_deref(), &logging.default_filter)?;

    let (file_layer, guard) = match &logging.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).with_context(|| format!("failed to create log dir {dir}"))?;
            let file_appender = tracing_appender::rolling::daily(dir, &logging.file_prefix);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .json()
                .with_current_span(true)
                .with_span_list(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .compact(),
        )
        .init();

    Ok(guard)
}

/// `RUST_LOG` directives when given, else the configured default. Bad
/// directives are an error rather than a silent fallback.
pub fn build_filter(directives: Option<&str>, default: &str) -> Result<EnvFilter> {
    match directives.filter(|d| !d.trim().is_empty()) {
        Some(d) => EnvFilter::try_new(d)
            .with_context(|| format!("invalid {} directives '{d}'", EnvFilter::DEFAULT_ENV)),
        None => EnvFilter::try_new(default).with_context(|| format!("invalid log filter '{default}'")),
    }
}

/// Span one CLI invocation runs under.
pub fn command_span(command: &str, chain: &str) -> Span {
    info_span!("run", command = command, chain = chain)
}
