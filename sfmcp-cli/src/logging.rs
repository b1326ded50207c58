use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Output format of log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Install the global subscriber, writing to stderr.
///
/// stdout carries protocol messages, so nothing else may write to it.
/// An explicit `level` wins over `RUST_LOG`; without either, `info` is used.
pub fn init(level: Option<&str>, format: LogFormat) {
    let env_filter = match level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info")),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
}
