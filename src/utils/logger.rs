use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CRATE_TARGET: &str = "lauflisten_map";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable single-line events for terminals.
    Compact,
    /// One JSON object per event, for log shippers.
    Json,
}

/// `RUST_LOG` wins; otherwise only this crate logs, at `level`.
fn directive(level: &str) -> String {
    format!("{}={}", CRATE_TARGET, level)
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive(level)))
}

/// Installs the global subscriber. Events go to stderr because stdout
/// carries the CLI's JSON output. A second call is a no-op.
pub fn init_logger(format: LogFormat, level: &str) {
    let filter = env_filter(level);
    let base = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(false)
        .with_line_number(false);

    let installed = match format {
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(base.compact())
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(base.json())
            .try_init(),
    };
    if installed.is_err() {
        tracing::debug!("Subscriber already installed, keeping it");
    }
}

pub fn init_cli_logger(verbose: bool) {
    init_logger(LogFormat::Compact, if verbose { "debug" } else { "info" });
}

pub fn init_json_logger(level: Option<&str>) {
    init_logger(LogFormat::Json, level.unwrap_or("info"));
}
