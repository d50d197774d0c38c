use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter directives: our crates at `level`, noisy dependencies at warn.
pub(crate) fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "bloodconnect={level},bloodconnect_auth={level},bloodconnect_models={level},\
             tower_http=warn,hyper=warn,reqwest=warn"
        ))
    })
}

/// `LOG_LEVEL`, defaulting to `info`.
pub(crate) fn log_level() -> String {
    std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
}

/// Initialize basic console logging when the observability feature is disabled.
///
/// - **Log Level**: Controlled by `LOG_LEVEL` environment variable (default: "info")
/// - **Filtering**: `RUST_LOG` overrides the defaults; noisy dependencies filtered to warn
/// - **Format**: Compact format with ANSI colors
///
/// Calling it again after a subscriber is installed has no effect.
pub fn init_basic_console_logging() {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .compact()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(default_filter(&log_level()));

    if tracing_subscriber::registry()
        .with(console_layer)
        .try_init()
        .is_ok()
    {
        eprintln!("Observability disabled - console logging only");
    }
}
