use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn filter_or(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
}

pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// `--verbose` wins over a configured level; `RUST_LOG` wins over both.
fn cli_directives(verbose: bool, level: Option<&str>) -> String {
    match (verbose, level) {
        (true, _) => "parcel_valuation=debug,info".to_string(),
        (false, Some(level)) => format!("parcel_valuation={}", level),
        (false, None) => "parcel_valuation=info".to_string(),
    }
}

pub fn init_cli_logger(verbose: bool) {
    init_cli_logger_with_level(verbose, None);
}

pub fn init_cli_logger_with_level(verbose: bool, level: Option<&str>) {
    tracing_subscriber::registry()
        .with(filter_or(&cli_directives(verbose, level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(verbose)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// JSON lines, one event per line, for CloudWatch.
pub fn init_lambda_logger() {
    tracing_subscriber::registry()
        .with(filter_or("parcel_valuation=info"))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .without_time()
                .json()
                .with_current_span(false),
        )
        .init();
}
