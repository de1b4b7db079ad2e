//! Logging setup for the `eth-vanity` binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Directive used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Install a compact stderr subscriber filtered by `RUST_LOG`.
///
/// Stdout stays reserved for command output.
pub fn init() {
    let filt = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let log_line_num = std::env::var("LOG_LINE_NUM").is_ok_and(|v| v == "1");

    let stderr_sub = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_line_number(log_line_num)
        .with_filter(filt);

    tracing_subscriber::registry().with(stderr_sub).init();
}
