//! Logging and tracing configuration
//!
//! Log output goes to stderr so it never interleaves with the step report
//! printed on stdout.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable accepted in addition to `RUST_LOG`
pub const LOG_LEVEL_ENV: &str = "STACKPROBE_LOG_LEVEL";

/// Initialize tracing for the CLI
///
/// `RUST_LOG` wins when set. Otherwise `STACKPROBE_LOG_LEVEL` picks the
/// level for this crate (debug, info, warn or error), defaulting to warn.
/// `verbose` raises the default to debug.
pub fn init_cli(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = std::env::var(LOG_LEVEL_ENV).ok();
        EnvFilter::new(default_directive(level.as_deref(), verbose))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

fn default_directive(level: Option<&str>, verbose: bool) -> String {
    let level = match level.map(str::to_ascii_lowercase).as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("info") => "info",
        Some("warn") => "warn",
        Some("error") => "error",
        _ if verbose => "debug",
        _ => "warn",
    };
    format!("stackprobe={level},warn")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(None, false), "stackprobe=warn,warn");
        assert_eq!(default_directive(None, true), "stackprobe=debug,warn");
        assert_eq!(default_directive(Some("INFO"), true), "stackprobe=info,warn");
        assert_eq!(default_directive(Some("bogus"), false), "stackprobe=warn,warn");
    }
}
