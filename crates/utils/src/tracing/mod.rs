use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Re-export tracing macros for convenience
pub use ::tracing::{debug, error, info, instrument, span, trace, warn, Level, Span};

/// Initialize the tracing system with an `info` default
///
/// `RUST_LOG` overrides the default filter. Output goes to stderr so that
/// stdout stays free for document content.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    init_with_default("info")
}

/// Initialize the tracing system with an explicit fallback filter
pub fn init_with_default(
    default_filter: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_filter))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(is_tty())
        .compact()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Map a `-v` count onto a filter directive
pub fn verbosity_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Check if we're running in a TTY environment
fn is_tty() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stderr())
}

/// Create a span for one document operation
pub fn document_span(operation: &str, document_id: &str) -> Span {
    span!(Level::INFO, "document", operation = %operation, document_id = %document_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_filter() {
        assert_eq!(verbosity_filter(0), "warn");
        assert_eq!(verbosity_filter(2), "debug");
        assert_eq!(verbosity_filter(9), "trace");
    }
}
