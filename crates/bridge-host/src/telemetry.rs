use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. Output goes to stderr so tools
/// that print machine-readable results on stdout stay clean.
pub fn init(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
