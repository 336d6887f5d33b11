use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// The filter is taken from `REVQ_LOG`, falling back to `RUST_LOG`,
/// then to `warn`. Output goes to stderr so report output on stdout
/// stays clean.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("REVQ_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
