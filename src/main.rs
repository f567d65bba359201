//! dirscope — recursive folder-size overview with a persistent scan cache.
//!
//! Thin binary entry point. All logic lives in the `dirscope-core`
//! and `dirscope-cli` crates.

fn main() -> anyhow::Result<()> {
    // Initialise structured logging. Result tables go to stdout, so logs
    // stay on stderr at WARN to keep the output clean.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    dirscope_cli::run()
}
