//! Headless pagespace demo
//!
//! Usage:
//!   pagespace-demo            # run the scripted scenario
//!
//! Set RUST_LOG to control verbosity (defaults to info).

use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = pagespace_app::run_demo() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
