//! blogsmith CLI library
//!
//! Command implementations, the live rebuild loop and the preview server used
//! by the `blogsmith` binary.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (build, live, check, init)
//! - [`rebuild`] - Debounced rebuild loop
//! - [`server`] - Static file server for live mode
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use blogsmith::cmd;
//!
//! cmd::build::run(None, Path::new("."), Path::new("public"), false, false).unwrap();
//! ```

pub mod cmd;
pub mod rebuild;
pub mod server;

pub use blogsmith_core::SiteConfig;
pub use blogsmith_generator::{BuildStats, Builder};

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
