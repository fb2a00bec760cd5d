// CLI module for opustags
//
// Option parsing, file handling and output formatting around the library's
// rewrite pipeline. Only compiled into the binary.

pub mod commands;
pub mod config;
pub mod output;

pub use config::Config;

use tracing::{debug, Level};

/// Send library logs to standard error; warnings only unless verbose
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let installed = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
    if let Err(e) = installed {
        // keep whichever subscriber was installed first
        debug!("logging already initialized: {}", e);
    }
}
