// CLI binary entry point for opustags
//
// Prints the comments of an Ogg Opus file, or writes a copy with edited
// comments. Exits with status 1 and a single diagnostic line on failure.

mod cli;

use std::process;

use cli::Config;

fn main() {
    let config = Config::from_env();
    cli::init_logging(config.verbose);

    if let Err(e) = cli::commands::run(&config) {
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
}
