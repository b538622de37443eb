//! OpenAPI from annotations - command-line compiler for JSDoc-style API annotations.
//!
//! Reads `@event`/`@typedef` annotated source files (or stdin) and prints an OpenAPI 3.0
//! document.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-annotations [OPTIONS] [INPUTS]...
//! ```
//!
//! # Examples
//!
//! Compile a directory with a settings file:
//! ```bash
//! openapi-from-annotations ./api -c openapi-settings.yaml -o openapi.yaml
//! ```
//!
//! Pipe annotations in and get JSON out:
//! ```bash
//! cat routes.js models.js | openapi-from-annotations --server http://localhost:3000 -f json
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_annotations::cli;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("OpenAPI from annotations starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
