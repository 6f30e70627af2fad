// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! volman - host-local volume plugin manager.
//!
//! Binary entry point.

mod admin;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use volman_config::VolmanConfig;

/// volman - discovers volume drivers and brokers mounts to them.
#[derive(Parser, Debug)]
#[command(name = "volman", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the syncer, purger and admin endpoint until signalled.
    Serve,
    /// Run one discovery pass and print the driver names found.
    Drivers,
    /// Print the effective configuration as TOML.
    Config,
}

fn load_config(path: Option<&PathBuf>) -> VolmanConfig {
    let loaded = match path {
        Some(path) => volman_config::load_and_validate_path(path),
        None => volman_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            volman_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());

    let result = match cli.command {
        Some(Commands::Serve) => {
            serve::init_tracing(&config.log_level);
            serve::run_serve(config).await
        }
        Some(Commands::Drivers) => {
            serve::init_tracing(&config.log_level);
            serve::run_drivers(&config).await
        }
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => {
                print!("{rendered}");
                Ok(())
            }
            Err(e) => Err(volman_core::VolmanError::Config(e.to_string())),
        },
        None => {
            println!("volman: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("volman: {e}");
        std::process::exit(1);
    }
}
