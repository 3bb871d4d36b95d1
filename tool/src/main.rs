// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # ledger-tx
//!
//! Entry point for the `ledger-tx` binary. Parses CLI arguments, initializes
//! logging, and runs one subcommand:
//!
//! - `decode`  : decode a raw transaction and print it as JSON
//! - `sign`    : build and sign a transaction
//! - `verify`  : run the admission checks, exit non-zero on rejection
//! - `gas`     : intrinsic gas of a payload
//! - `keygen`  : generate a secp256k1 key
//! - `version` : print build version information

mod cli;
mod commands;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::process::ExitCode;

use cli::{Commands, LedgerTxCli};

fn main() -> Result<ExitCode> {
    let cli = LedgerTxCli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    match cli.command {
        Commands::Decode(args) => print_json(&commands::decode(&args)?)?,
        Commands::Sign(args) => print_json(&commands::sign(&args)?)?,
        Commands::Verify(args) => {
            let report = commands::verify(&args)?;
            print_json(&report)?;
            if !report.accepted() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Gas(args) => println!("{}", commands::gas(&args)?),
        Commands::Keygen(args) => print_json(&commands::keygen(&args)?)?,
        Commands::Version => print_version(),
    }
    Ok(ExitCode::SUCCESS)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("ledger-tx {}", env!("CARGO_PKG_VERSION"));
    println!("rustc     {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
