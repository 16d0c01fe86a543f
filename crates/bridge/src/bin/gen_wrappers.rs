#![allow(clippy::missing_errors_doc)]

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use bridge_host::telemetry;
use clap::Parser;
use netlify_bridge::gen_wrappers;

#[derive(Debug, Parser)]
#[command(
    name = "bridge-gen-wrappers",
    about = "Generate /api/netlify adapter wrappers for every netlify/functions module"
)]
struct Cli {
    /// Directory to scan (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,
}

fn main() -> Result<()> {
    telemetry::init("warn");
    let cli = Cli::parse();
    let root = match cli.root {
        Some(root) => root,
        None => env::current_dir().context("failed to resolve current directory")?,
    };

    let summary = gen_wrappers::generate(&root)?;
    let rendered = serde_json::to_string_pretty(&summary)?;
    println!("{rendered}");
    Ok(())
}
