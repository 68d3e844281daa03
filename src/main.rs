//! voidworld - headless admin console for the VoidWorld region engine
//!
//! Reads `/vw` commands from a script file or stdin and prints each response.

mod commands;
mod config;
mod console;

use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use config::VoidWorldConfig;
use console::Console;
use tracing::info;
use voidworld_testkit::JsonlSink;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless VoidWorld admin console", long_about = None)]
struct Args {
    /// Config file (default: config/voidworld.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Command script to run instead of reading stdin
    #[arg(long)]
    script: Option<PathBuf>,

    /// Write commands and enter/exit events as JSONL
    #[arg(long)]
    event_log: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    info!("Starting voidworld v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => VoidWorldConfig::load_from_path(path),
        None => VoidWorldConfig::load(),
    };

    let mut console = Console::new(&config);
    if let Some(path) = &args.event_log {
        let sink = JsonlSink::create(path)
            .with_context(|| format!("failed to open event log {}", path.display()))?;
        console = console.with_event_log(sink);
    }

    for line in console.init().lines {
        println!("{line}");
    }

    match &args.script {
        Some(path) => {
            for line in console::run_script_file(&mut console, path)? {
                println!("{line}");
            }
        }
        None => {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = line.context("failed to read stdin")?;
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                for out in console.run_line(line).lines {
                    println!("{out}");
                }
            }
        }
    }

    console.shutdown();
    Ok(())
}
