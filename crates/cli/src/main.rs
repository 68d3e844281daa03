//! Writes the procedural structure archetypes as structure JSON files.
//!
//! Usage:
//!   voidworld-structgen generate tower --out data/voidworld/structures
//!   voidworld-structgen generate all
//!   voidworld-structgen list

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use voidworld_world::{generate, Archetype, DEFAULT_STRUCTURES_DIR};

#[derive(Parser, Debug)]
#[command(author, version, about = "Procedural structure generator for VoidWorld", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one archetype (or `all`) and write it as JSON
    Generate {
        /// Archetype ID or alias (`tower`, `wall`, `building`), or `all`
        archetype: String,

        /// Output directory
        #[arg(long, default_value = DEFAULT_STRUCTURES_DIR)]
        out: PathBuf,
    },
    /// List the available archetypes
    List,
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
    run(Args::parse())
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::List => {
            for archetype in Archetype::ALL {
                let (w, h, d) = archetype.size();
                println!("{:<16} {:<28} {w}x{h}x{d}", archetype.id(), archetype.display_name());
            }
            Ok(())
        }
        Command::Generate { archetype, out } => {
            let selected = select(&archetype)?;
            for archetype in selected {
                let path = write_archetype(archetype, &out)?;
                println!("Generated {} at {}", archetype.display_name(), path.display());
            }
            Ok(())
        }
    }
}

fn select(name: &str) -> Result<Vec<Archetype>> {
    if name.eq_ignore_ascii_case("all") {
        return Ok(Archetype::ALL.to_vec());
    }
    let archetype: Archetype = name.parse().map_err(anyhow::Error::msg)?;
    Ok(vec![archetype])
}

fn write_archetype(archetype: Archetype, out: &Path) -> Result<PathBuf> {
    fs::create_dir_all(out).with_context(|| format!("Failed to create directory {}", out.display()))?;
    let definition = generate(archetype);
    let json = definition
        .to_json_pretty()
        .with_context(|| format!("Failed to serialize {}", archetype.id()))?;
    let path = out.join(format!("{}.json", archetype.id()));
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(structure = archetype.id(), blocks = definition.blocks.len(), path = %path.display(), "wrote structure");
    Ok(path)
}
