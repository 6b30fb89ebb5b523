//! gatectl - inspect and edit a directory-gate cache

mod commands;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use gatecache::DirectoryCache;
use gatestore::{DirectoryGateConfig, GateOptions, DEFAULT_EXTENSION};
use tracing::info;

use crate::commands::Command;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Cache directory
    #[arg(short, long, default_value = "./cache")]
    dir: PathBuf,

    /// Logical cache name
    #[arg(short, long, default_value = "default")]
    name: String,

    /// LRU capacity (number of entries)
    ///
    /// The recency clock restarts at every invocation, so entries written by
    /// separate runs share the same stamps and are not evicted across runs.
    /// Eviction only happens among writes made within one process.
    #[arg(short, long, default_value_t = gatecache::DEFAULT_MAX_SIZE)]
    capacity: u64,

    /// File extension of cache entries
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    extension: String,

    /// Use keys verbatim as file names instead of hashing them
    #[arg(long)]
    no_hash_keys: bool,

    /// Store options as plain text instead of base64
    #[arg(long)]
    raw_options: bool,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    fn gate_config(&self) -> DirectoryGateConfig {
        let options = GateOptions::default()
            .with_extension(self.extension.clone())
            .with_hash_keys(!self.no_hash_keys)
            .with_encode_options(!self.raw_options);
        DirectoryGateConfig::new(self.name.clone())
            .with_directory(self.dir.clone())
            .with_options(options)
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();
    info!("Opening cache {:?} in {}", args.name, args.dir.display());

    let mut cache: DirectoryCache<String, String> =
        DirectoryCache::open_directory(args.gate_config(), args.capacity)
            .with_context(|| format!("Failed to open cache in {}", args.dir.display()))?;

    let stdout = io::stdout();
    let found = commands::run(&args.command, &mut cache, &mut stdout.lock())
        .context("Failed to write output")?;

    Ok(if found {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    fn invoke(dir: &TempDir, capacity: &str, command: &[&str]) -> bool {
        let dir = dir.path().to_str().unwrap();
        let mut argv = vec!["gatectl", "--dir", dir, "--capacity", capacity];
        argv.extend_from_slice(command);
        let args = Args::try_parse_from(argv).unwrap();

        let mut cache: DirectoryCache<String, String> =
            DirectoryCache::open_directory(args.gate_config(), args.capacity).unwrap();
        commands::run(&args.command, &mut cache, &mut Vec::new()).unwrap()
    }

    #[test]
    fn test_capacity_help_mentions_clock_restart() {
        let help = Args::command().render_long_help().to_string();
        assert!(help.contains("restarts at every invocation"));
    }

    #[test]
    fn test_separate_invocations_do_not_evict() {
        let dir = TempDir::new().unwrap();
        for (key, value) in [("a", "1"), ("b", "2"), ("c", "3")] {
            invoke(&dir, "1", &["set", key, value]);
        }

        assert!(invoke(&dir, "1", &["get", "a"]));
        assert!(invoke(&dir, "1", &["get", "b"]));
        assert!(invoke(&dir, "1", &["get", "c"]));
    }
}
