//! Kestrel launcher host.
//!
//! Reads commands from stdin, drives the suggestion engine with them and
//! prints the ranked suggestions after each one.

mod providers;
mod repl;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use kestrel_engine::{EngineConfig, Orchestrator, ProviderRegistry};
use tracing::info;

/// Kestrel command line arguments.
#[derive(Parser, Debug)]
#[command(name = "kestrel")]
#[command(about = "Keyboard launcher driven from stdin")]
struct Args {
	/// Engine and provider configuration (TOML)
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	let config = match &args.config {
		Some(path) => load_config(path)?,
		None => EngineConfig::default(),
	};

	let mut registry = ProviderRegistry::new();
	registry.register(Arc::new(providers::Shortcuts::default()))?;
	registry.register(Arc::new(providers::Strings::default()))?;
	registry.apply_config(&config)?;

	let (mut engine, events) = Orchestrator::new(registry, &config);
	let entries = engine.refresh_providers().await;
	info!(entries, "catalog ready");

	repl::run(&mut engine, events, tokio::io::stdin(), tokio::io::stdout()).await
}

fn load_config(path: &std::path::Path) -> anyhow::Result<EngineConfig> {
	let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
	let config = EngineConfig::from_toml_str(&text).with_context(|| format!("parsing {}", path.display()))?;
	info!(path = %path.display(), "loaded configuration");
	Ok(config)
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_env("KESTREL_LOG")
		.or_else(|_| EnvFilter::try_from_default_env())
		.unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("kestrel=debug,kestrel_engine=debug,kestrel_worker=debug,info")
			} else {
				EnvFilter::new("warn")
			}
		});

	// stdout carries the suggestion list.
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}
