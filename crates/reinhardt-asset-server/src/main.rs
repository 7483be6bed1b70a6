//! Reinhardt Assets CLI
//!
//! Serves the bundles declared in a settings file.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use reinhardt_asset_server::{
	AssetSettings, HttpServer, ServerResult, ShutdownCoordinator, build_router, shutdown_signal,
};
use reinhardt_bundle::BundleRequest;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Reinhardt Assets - bundled static asset server
#[derive(Parser)]
#[command(name = "reinhardt-assets")]
#[command(author, version, about, long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Increase log verbosity (-v debug, -vv trace)
	#[arg(short, long, action = ArgAction::Count, global = true)]
	verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
	/// Serve the configured bundles
	Serve {
		/// Settings file path
		#[arg(short, long)]
		config: PathBuf,

		/// Override the bind host
		#[arg(long)]
		host: Option<String>,

		/// Override the bind port
		#[arg(long)]
		port: Option<u16>,
	},

	/// Build every bundle once and print its fingerprint
	Check {
		/// Settings file path
		#[arg(short, long)]
		config: PathBuf,
	},
}

fn main() -> ExitCode {
	let cli = Cli::parse();

	// RUST_LOG wins over -v
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
		0 => EnvFilter::new("info"),
		1 => EnvFilter::new("debug"),
		_ => EnvFilter::new("trace"),
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(false)
		.with_writer(std::io::stderr)
		.init();

	let result = match cli.command {
		Commands::Serve { config, host, port } => run_serve(&config, host, port),
		Commands::Check { config } => run_check(&config),
	};

	match result {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			error!("{}", e);
			ExitCode::from(2)
		}
	}
}

fn load_settings(config: &Path) -> ServerResult<AssetSettings> {
	let mut settings = AssetSettings::from_file(config)?;
	settings.apply_env_overrides()?;
	Ok(settings)
}

fn run_serve(config: &Path, host: Option<String>, port: Option<u16>) -> ServerResult<()> {
	let mut settings = load_settings(config)?;
	if let Some(host) = host {
		settings.server.host = host;
	}
	if let Some(port) = port {
		settings.server.port = port;
	}

	let addr = settings.server.socket_addr()?;
	let router = build_router(&settings)?;
	let coordinator =
		ShutdownCoordinator::new(Duration::from_secs(settings.server.shutdown_timeout_secs));

	let runtime = tokio::runtime::Runtime::new()?;
	runtime.block_on(async move {
		let trigger = coordinator.clone();
		tokio::spawn(async move {
			shutdown_signal().await;
			trigger.shutdown();
		});

		HttpServer::new(Arc::new(router))
			.listen_with_shutdown(addr, coordinator)
			.await
	})
}

fn run_check(config: &Path) -> ServerResult<()> {
	let settings = load_settings(config)?;
	let router = build_router(&settings)?;

	for (path, server) in router.mounts() {
		server.handle(&BundleRequest::new(path))?;

		match server.current() {
			Some(artifact) => println!(
				"{}\t{} sources\t{} bytes\t{}",
				path,
				server.sources().len(),
				artifact.len(),
				artifact.fingerprint().hex()
			),
			None => println!("{}\tno sources", path),
		}
	}

	Ok(())
}
