//! formwire CLI
//!
//! ## Usage
//!
//! ```bash
//! formwire init --out resources/
//! formwire check formwire.toml
//! ```

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "formwire")]
#[command(about = "Publish formwire resources and check settings", long_about = None)]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Verbosity level (can be repeated)
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	verbosity: u8,
}

#[derive(Subcommand)]
enum Commands {
	/// Write the bundled locale files and a default formwire.toml
	Init {
		/// Directory to publish into
		#[arg(long, value_name = "DIR", default_value = ".")]
		out: PathBuf,

		/// Overwrite files that already exist
		#[arg(long)]
		force: bool,
	},

	/// Load a settings file the way the library does and report problems
	Check {
		#[arg(value_name = "FILE")]
		file: PathBuf,

		/// Also apply FORMWIRE_* environment variables
		#[arg(long)]
		env: bool,
	},
}

fn init_tracing(verbosity: u8) {
	let default = match verbosity {
		0 => "info",
		1 => "debug",
		_ => "trace",
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}

fn main() {
	let cli = Cli::parse();
	init_tracing(cli.verbosity);

	let result = match cli.command {
		Commands::Init { out, force } => run_init(out, force),
		Commands::Check { file, env } => run_check(file, env),
	};

	if let Err(e) = result {
		eprintln!("{} {:#}", "Error:".red().bold(), e);
		process::exit(1);
	}
}

fn run_init(out: PathBuf, force: bool) -> anyhow::Result<()> {
	let report = commands::publish(&out, force)?;
	for path in &report.written {
		println!("{} {}", "Created".green().bold(), path.display());
	}
	for path in &report.skipped {
		println!(
			"{} {} (exists, use --force to overwrite)",
			"Skipped".yellow().bold(),
			path.display()
		);
	}
	Ok(())
}

fn run_check(file: PathBuf, env: bool) -> anyhow::Result<()> {
	let settings = commands::check(&file, env)?;
	println!("{} {}", "Valid".green().bold(), file.display());
	println!("  validation delay: {:?}", settings.validation_delay());
	println!("  alert duration:   {:?}", settings.alert_duration());
	println!("  event name:       {}", settings.event_name);
	println!("  locales:          {}", settings.supported_locales.join(", "));
	Ok(())
}
