use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use cw_core::{config::app_config::DEFAULT_CONFIG_FILE, Mode};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
	Text,
	Binary,
}

impl From<ModeArg> for Mode {
	fn from(mode: ModeArg) -> Self {
		match mode {
			ModeArg::Text => Mode::Text,
			ModeArg::Binary => Mode::Binary,
		}
	}
}

#[derive(Parser, Debug)]
#[command(
	name = "chunkwatch",
	version,
	about = "Split files into fixed-size chunks and verify they reassemble"
)]
struct Cli {
	/// Path to the JSON config file, created with defaults if missing
	#[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
	config: PathBuf,

	/// Override the configured input directory
	#[arg(long, global = true)]
	input: Option<PathBuf>,

	/// Override the configured output directory
	#[arg(long, global = true)]
	output: Option<PathBuf>,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Poll the input directory and split every new file until interrupted
	Watch,
	/// Split a single file into the output directory
	Split {
		file: PathBuf,
		/// Force a pipeline instead of picking one by extension
		#[arg(long, value_enum)]
		mode: Option<ModeArg>,
	},
	/// Reassemble existing chunks of a file and compare them with the source
	Verify {
		file: PathBuf,
		#[arg(long, value_enum)]
		mode: Option<ModeArg>,
	},
	/// Write the default config file and exit
	InitConfig {
		/// Replace an existing file
		#[arg(long, default_value_t = false)]
		force: bool,
	},
}

#[tokio::main]
async fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.with_target(false)
		.init();

	let cli = Cli::parse();
	let overrides = commands::Overrides {
		config: cli.config,
		input: cli.input,
		output: cli.output,
	};

	match cli.command {
		Commands::Watch => commands::watch(&overrides.resolve()?).await,
		Commands::Split { file, mode } => {
			commands::split(&overrides.resolve()?, &file, mode.map(Mode::from))
		}
		Commands::Verify { file, mode } => {
			commands::verify(&overrides.resolve()?, &file, mode.map(Mode::from))
		}
		Commands::InitConfig { force } => commands::init_config(&overrides.config, force),
	}
}
