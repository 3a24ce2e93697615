use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use std::process::ExitCode;

use postcache::app::App;
use postcache::commands::{self, Command, Outcome};
use postcache::config::{CacheBackend, Config};
use postcache::logging;

#[derive(Parser, Debug)]
#[command(name = "postcache")]
#[command(about = "Browse and edit posts and comments through a local cache")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/postcache/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Keep the cache in memory for this run only
  #[arg(long)]
  ephemeral: bool,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = Config::load(args.config.as_deref())?;

  // Override cache backend if requested on command line
  let config = if args.ephemeral {
    let mut config = config;
    config.cache.backend = CacheBackend::Memory;
    config
  } else {
    config
  };

  let _log_guard = logging::init(&config)?;

  let app = App::new(&config)?;
  let mut stdout = std::io::stdout().lock();
  let outcome = commands::execute(&app, args.command, &mut stdout).await?;

  Ok(match outcome {
    Outcome::Done => ExitCode::SUCCESS,
    Outcome::NotFound | Outcome::LoadFailed => ExitCode::FAILURE,
  })
}
