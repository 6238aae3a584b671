mod cmd;
mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use ovpack_lib::config::ConfigOverrides;
use ovpack_lib::platform::Platform;

use cmd::{
  BuildOptions, cmd_build, cmd_clean, cmd_info, cmd_init, cmd_provision, cmd_verify_tag,
};
use output::{OutputFormat, print_error};

/// ovpack - Build and package the FreeOverlay desktop application
#[derive(Parser)]
#[command(name = "ovpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Provision dependencies, compile the executable and package it
  Build {
    #[command(flatten)]
    project: ProjectArgs,

    /// Skip creating the venv and installing requirements
    #[arg(long)]
    skip_provision: bool,

    /// Remove previous build outputs first
    #[arg(long)]
    clean: bool,

    /// Release tag that must match the project version (e.g. v9.0.0)
    #[arg(long)]
    tag: Option<String>,

    /// Capture tool output instead of streaming it
    #[arg(short, long)]
    quiet: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// Create the virtual environment and install requirements only
  Provision {
    #[command(flatten)]
    project: ProjectArgs,

    /// Capture tool output instead of streaming it
    #[arg(short, long)]
    quiet: bool,
  },

  /// Remove the output and bundler work directories
  Clean {
    #[command(flatten)]
    project: ProjectArgs,
  },

  /// Show the detected platform and resolved build settings
  Info {
    #[command(flatten)]
    project: ProjectArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// Create ovpack.toml and launcher scripts
  Init {
    /// Project directory (default: current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Overwrite existing files
    #[arg(short, long)]
    force: bool,
  },

  /// Check that a release tag matches the project version
  VerifyTag {
    /// Tag to check (e.g. v9.0.0 or refs/tags/v9.0.0)
    #[arg(env = "GITHUB_REF_NAME")]
    tag: Option<String>,

    /// Project directory
    #[arg(short = 'C', long, default_value = ".")]
    project: PathBuf,
  },
}

#[derive(Args)]
struct ProjectArgs {
  /// Project directory
  #[arg(short = 'C', long, default_value = ".")]
  project: PathBuf,

  /// Target platform (default: the host)
  #[arg(long, value_enum)]
  platform: Option<TargetPlatform>,

  /// Output directory for the executable and archive
  #[arg(long)]
  dist_dir: Option<PathBuf>,

  /// Override the version read from the project metadata
  #[arg(long)]
  set_version: Option<String>,

  /// Python interpreter used to create the venv
  #[arg(long)]
  python: Option<PathBuf>,

  /// Requirements manifest
  #[arg(long)]
  manifest: Option<PathBuf>,

  /// Keep the console window on Windows
  #[arg(long)]
  console: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum TargetPlatform {
  Windows,
  Linux,
  Macos,
}

impl From<TargetPlatform> for Platform {
  fn from(target: TargetPlatform) -> Self {
    match target {
      TargetPlatform::Windows => Platform::Windows,
      TargetPlatform::Linux => Platform::Linux,
      TargetPlatform::Macos => Platform::MacOs,
    }
  }
}

impl ProjectArgs {
  fn overrides(&self) -> Result<ConfigOverrides> {
    Ok(ConfigOverrides {
      platform: self.platform.map(Platform::from),
      dist_dir: self.dist_dir.as_deref().map(absolute).transpose()?,
      version: self.set_version.clone(),
      interpreter: self.python.clone(),
      manifest: self.manifest.as_deref().map(absolute).transpose()?,
      console: self.console,
    })
  }
}

/// Paths given on the command line are relative to the working directory,
/// not to the project.
fn absolute(path: &Path) -> Result<PathBuf> {
  std::path::absolute(path).with_context(|| format!("Invalid path: {}", path.display()))
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match run(cli.command) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}

fn run(command: Commands) -> Result<()> {
  match command {
    Commands::Build {
      project,
      skip_provision,
      clean,
      tag,
      quiet,
      output,
    } => cmd_build(BuildOptions {
      overrides: project.overrides()?,
      project: project.project,
      install: !skip_provision,
      clean,
      tag,
      quiet,
      output,
    }),
    Commands::Provision { project, quiet } => cmd_provision(&project.project, &project.overrides()?, quiet),
    Commands::Clean { project } => cmd_clean(&project.project, &project.overrides()?),
    Commands::Info { project, output } => cmd_info(&project.project, &project.overrides()?, output),
    Commands::Init { path, force } => cmd_init(&path, force),
    Commands::VerifyTag { tag, project } => cmd_verify_tag(&project, tag.as_deref()),
  }
}
