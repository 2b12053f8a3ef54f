mod cli;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{debug, error, info};
use tracing_subscriber::EnvFilter;

use plexus_core::kernel::constants;
use plexus_core::kernel::error::Result;
use plexus_core::mime::{GlobPatternDatabase, globs2};
use plexus_core::plugin_system::{DirectoryManifestSource, PluginManager, version_compare};
use plexus_core::storage::EngineConfig;

/// Plexus: plugin dependency resolution and MIME glob matching
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Engine configuration file (.json, .yaml or .toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Discover plugin manifests, resolve them and print the load order
    Plugins {
        /// Directory to search; defaults to the configured plugin paths
        dir: Option<PathBuf>,
    },
    /// Look up the MIME types of file names
    Mime {
        /// globs2 rule file; may be repeated, defaults to the configured glob files
        #[arg(long = "globs")]
        globs: Vec<PathBuf>,

        /// File names to look up
        #[arg(required = true)]
        filenames: Vec<String>,
    },
    /// Compare two plugin versions
    VersionCompare { first: String, second: String },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Ignore the error if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(args.verbose);
    debug!("{} {} starting", constants::APP_NAME, constants::APP_VERSION);

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match args.command {
        Commands::Plugins { dir } => run_plugins(config, dir).await,
        Commands::Mime { globs, filenames } => run_mime(&config, globs, &filenames).await,
        Commands::VersionCompare { first, second } => {
            println!("{}", cli::render_ordering(version_compare(&first, &second)));
            ExitCode::SUCCESS
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => Ok(EngineConfig::load(path)?),
        None => Ok(EngineConfig::default()),
    }
}

async fn run_plugins(config: EngineConfig, dir: Option<PathBuf>) -> ExitCode {
    let dirs = match dir {
        Some(dir) => vec![dir],
        None => config.plugin_paths.clone(),
    };

    let mut manager = PluginManager::new(config);
    if let Err(e) = discover_plugins(&mut manager, &dirs).await {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let enabled = manager.resolve();
    for name in &enabled {
        info!("Enabled '{}' because another plugin requires it", name);
    }
    print!("{}", cli::render_plugin_report(&manager));
    ExitCode::SUCCESS
}

async fn discover_plugins(manager: &mut PluginManager, dirs: &[PathBuf]) -> Result<()> {
    if dirs.is_empty() {
        return Err("No plugin directory given and none configured".into());
    }
    for dir in dirs {
        manager.load_manifests(&DirectoryManifestSource::new(dir)).await?;
    }
    Ok(())
}

async fn run_mime(config: &EngineConfig, globs: Vec<PathBuf>, filenames: &[String]) -> ExitCode {
    let files = if globs.is_empty() { config.glob_files.clone() } else { globs };
    let database = match load_glob_database(&files).await {
        Ok(database) => database,
        Err(e) => {
            error!("{}", e);
            eprintln!("Failed to read glob rules: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for filename in filenames {
        let result = database.matching_globs(filename);
        println!("{}", cli::render_mime_match(filename, &result));
    }
    ExitCode::SUCCESS
}

async fn load_glob_database(files: &[PathBuf]) -> Result<GlobPatternDatabase> {
    if files.is_empty() {
        return Err("No glob rule file given and none configured".into());
    }
    let mut database = GlobPatternDatabase::new();
    for file in files {
        for pattern in globs2::read_globs2_file(file).await? {
            database.add_glob(pattern);
        }
    }
    Ok(database)
}
