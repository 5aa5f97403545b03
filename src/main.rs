//! cipherpath - inspect how virtual paths are resolved
//!
//! Usage:
//!   cipherpath init --root <dir>      - Write a default configuration
//!   cipherpath status                 - Show the configuration
//!   cipherpath split <name>           - Decompose a stream name
//!   cipherpath classify <path>        - Classify a reverse mode path
//!   cipherpath resolve <path>         - Resolve a path against the root tree

use anyhow::{bail, Context};
use cipherpath::{
    cache::CaseCache,
    config::{ttl_label, Config},
    crypto::PassthroughCodec,
    fs::{FsDirectoryScanner, NoStreams, ResolveContext, StreamDescriptor, VirtualPathClassifier},
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "cipherpath")]
#[command(author = "cipherpath Contributors")]
#[command(version)]
#[command(about = "Path resolution diagnostics for encrypted overlay mounts")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "~/.config/cipherpath/config.json")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration
    Init {
        /// Root storage directory
        #[arg(long)]
        root: String,

        /// Reverse (export) mode
        #[arg(long)]
        reverse: bool,

        /// Case-insensitive name resolution
        #[arg(long)]
        case_insensitive: bool,
    },

    /// Show the configuration
    Status,

    /// Repair and decompose a name with a stream suffix
    Split {
        /// Name such as \dir\file.txt:stream:$DATA
        name: String,
    },

    /// Classify a reverse mode path
    Classify {
        /// Path of the export view
        path: String,
    },

    /// Resolve a path against the root tree without encryption
    Resolve {
        /// Virtual path such as \Docs\Report.txt
        path: String,

        /// Ignore cached case information
        #[arg(long)]
        force_miss: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Setup logging
    let filter = if std::env::var_os("RUST_LOG").is_some() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set subscriber: {}", e);
    }

    let config_path = expand_tilde(&cli.config);

    if let Err(e) = run_command(cli.command, &config_path) {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run_command(command: Commands, config_path: &Path) -> anyhow::Result<()> {
    match command {
        Commands::Init {
            root,
            reverse,
            case_insensitive,
        } => cmd_init(config_path, root, reverse, case_insensitive),

        Commands::Status => cmd_status(config_path),

        Commands::Split { name } => cmd_split(&name),

        Commands::Classify { path } => cmd_classify(config_path, &path),

        Commands::Resolve { path, force_miss } => cmd_resolve(config_path, &path, force_miss),
    }
}

fn cmd_init(
    config_path: &Path,
    root: String,
    reverse: bool,
    case_insensitive: bool,
) -> anyhow::Result<()> {
    let mut config = Config::with_root(root);
    config.mount.reverse = reverse;
    config.cache.case_insensitive = case_insensitive;
    config.validate()?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    config.save(config_path)?;
    info!("Configuration saved to {:?}", config_path);
    Ok(())
}

fn cmd_status(config_path: &Path) -> anyhow::Result<()> {
    let config = Config::load(config_path)?;

    println!("cipherpath Status");
    println!("=================");
    println!();
    println!("Configuration: {:?}", config_path);
    println!("Root directory: {}", config.mount.root_dir);
    println!("Mode: {}", if config.mount.reverse { "reverse" } else { "forward" });
    println!(
        "Case-insensitive: {}",
        if config.cache.case_insensitive { "enabled" } else { "disabled" }
    );
    println!("Case cache TTL: {}", ttl_label(config.cache.ttl_secs));
    println!("Config descriptor: {}", config.names.config_name);
    println!("Directory IV name: {}", config.names.dir_iv_name);

    Ok(())
}

fn cmd_split(name: &str) -> anyhow::Result<()> {
    let desc = StreamDescriptor::split(name)?;

    println!("Path:   {}", desc);
    println!("Base:   {}", desc.base);
    println!("Stream: {}", desc.stream.as_deref().unwrap_or("(none)"));
    println!("Type:   {}", desc.stream_type.as_deref().unwrap_or("(none)"));
    Ok(())
}

fn cmd_classify(config_path: &Path, path: &str) -> anyhow::Result<()> {
    let config = Config::load(config_path)?;
    let classifier = VirtualPathClassifier::new(&config)?;

    println!("{:?}", classifier.classify(path));
    Ok(())
}

fn cmd_resolve(config_path: &Path, path: &str, force_miss: bool) -> anyhow::Result<()> {
    let config = Config::load(config_path)?;
    let root = config.mount.root_dir.clone();

    let scanner = Arc::new(FsDirectoryScanner::new(&root)?);
    let cache = Arc::new(CaseCache::new(&config.cache, scanner));
    let codec = Arc::new(PassthroughCodec::new(root));
    let ctx = ResolveContext::new(&config, cache, codec, Arc::new(NoStreams))?;

    match ctx.resolve(path, force_miss) {
        Ok(resolved) => {
            println!("{}", resolved.path());
            if ctx.cache().is_enabled() {
                println!("exists: {}", resolved.file_existed());
            }
            Ok(())
        }
        Err(e) => bail!("{}: {}", path, e),
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}
