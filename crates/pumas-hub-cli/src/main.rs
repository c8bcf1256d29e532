//! Pumas Hub CLI - inspect hub repositories and fetch weight files.

mod runtime;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pumas_hub::{DeviceScope, Hub, HubBuilder, Kwargs, Source, WeightOptions};
use runtime::DescribingRuntime;
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "pumas-hub")]
#[command(about = "Fetch and inspect model hub repositories")]
#[command(disable_help_subcommand = true)]
struct Args {
    /// Hub home directory (defaults to $PUMAS_HOME or ~/.cache/pumas)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Packages the model runtime provides, for dependency checks
    #[arg(long = "provides", global = true, value_delimiter = ',')]
    provides: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the entry points of a repository
    List {
        repo: String,
        #[arg(long, default_value = "github")]
        source: Source,
        #[arg(long)]
        force_reload: bool,
    },
    /// Show the documentation of an entry point
    Help {
        repo: String,
        entry: String,
        #[arg(long, default_value = "github")]
        source: Source,
        #[arg(long)]
        force_reload: bool,
    },
    /// Invoke an entry point and print the resulting model description
    Load {
        repo: String,
        entry: String,
        #[arg(long, default_value = "github")]
        source: Source,
        #[arg(long)]
        force_reload: bool,
        /// Keyword arguments as a JSON object
        #[arg(long, default_value = "{}")]
        kwargs: String,
    },
    /// Download a repository into the cache and print its directory
    Fetch {
        repo: String,
        #[arg(long, default_value = "github")]
        source: Source,
        #[arg(long)]
        force_reload: bool,
    },
    /// Download a weight file and print where it was stored
    Weights {
        url: String,
        #[arg(long)]
        model_dir: Option<PathBuf>,
        #[arg(long)]
        file_name: Option<String>,
        #[arg(long)]
        check_hash: bool,
        /// Device to load on (cpu, gpu, xpu, npu, numpy)
        #[arg(long)]
        device: Option<DeviceScope>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let mut builder = HubBuilder::new();
    if let Some(home) = args.home {
        builder = builder.home(home);
    }
    let hub = builder.build(DescribingRuntime::new(args.provides))?;
    debug!("Using hub dir {}", hub.paths().hub_dir().display());

    run(&hub, args.command)
}

fn run(hub: &Hub<DescribingRuntime>, command: Command) -> Result<()> {
    match command {
        Command::List {
            repo,
            source,
            force_reload,
        } => {
            for name in hub.list(&repo, source, force_reload)? {
                println!("{}", name);
            }
        }
        Command::Help {
            repo,
            entry,
            source,
            force_reload,
        } => match hub.help(&repo, &entry, source, force_reload)? {
            Some(doc) => println!("{}", doc),
            None => println!("No documentation for '{}'", entry),
        },
        Command::Load {
            repo,
            entry,
            source,
            force_reload,
            kwargs,
        } => {
            let kwargs: Kwargs =
                serde_json::from_str(&kwargs).context("--kwargs must be a JSON object")?;
            let model = hub.load(&repo, &entry, source, force_reload, &kwargs)?;
            println!("{}", serde_json::to_string_pretty(&model)?);
        }
        Command::Fetch {
            repo,
            source,
            force_reload,
        } => {
            let entry = hub.resolve_repo(&repo, source, force_reload)?;
            println!("{}", entry.root_dir.display());
        }
        Command::Weights {
            url,
            model_dir,
            file_name,
            check_hash,
            device,
        } => {
            let mut options = WeightOptions::new().check_hash(check_hash);
            if let Some(dir) = model_dir {
                options = options.model_dir(dir);
            }
            if let Some(name) = file_name {
                options = options.file_name(name);
            }
            if let Some(scope) = device {
                options = options.device_scope(scope);
            }

            let artifact = hub.resolve_weights(&url, &options)?;
            let loaded = artifact.load(hub.runtime())?;
            println!("{} ({:?})", artifact.file_path.display(), artifact.encoding);
            println!("{}", serde_json::to_string_pretty(&loaded)?);
        }
    }
    Ok(())
}
