mod commands;
mod utils;
mod workspace;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use workspace::Workspace;

#[derive(Parser)]
#[command(name = "tcflow")]
#[command(about = "Declarative Tencent Cloud resources from a YAML manifest", long_about = None)]
struct Cli {
    /// Manifest path (defaults to tcflow.local.yaml / tcflow.yaml discovery)
    #[arg(short, long, global = true, env = "TCFLOW_MANIFEST")]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the changes apply would make
    Plan {
        /// Plan against the recorded state without reading the remote side
        #[arg(long)]
        no_refresh: bool,
    },
    /// Create, update and delete resources to match the manifest
    Apply {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
        /// Plan against the recorded state without reading the remote side
        #[arg(long)]
        no_refresh: bool,
    },
    /// Delete managed resources
    Destroy {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
        /// Only destroy this address (<type>.<name>)
        #[arg(short, long)]
        target: Option<String>,
    },
    /// Adopt an existing resource into state
    Import {
        /// Resource address (<type>.<name>)
        address: String,
        /// Remote ID (composite IDs are joined with `#`)
        id: String,
    },
    /// Re-read every resource in state from the remote side
    Refresh,
    /// Show the recorded state
    Show {
        /// Only show this address
        address: Option<String>,
    },
    /// Evaluate the data sources declared in the manifest
    Query,
    /// Describe resource and data source types
    Schema {
        /// Type name (lists all types when omitted)
        resource_type: Option<String>,
    },
    /// Check the configured credentials
    Auth,
    /// Show version information
    Version,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Commands that need neither a manifest nor credentials
    match &cli.command {
        Commands::Version => {
            println!("tcflow {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::Schema { resource_type } => {
            return commands::schema::handle(resource_type.as_deref());
        }
        Commands::Auth => return commands::auth::handle(cli.file).await,
        _ => {}
    }

    let workspace = Workspace::open(cli.file)?;
    tracing::debug!("Using manifest {}", workspace.manifest_path.display());

    match cli.command {
        Commands::Plan { no_refresh } => commands::plan::handle(&workspace, !no_refresh).await,
        Commands::Apply { yes, no_refresh } => {
            commands::apply::handle(&workspace, yes, !no_refresh).await
        }
        Commands::Destroy { yes, target } => {
            commands::destroy::handle(&workspace, yes, target.as_deref()).await
        }
        Commands::Import { address, id } => {
            commands::import::handle(&workspace, &address, &id).await
        }
        Commands::Refresh => commands::refresh::handle(&workspace).await,
        Commands::Show { address } => commands::show::handle(&workspace, address.as_deref()).await,
        Commands::Query => commands::query::handle(&workspace).await,
        Commands::Version | Commands::Schema { .. } | Commands::Auth => {
            unreachable!("handled before the manifest is loaded")
        }
    }
}
