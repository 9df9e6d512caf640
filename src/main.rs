//! rete-terms CLI: load term files and inspect the resulting term table.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use rete_terms::config::{IriPolicy, TermManagerConfig};
use rete_terms::loader;
use rete_terms::manager::TermManager;
use rete_terms::well_known::{WellKnown, WellKnownResources};

#[derive(Parser)]
#[command(name = "rete-terms", version, about = "Term canonicalization for RDF rule engines")]
struct Cli {
    /// TOML file with term manager settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Require absolute IRIs (overrides the config file).
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a JSON term file, initialize the well-known resources, and report.
    Load {
        /// Path to a JSON array of term specs.
        #[arg(long)]
        file: PathBuf,

        /// Print the interned table as JSON.
        #[arg(long)]
        dump: bool,
    },

    /// Show the well-known schema IRIs and their handles on a fresh manager.
    WellKnown,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => TermManagerConfig::load(path)?,
        None => TermManagerConfig::default(),
    };
    if cli.strict {
        config.iri_policy = IriPolicy::Strict;
    }

    match cli.command {
        Commands::Load { file, dump } => {
            let specs = loader::read_specs(&file)?;
            let mut manager = TermManager::new(config)?;
            let ids = loader::load_specs(&mut manager, &specs)?;
            let mut well_known = WellKnownResources::new();
            well_known.initialize(Some(&mut manager))?;
            let manager = manager.freeze();

            println!(
                "Loaded {} specs into {} terms from {}",
                ids.len(),
                manager.term_count(),
                file.display()
            );
            println!("{}", manager.stats());

            if dump {
                let json = serde_json::to_string_pretty(&manager.snapshot()).into_diagnostic()?;
                println!("{json}");
            }
        }

        Commands::WellKnown => {
            let mut manager = TermManager::new(config)?;
            let well_known = WellKnownResources::resolve(&mut manager)?;
            for which in WellKnown::ALL {
                println!("  {:<16} {:<24} {}", which.name(), which.iri(), well_known.get(which)?);
            }
        }
    }

    Ok(())
}
