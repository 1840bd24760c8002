use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use docgraph::config::{self, ComponentMode, CrossPredicatePolicy};
use docgraph::graph_catalog::CatalogConfig;

/// DocGraph - compile graph-pattern queries into document-store join pipelines
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Query text to compile
    #[arg(long, short = 'q', conflicts_with = "query_file")]
    query: Option<String>,

    /// Read the query from a file
    #[arg(long)]
    query_file: Option<PathBuf>,

    /// YAML schema catalogue (tables, columns, edge columns)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// YAML compiler configuration; defaults to DOCGRAPH_* environment variables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Rows pulled from the predecessor stage per batch
    #[arg(long)]
    input_batch_size: Option<u32>,

    /// Rows emitted by a stage per batch
    #[arg(long)]
    output_batch_size: Option<u32>,

    /// How MATCH nodes are grouped: collapsed or connected
    #[arg(long)]
    component_mode: Option<ComponentMode>,

    /// What to do with predicates spanning several aliases: residual or reject
    #[arg(long)]
    cross_predicates: Option<CrossPredicatePolicy>,

    /// Reject MATCH aliases not declared in FROM
    #[arg(long)]
    strict_from: bool,

    /// Pretty-print the JSON plan
    #[arg(long)]
    pretty: bool,
}

impl From<&Cli> for config::CliConfig {
    fn from(cli: &Cli) -> Self {
        config::CliConfig {
            config_file: cli.config.clone(),
            input_batch_size: cli.input_batch_size,
            output_batch_size: cli.output_batch_size,
            component_mode: cli.component_mode,
            cross_predicate_policy: cli.cross_predicates,
            strict_from: cli.strict_from,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logger - defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            log::warn!("Ignoring .env file: {}", e);
        }
    }

    let cli = Cli::parse();

    let config = config::CompilerConfig::from_cli((&cli).into())
        .context("Configuration error")?;

    let catalog = match &cli.catalog {
        Some(path) => CatalogConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load catalogue {}", path.display()))?,
        None => CatalogConfig::default(),
    };

    let query = match (&cli.query, &cli.query_file) {
        (Some(query), _) => query.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read query file {}", path.display()))?,
        (None, None) => bail!("Either --query or --query-file is required"),
    };

    log::info!(
        "Compiling with {} component mode, {} cross-alias predicates",
        config.component_mode,
        config.cross_predicate_policy
    );

    let compiled = docgraph::compile_query(&query, &catalog, &config)?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&compiled)?
    } else {
        serde_json::to_string(&compiled)?
    };
    println!("{}", json);
    Ok(())
}
