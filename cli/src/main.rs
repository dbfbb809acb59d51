use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use metanet_cli::util::{parse_combination, parse_designation, parse_direction, parse_strategy};
use metanet_cli::{
    read_model, reduce, status, Action, ExplorerState, Settings, StateArchive, TraversalRequest,
};
use metanet_core::{index_attributes, summarize, SimplificationMethod};
use serde::Serialize;
use serde_json::json;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    /// Model JSON file
    #[clap(short, long)]
    model: PathBuf,
    /// Settings TOML file
    #[clap(short, long)]
    config: Option<PathBuf>,
    /// State archive to resume from
    #[clap(short, long)]
    state: Option<PathBuf>,
    /// Write the resulting state archive here
    #[clap(short, long)]
    export: Option<PathBuf>,
    #[clap(long)]
    compartmentalization: Option<bool>,
    /// omission or replication
    #[clap(long)]
    strategy: Option<String>,
    /// Compartment filter, "*" or a comma-separated list
    #[clap(long)]
    compartments: Option<String>,
    /// Process filter, "*" or a comma-separated list
    #[clap(long)]
    processes: Option<String>,
    /// Omit an entity, as <entity>:<identifier>
    #[clap(long)]
    omit: Vec<String>,
    /// Replicate an entity, as <entity>:<identifier>
    #[clap(long)]
    replicate: Vec<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Attribute values with metabolite and reaction counts
    Summary,
    /// Candidates and the assembled network
    Network,
    Neighbors {
        focus: String,
        #[clap(short, long, default_value = "neighbors")]
        direction: String,
        #[clap(long, default_value = "union")]
        combine: String,
    },
    Proximity {
        #[clap(required = true)]
        focus: Vec<String>,
        #[clap(short = 'n', long, default_value = "1")]
        depth: u32,
        #[clap(short, long, default_value = "neighbors")]
        direction: String,
        #[clap(long, default_value = "union")]
        combine: String,
    },
    Path {
        source: String,
        target: String,
        /// Number of shortest paths; 1 takes the single shortest path
        #[clap(short = 'k', long, default_value = "1")]
        count: u32,
        #[clap(short, long, default_value = "successors")]
        direction: String,
        #[clap(long, default_value = "union")]
        combine: String,
    },
    Connect {
        #[clap(required = true)]
        targets: Vec<String>,
        #[clap(short = 'k', long, default_value = "1")]
        count: u32,
        #[clap(short, long, default_value = "neighbors")]
        direction: String,
        #[clap(long, default_value = "union")]
        combine: String,
    },
    Status,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    let model = read_model(&args.model)
        .with_context(|| format!("Failed to read model {}", args.model.display()))?;
    let settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;
    let state = match &args.state {
        Some(path) => StateArchive::read(path)
            .with_context(|| format!("Failed to read state archive {}", path.display()))?
            .restore(model),
        None => ExplorerState::new(model, settings),
    };
    let mut state = apply_overrides(state, &args)?;

    let output = match &args.command {
        Commands::Summary => {
            let rows = index_attributes(&state.model.reactions, &state.model.metabolites);
            to_value(&summarize(&rows))?
        }
        Commands::Network => json!({
            "candidacy": state.candidacy,
            "network": state.network,
        }),
        Commands::Status => to_value(&status(&state))?,
        Commands::Neighbors {
            focus,
            direction,
            combine,
        } => {
            let request = TraversalRequest::Neighbors {
                focus: focus.clone(),
                direction: parse_direction(direction)?,
            };
            state = traverse(state, request, combine)?;
            traversal_output(&state)
        }
        Commands::Proximity {
            focus,
            depth,
            direction,
            combine,
        } => {
            let request = TraversalRequest::Proximity {
                focus: focus.clone(),
                direction: parse_direction(direction)?,
                depth: *depth,
            };
            state = traverse(state, request, combine)?;
            traversal_output(&state)
        }
        Commands::Path {
            source,
            target,
            count,
            direction,
            combine,
        } => {
            let request = TraversalRequest::Path {
                source: source.clone(),
                target: target.clone(),
                direction: parse_direction(direction)?,
                count: *count,
            };
            state = traverse(state, request, combine)?;
            traversal_output(&state)
        }
        Commands::Connect {
            targets,
            count,
            direction,
            combine,
        } => {
            let request = TraversalRequest::Connection {
                targets: targets.clone(),
                direction: parse_direction(direction)?,
                count: *count,
            };
            state = traverse(state, request, combine)?;
            traversal_output(&state)
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    if let Some(path) = &args.export {
        StateArchive::capture(&state)
            .write(path)
            .with_context(|| format!("Failed to write state archive {}", path.display()))?;
    }
    Ok(())
}

/// Apply command-line settings and designations on top of the loaded state.
fn apply_overrides(mut state: ExplorerState, args: &Cli) -> Result<ExplorerState> {
    if let Some(compartmentalization) = args.compartmentalization {
        if compartmentalization != state.settings.compartmentalization {
            state = reduce(state, Action::SetCompartmentalization(compartmentalization))?;
        }
    }
    if let Some(strategy) = &args.strategy {
        let strategy = parse_strategy(strategy)?;
        if strategy != state.settings.simplification {
            state = reduce(state, Action::SetStrategy(strategy))?;
        }
    }
    if args.compartments.is_some() || args.processes.is_some() {
        let filters = &state.settings.filters;
        let action = Action::SetFilters {
            compartments: args.compartments.clone().unwrap_or_else(|| filters.compartments.clone()),
            processes: args.processes.clone().unwrap_or_else(|| filters.processes.clone()),
        };
        state = reduce(state, action)?;
    }

    let designations = args
        .omit
        .iter()
        .map(|d| (d, SimplificationMethod::Omission))
        .chain(args.replicate.iter().map(|d| (d, SimplificationMethod::Replication)));
    for (designation, method) in designations {
        let (entity, identifier) = parse_designation(designation)?;
        // Designating twice with the same method would toggle it off
        let held = state
            .designation(entity, &identifier)
            .map_or(false, |s| s.method == method);
        if held {
            info!(%designation, "designation already held");
            continue;
        }
        state = reduce(
            state,
            Action::ChangeSimplification {
                identifier,
                method,
                entity,
            },
        )
        .with_context(|| format!("Failed to apply designation {}", designation))?;
    }
    Ok(state)
}

fn traverse(
    state: ExplorerState,
    request: TraversalRequest,
    combine: &str,
) -> Result<ExplorerState> {
    let combination = parse_combination(combine)?;
    Ok(reduce(state, Action::Traverse(request, combination))?)
}

fn traversal_output(state: &ExplorerState) -> serde_json::Value {
    json!({
        "nodes": state.reached,
        "reactions": state.reached_reactions(),
        "subnetwork": state.subnetwork,
    })
}

fn to_value<T: Serialize>(value: &T) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(value)?)
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level.to_string()))
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
