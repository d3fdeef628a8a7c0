use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use boardnet::config::{Config, LoggingConfig};
use boardnet::input::{load_hints, load_members};
use boardnet::models::{MemberProfile, RelationshipHint};
use boardnet::{BoardNetError, LayoutType, NetworkVisualizationService};

#[derive(Parser)]
#[command(name = "boardnet")]
#[command(about = "Relationship-network analysis for boards of directors")]
#[command(version)]
struct Cli {
    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct InputArgs {
    /// Members JSON: an array of members, or {"members": [...], "relationships": [...]}
    #[arg(long, short = 'm')]
    members: PathBuf,

    /// Extra relationship hints JSON array
    #[arg(long)]
    hints: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Build the network snapshot
    Generate {
        #[command(flatten)]
        input: InputArgs,

        /// Lay the snapshot out before printing it
        #[arg(long)]
        layout: Option<String>,
    },
    /// Report influencers, isolation, bridges, conflicts, opportunities and risks
    Analyze {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Compute node positions
    Layout {
        #[command(flatten)]
        input: InputArgs,

        /// force-directed, circular, hierarchical or cluster
        #[arg(long, default_value = "force-directed")]
        layout: String,
    },
    /// Ask a free-text question about the network
    Query {
        #[command(flatten)]
        input: InputArgs,

        text: String,
    },
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_new(&logging.filter).unwrap_or_else(|_| EnvFilter::new("boardnet=info"));
    let (json, plain) = if logging.json {
        (
            Some(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
            None,
        )
    } else {
        (
            None,
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(plain)
        .init();
}

fn read_input(args: &InputArgs) -> anyhow::Result<(Vec<MemberProfile>, Vec<RelationshipHint>)> {
    let (members, mut hints) = load_members(&args.members)
        .with_context(|| format!("failed to read members from {}", args.members.display()))?;
    if let Some(path) = &args.hints {
        hints.extend(
            load_hints(path)
                .with_context(|| format!("failed to read hints from {}", path.display()))?,
        );
    }
    Ok((members, hints))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

fn run(cli: Cli, service: &NetworkVisualizationService) -> anyhow::Result<()> {
    match cli.command {
        Command::Generate { input, layout } => {
            let (members, hints) = read_input(&input)?;
            let snapshot = service.generate_network_data(&members, &hints)?;
            let snapshot = match layout {
                Some(name) => service.apply_layout(&snapshot, Some(name.parse::<LayoutType>()?)),
                None => snapshot,
            };
            print_json(&snapshot, cli.pretty)
        }
        Command::Analyze { input } => {
            let (members, hints) = read_input(&input)?;
            let snapshot = service.generate_network_data(&members, &hints)?;
            print_json(&service.analyze_network(&snapshot), cli.pretty)
        }
        Command::Layout { input, layout } => {
            let layout: LayoutType = layout.parse()?;
            let (members, hints) = read_input(&input)?;
            let snapshot = service.generate_network_data(&members, &hints)?;
            print_json(
                &service.calculate_optimal_layout(&snapshot, Some(layout)),
                cli.pretty,
            )
        }
        Command::Query { input, text } => {
            let (members, hints) = read_input(&input)?;
            let snapshot = service.generate_network_data(&members, &hints)?;
            print_json(
                &service.process_network_voice_query(&text, &snapshot),
                cli.pretty,
            )
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    let config = Config::from_env();
    init_tracing(&config.logging);

    let service = NetworkVisualizationService::new(&config);
    match run(cli, &service) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Command failed");
            eprintln!("error: {err:#}");
            let code = err
                .chain()
                .find_map(|cause| cause.downcast_ref::<BoardNetError>())
                .map(BoardNetError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}
