//! CLI entry point for the search engine.
//!
//! Usage:
//!   state-search graph <graph.json> --from A --to B
//!   state-search maze --magic <n> --target <x,y> [--within <steps>] [--render]
//!   state-search elevator <floors.txt> [--extra-pairs <n>] [--max-steps <n>] [--no-canonical]
//!   state-search route <map.txt> [--return-home]
//!   state-search molecule <rules.txt> [--workers <n>] [--timeout <seconds>]
//!   state-search storage <df.txt>
//!   state-search vault <passcode>
//!
//! Every command that reads input accepts `--stdin` in place of a file.
//! Results are printed as JSON; the exit code is 0 when an answer exists.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use state_search::explorer::{self, ExplorerConfig};
use state_search::graph::Graph;
use state_search::grid::Position;
use state_search::parallel::ParallelConfig;
use state_search::puzzles::elevator::{Facility, Relocation};
use state_search::puzzles::maze::OfficeMaze;
use state_search::puzzles::molecule::Machine;
use state_search::puzzles::routing::{DuctMap, Tour};
use state_search::puzzles::storage::Cluster;
use state_search::puzzles::vault;
use state_search::search;

#[derive(Parser)]
#[command(name = "state-search")]
#[command(about = "Shortest paths and minimum-step searches over graphs and puzzle state spaces")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where to read the puzzle text from
#[derive(Args)]
struct Input {
    /// Path to the input file (use --stdin to read from stdin)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Read input from stdin instead of a file
    #[arg(long)]
    stdin: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Shortest path between two vertices of a JSON graph
    Graph {
        #[command(flatten)]
        input: Input,

        /// Start vertex
        #[arg(long)]
        from: String,

        /// Goal vertex
        #[arg(long)]
        to: String,
    },

    /// Walk the procedurally generated office maze
    Maze {
        /// The office designer's favorite number
        #[arg(long)]
        magic: u64,

        /// Destination as X,Y
        #[arg(long, value_parser = parse_position)]
        target: Position,

        /// Also count locations reachable in at most this many steps
        #[arg(long)]
        within: Option<u32>,

        /// Include a drawing of the route
        #[arg(long)]
        render: bool,
    },

    /// Fewest elevator trips to bring every item to the top floor
    Elevator {
        #[command(flatten)]
        input: Input,

        /// Extra chip/generator pairs added to the first floor
        #[arg(long, default_value = "0")]
        extra_pairs: usize,

        /// Give up on routes longer than this
        #[arg(long)]
        max_steps: Option<u32>,

        /// Deduplicate raw states instead of canonical forms
        #[arg(long)]
        no_canonical: bool,
    },

    /// Shortest tour through every numbered location of a duct map
    Route {
        #[command(flatten)]
        input: Input,

        /// Finish back at location 0
        #[arg(long)]
        return_home: bool,
    },

    /// Calibrate a molecule machine and count the steps to build the molecule
    Molecule {
        #[command(flatten)]
        input: Input,

        /// Worker threads (default: available parallelism)
        #[arg(long)]
        workers: Option<usize>,

        /// Stop searching after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Count viable node pairs and the moves to fetch data from a storage grid
    Storage {
        #[command(flatten)]
        input: Input,
    },

    /// Shortest and longest routes through the passcode-locked vault
    Vault {
        /// Passcode prefixed to every door hash
        passcode: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphOutput {
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    cost: Option<f64>,
    path: Vec<String>,
    nodes_expanded: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MazeOutput {
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    steps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    locations_within: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    drawing: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ElevatorOutput {
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    steps: Option<u32>,
    states_seen: usize,
    states_expanded: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    goal: Option<Facility>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RouteOutput {
    found: bool,
    #[serde(flatten)]
    tour: Option<Tour>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MoleculeOutput {
    calibration: usize,
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    steps: Option<u32>,
    search_exhausted: bool,
    states_seen: usize,
    time_elapsed_ms: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StorageOutput {
    viable_pairs: usize,
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    fewest_moves: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VaultOutput {
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    shortest_route: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    longest_route_length: Option<usize>,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("state_search=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Run one command, returning whether it produced an answer
fn run(command: Commands) -> anyhow::Result<bool> {
    match command {
        Commands::Graph { input, from, to } => {
            let json = read_input(&input)?;
            let graph = Graph::from_json(&json).context("failed to load graph")?;
            let start = graph.node(&from)?;
            let goal = graph.node(&to)?;

            let report = search::astar_report(&start, &goal, |_, _| 0.0);
            info!(expanded = report.stats.expanded, "graph search finished");

            let output = GraphOutput {
                found: report.path.is_some(),
                cost: report.path.as_ref().map(|p| p.cost()),
                path: report
                    .path
                    .as_ref()
                    .map(|p| p.iter().map(|n| n.name().to_string()).collect())
                    .unwrap_or_default(),
                nodes_expanded: report.stats.expanded,
            };
            print_json(&output)?;
            Ok(output.found)
        }

        Commands::Maze {
            magic,
            target,
            within,
            render,
        } => {
            let margin = within.unwrap_or(0).max(32) as usize;
            let maze = OfficeMaze::around(magic, target, margin);
            let steps = maze.steps_to(target);

            let output = MazeOutput {
                found: steps.is_some(),
                steps,
                locations_within: within.map(|w| maze.locations_within(w)),
                drawing: render.then(|| maze.render_route(target)),
            };
            print_json(&output)?;
            Ok(output.found)
        }

        Commands::Elevator {
            input,
            extra_pairs,
            max_steps,
            no_canonical,
        } => {
            let text = read_input(&input)?;
            let facility = Facility::parse(&text)
                .context("failed to parse floors")?
                .with_extra_pairs(extra_pairs)?;
            info!(kinds = facility.kinds(), "relocating facility");

            let config = ExplorerConfig {
                max_steps,
                canonicalize: !no_canonical,
            };
            let result = explorer::explore(&Relocation, facility, &config);

            let output = ElevatorOutput {
                found: result.is_solved(),
                steps: result.steps,
                states_seen: result.states_seen,
                states_expanded: result.expanded,
                goal: result.goal,
            };
            print_json(&output)?;
            Ok(output.found)
        }

        Commands::Route { input, return_home } => {
            let text = read_input(&input)?;
            let map = DuctMap::parse(&text).context("failed to parse duct map")?;
            let tour = map.shortest_tour(return_home);

            let output = RouteOutput {
                found: tour.is_some(),
                tour,
            };
            print_json(&output)?;
            Ok(output.found)
        }

        Commands::Molecule {
            input,
            workers,
            timeout,
        } => {
            let text = read_input(&input)?;
            let machine = Machine::parse(&text).context("failed to parse replacements")?;

            let mut config = ParallelConfig {
                deadline: timeout.map(Duration::from_secs),
                ..ParallelConfig::default()
            };
            if let Some(workers) = workers {
                config.workers = workers;
            }
            let outcome = machine.fabricate(&config);

            let output = MoleculeOutput {
                calibration: machine.calibrate(),
                found: outcome.steps.is_some(),
                steps: outcome.steps,
                search_exhausted: outcome.exhaustive,
                states_seen: outcome.states_seen,
                time_elapsed_ms: outcome.elapsed.as_millis() as u64,
            };
            print_json(&output)?;
            Ok(output.found)
        }

        Commands::Storage { input } => {
            let text = read_input(&input)?;
            let cluster = Cluster::parse(&text).context("failed to parse storage listing")?;
            info!(
                nodes = cluster.nodes().len(),
                width = cluster.width(),
                height = cluster.height(),
                "storage grid loaded"
            );

            let fewest_moves = cluster.fewest_moves();
            let output = StorageOutput {
                viable_pairs: cluster.viable_pairs(),
                found: fewest_moves.is_some(),
                fewest_moves,
            };
            print_json(&output)?;
            Ok(output.found)
        }

        Commands::Vault { passcode } => {
            let passcode = passcode.trim();
            let shortest_route = vault::shortest_route(passcode);
            let output = VaultOutput {
                found: shortest_route.is_some(),
                shortest_route,
                longest_route_length: vault::longest_route(passcode),
            };
            print_json(&output)?;
            Ok(output.found)
        }
    }
}

fn read_input(input: &Input) -> anyhow::Result<String> {
    if input.stdin {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read from stdin")?;
        Ok(buffer)
    } else if let Some(path) = &input.file {
        fs::read_to_string(path).with_context(|| format!("failed to read file {:?}", path))
    } else {
        bail!("must provide either a file path or --stdin")
    }
}

fn print_json<T: Serialize>(output: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(output)?);
    Ok(())
}

fn parse_position(s: &str) -> Result<Position, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, found {:?}", s))?;
    let x = x.trim().parse().map_err(|e| format!("bad x coordinate: {}", e))?;
    let y = y.trim().parse().map_err(|e| format!("bad y coordinate: {}", e))?;
    Ok(Position::new(x, y))
}
