use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use echo_chamber::generate::{self, GeneratorConfig};
use echo_chamber::render;
use echo_chamber::{
    Algorithm, AnalyzerConfig, CommunityDetection, EchoError, EdgeListFormat, EditOutcome,
    NetworkReport, Session,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "echo-chamber", version, about = "Polarization and echo-chamber analysis")]
struct Cli {
    #[command(flatten)]
    analyzer: AnalyzerArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct AnalyzerArgs {
    /// TOML file with analyzer settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true, value_enum)]
    algorithm: Option<Algorithm>,

    #[arg(long, global = true)]
    resolution: Option<f64>,

    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Input dialect; guessed from the file extension when omitted
    #[arg(long, global = true, value_enum)]
    format: Option<EdgeListFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a network and print its analysis
    Analyze {
        input: PathBuf,
        #[arg(long)]
        json: bool,
        /// Write a Graphviz file colored by community
        #[arg(long)]
        dot: Option<PathBuf>,
        /// Also render the dot file to this PNG (needs graphviz)
        #[arg(long, requires = "dot")]
        png: Option<PathBuf>,
    },
    /// Load a network and edit it interactively from stdin
    Session { input: Option<PathBuf> },
    /// Write a synthetic interaction network as CSV
    Generate {
        #[arg(long, default_value = "interactions.csv")]
        out: PathBuf,
        #[arg(long, default_value_t = 140)]
        users: usize,
        #[arg(long, default_value_t = 500)]
        interactions: usize,
        #[arg(long, default_value_t = 4)]
        communities: usize,
        #[arg(long, default_value_t = 0.05)]
        cross_probability: f64,
    },
}

impl AnalyzerArgs {
    fn resolve(&self, input: Option<&Path>) -> Result<AnalyzerConfig> {
        let mut config = match &self.config {
            Some(path) => AnalyzerConfig::from_path(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => AnalyzerConfig::default(),
        };
        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm;
        }
        if let Some(resolution) = self.resolution {
            config.resolution = resolution;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        match (self.format, input) {
            (Some(format), _) => config.format = format,
            (None, Some(path)) if self.config.is_none() => {
                config.format = EdgeListFormat::from_path(path)
            }
            _ => {}
        }
        config.validate()?;
        Ok(config)
    }
}

type DynSession = Session<Box<dyn CommunityDetection>>;

fn new_session(config: &AnalyzerConfig) -> DynSession {
    Session::with_detector(config.detector())
        .with_resolution(config.resolution)
        .with_format(config.format)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Analyze {
            input,
            json,
            dot,
            png,
        } => {
            let config = cli.analyzer.resolve(Some(input.as_path()))?;
            let mut session = new_session(&config);
            session
                .load_path(input)
                .with_context(|| format!("loading {}", input.display()))?;

            if let Some(report) = session.report() {
                if *json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    print_report(&report, &mut io::stdout().lock())?;
                }
            }
            if let Some(dot) = dot {
                write_visualization(&session, dot)?;
                if let Some(png) = png {
                    render::render_png(dot, png)?;
                }
            }
        }
        Commands::Session { input } => {
            let config = cli.analyzer.resolve(input.as_deref())?;
            let mut session = new_session(&config);
            if let Some(path) = input {
                run_command(&mut session, &format!("load {}", path.display()))?;
            }
            repl(&mut session)?;
        }
        Commands::Generate {
            out,
            users,
            interactions,
            communities,
            cross_probability,
        } => {
            let seed = cli.analyzer.resolve(None)?.seed;
            let config = GeneratorConfig {
                users: *users,
                interactions: *interactions,
                communities: *communities,
                cross_probability: *cross_probability,
                seed,
                ..GeneratorConfig::default()
            };
            let rows = generate::generate_interactions(&config)?;
            generate::write_interaction_csv(out, &rows)?;
            println!("wrote {} interactions to {}", rows.len(), out.display());
        }
    }

    Ok(())
}

fn write_visualization(session: &DynSession, path: &Path) -> Result<()> {
    match (session.graph(), session.partition()) {
        (Some(graph), Some(partition)) => Ok(render::write_dot(path, graph, partition)?),
        _ => Err(EchoError::NotLoaded.into()),
    }
}

fn print_report<W: Write>(report: &NetworkReport, out: &mut W) -> io::Result<()> {
    writeln!(out, "Total nodes:        {}", report.nodes)?;
    writeln!(out, "Total edges:        {}", report.edges)?;
    writeln!(out, "Communities:        {}", report.communities)?;
    writeln!(out, "Modularity:         {:.4}", report.modularity)?;
    writeln!(out, "Polarization score: {:.4}", report.polarization_score)?;
    writeln!(out, "Bridge connections: {}", report.bridges.len())?;
    let community = |c: Option<usize>| c.map_or_else(|| "N/A".to_string(), |c| c.to_string());
    for row in &report.bridges {
        writeln!(
            out,
            "  {} [{}] -- {} [{}]",
            row.node1,
            community(row.community1),
            row.node2,
            community(row.community2)
        )?;
    }
    Ok(())
}

const HELP: &str = "\
commands:
  load <path>       load a network (replaces the current one)
  add <u> <v>       add an edge
  remove <u> <v>    remove an edge
  report            show metrics and bridge edges
  json              show the report as JSON
  communities       list community members
  dot <path>        write a Graphviz file
  help              show this text
  quit              leave the session";

fn repl(session: &mut DynSession) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        match run_command(session, line.trim()) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => println!("error: {e:#}"),
        }
        write!(stdout, "> ")?;
        stdout.flush()?;
    }
    Ok(())
}

/// Runs one session command. Returns `false` when the user asked to quit.
/// Action errors are reported and leave the session as it was.
fn run_command(session: &mut DynSession, line: &str) -> Result<bool> {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or("");
    let first = parts.next().unwrap_or("");
    let second = parts.next().unwrap_or("");

    match command {
        "" => {}
        "quit" | "exit" => return Ok(false),
        "help" => println!("{HELP}"),
        "load" => {
            let path = line["load".len()..].trim();
            if path.is_empty() {
                println!("warning: please give a file to load");
                return Ok(true);
            }
            match session.load_path(path) {
                Ok(_) => {
                    if let Some(graph) = session.graph() {
                        println!(
                            "Successfully loaded graph with {} nodes and {} edges.",
                            graph.node_count(),
                            graph.edge_count()
                        );
                    }
                }
                Err(e) => println!("error: {e}"),
            }
        }
        "add" => match session.add_edge(first, second) {
            Ok(EditOutcome::AlreadyPresent) => println!("edge ({first}, {second}) already exists"),
            Ok(_) => println!("Added edge ({first}, {second})"),
            Err(EchoError::MissingInput) => println!("warning: please enter both node names"),
            Err(e) => println!("error: {e}"),
        },
        "remove" => match session.remove_edge(first, second) {
            Ok(_) => println!("Removed edge ({first}, {second})"),
            Err(EchoError::MissingInput) => println!("warning: please enter both node names"),
            Err(e) => println!("error: {e}"),
        },
        "report" => match session.report() {
            Some(report) => print_report(&report, &mut io::stdout().lock())?,
            None => println!("Load a network to begin the analysis."),
        },
        "json" => match session.report() {
            Some(report) => println!("{}", serde_json::to_string_pretty(&report)?),
            None => println!("Load a network to begin the analysis."),
        },
        "communities" => match session.partition() {
            Some(partition) => {
                for (id, members) in partition.members() {
                    println!("Community {id} ({} members): {}", members.len(), members.join(" "));
                }
            }
            None => println!("Load a network to begin the analysis."),
        },
        "dot" => {
            if first.is_empty() {
                println!("warning: please give an output path");
            } else {
                write_visualization(session, Path::new(first))?;
            }
        }
        other => println!("unknown command '{other}', try 'help'"),
    }
    Ok(true)
}
