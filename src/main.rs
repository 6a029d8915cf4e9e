use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nnav_bridge::config::{self, BridgeConfig};
use nnav_bridge::models::{CoordinateSpace, MarkerKind, PositionList};
use nnav_bridge::{build, render, session, xml};

#[derive(Parser)]
#[command(name = "nnav")]
#[command(about = "Convert neuronavigation marker files to and from simulation coil positions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a marker file
    Inspect {
        /// InstrumentMarkerList or TriggerMarkerList XML file
        file: PathBuf,
    },
    /// Convert a marker file to a position list (JSON)
    Convert {
        file: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Convert a position list (JSON) to a marker file
    Export {
        input: PathBuf,
        output: PathBuf,

        /// World space of the written file
        #[arg(short, long, value_enum)]
        space: Option<SpaceArg>,

        /// Marker list schema to write
        #[arg(short, long, value_enum)]
        kind: Option<KindArg>,
    },
    /// List marker files in a neuronavigation data directory
    Sessions { dir: PathBuf },
    /// Show the effective configuration
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SpaceArg {
    Ras,
    Lps,
}

impl From<SpaceArg> for CoordinateSpace {
    fn from(arg: SpaceArg) -> Self {
        match arg {
            SpaceArg::Ras => Self::Ras,
            SpaceArg::Lps => Self::Lps,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Instrument,
    Trigger,
}

impl From<KindArg> for MarkerKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Instrument => Self::Instrument,
            KindArg::Trigger => Self::Trigger,
        }
    }
}

/// Initialize tracing on stderr so stdout stays clean for JSON output
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "nnav_bridge=info,nnav=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();
    let config = BridgeConfig::load();

    match cli.command {
        Commands::Inspect { file } => {
            let markers = xml::read_marker_file(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            print!("{}", render::render_summary(&markers));
        }
        Commands::Convert { file, output } => {
            let markers = xml::read_marker_file(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let positions = build::build(markers);
            let json = if config.pretty_json {
                serde_json::to_string_pretty(&positions)?
            } else {
                serde_json::to_string(&positions)?
            };

            match output {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!("Wrote {} position(s) to {}", positions.len(), path.display());
                }
                None => println!("{}", json),
            }
        }
        Commands::Export {
            input,
            output,
            space,
            kind,
        } => {
            let content = fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let positions: PositionList = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", input.display()))?;

            let space = space.map(CoordinateSpace::from).unwrap_or(config.output_space);
            let kind = kind.map(MarkerKind::from).unwrap_or(config.output_kind);
            let markers = build::disassemble_as(&positions, space, kind, &config.marker_color);
            xml::write_marker_file(&markers, &output)
                .with_context(|| format!("Failed to write {}", output.display()))?;

            tracing::info!(
                "Wrote {} {} marker(s) in {} to {}",
                markers.markers.len(),
                kind.as_str(),
                space.as_str(),
                output.display()
            );
        }
        Commands::Sessions { dir } => {
            let sessions = session::discover(&dir)
                .with_context(|| format!("Failed to scan {}", dir.display()))?;
            if sessions.is_empty() {
                println!("No sessions found under {}", dir.display());
            } else {
                print!("{}", render::render_sessions(&sessions));
            }
        }
        Commands::Config { init } => {
            if init {
                let path = BridgeConfig::default().save()?;
                println!("Wrote default configuration to {}", path.display());
            } else {
                println!("# {}", config::config_path()?.display());
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}
