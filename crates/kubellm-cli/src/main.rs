use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod report;

#[derive(Parser)]
#[command(
    name = "kgrade",
    about = "Kubellm resource grading: classify cluster nodes into resource-model grades",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the default 0–8 resource-model ladder
    Defaults {
        /// Output format: text, toml or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Validate a grading config and show the resolved ladder
    Validate {
        #[arg(short, long, default_value = "grading.toml")]
        config: String,
    },
    /// Grade a node inventory snapshot.
    ///
    /// The snapshot is a JSON array of nodes:
    /// `[{"name": "n1", "allocatable": {"cpu": "4", "memory": "16Gi"}}]`.
    /// Without --config the default ladder and policies are used.
    Classify {
        /// Grading config (grading.toml)
        #[arg(short, long)]
        config: Option<String>,
        /// Node snapshot (JSON)
        #[arg(short, long)]
        nodes: String,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Write a grading.toml scaffold spelling out the default ladder
    Init {
        #[arg(short, long, default_value = ".")]
        path: String,
        /// Overwrite an existing grading.toml
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::from_default_env()
        .add_directive("kubellm_grading=info".parse()?)
        .add_directive("kgrade=info".parse()?);
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Defaults { format } => commands::defaults::defaults(&format),
        Commands::Validate { config } => commands::validate::validate(&config),
        Commands::Classify {
            config,
            nodes,
            format,
        } => commands::classify::classify(config.as_deref(), &nodes, &format),
        Commands::Init { path, force } => commands::init::init(&path, force),
    }
}
