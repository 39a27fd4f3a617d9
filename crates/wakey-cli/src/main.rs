mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::alarm::AlarmSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "wakey",
    about = "Sunrise alarm clock: light ramp, then radio or Spotify",
    version,
    propagate_version = true
)]
struct Cli {
    /// Directory holding .wakey/ (default: home directory)
    #[arg(long, global = true, env = "WAKEY_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduler and HTTP API
    Serve {
        /// Port to listen on (default: server.port from config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Manage alarms
    Alarm {
        #[command(subcommand)]
        subcommand: AlarmSubcommand,
    },

    /// Show upcoming trigger times
    Next,

    /// List built-in radio stations
    Stations,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Serve { port } => cmd::serve::run(&root, port),
        Commands::Alarm { subcommand } => cmd::alarm::run(&root, subcommand, cli.json),
        Commands::Next => cmd::next::run(&root, cli.json),
        Commands::Stations => cmd::stations::run(cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
