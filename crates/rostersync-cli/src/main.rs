use clap::{Parser, Subcommand};

mod commands;
mod logging;
mod terminal;

#[derive(Parser)]
#[command(name = "rostersync", version, about = "Live faction roster status")]
struct Cli {
    /// Write logs to stderr as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Keep the roster table in sync until Ctrl-C
    Watch {
        /// Faction id (defaults to config `default_faction`)
        #[arg(long)]
        faction: Option<String>,
        /// Print events as JSON lines instead of the table
        #[arg(long)]
        json: bool,
    },
    /// Poll once and print the ordered roster
    Snapshot {
        /// Faction id (defaults to config `default_faction`)
        #[arg(long)]
        faction: Option<String>,
        /// Print the roster as JSON
        #[arg(long)]
        json: bool,
    },
    /// API key management
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    let result = match cli.command {
        Commands::Watch { faction, json } => commands::watch::run(faction, json),
        Commands::Snapshot { faction, json } => commands::snapshot::run(faction, json),
        Commands::Auth { action } => commands::auth::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
