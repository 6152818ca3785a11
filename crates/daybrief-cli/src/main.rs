use clap::{CommandFactory, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "daybrief", version, about = "Daybrief CLI -- daily planning decision engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Item management (tasks and events)
    Item {
        #[command(subcommand)]
        action: commands::item::ItemAction,
    },
    /// Health snapshots and confidence analysis
    Health {
        #[command(subcommand)]
        action: commands::health::HealthAction,
    },
    /// Daily brief generation
    Brief {
        #[command(subcommand)]
        action: commands::brief::BriefAction,
    },
    /// Time-aware focus selection
    Focus {
        #[command(subcommand)]
        action: commands::focus::FocusAction,
    },
    /// Pairwise conflict resolution
    Conflict {
        #[command(subcommand)]
        action: commands::conflict::ConflictCmd,
    },
    /// Day-close flow
    Close {
        #[command(subcommand)]
        action: commands::close::CloseAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

fn main() {
    // Handle kept alive for the process lifetime; dropping it would stop
    // the logger.
    let _logger = flexi_logger::Logger::try_with_env_or_str("warn")
        .and_then(|logger| logger.start())
        .ok();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Item { action } => commands::item::run(action),
        Commands::Health { action } => commands::health::run(action),
        Commands::Brief { action } => commands::brief::run(action),
        Commands::Focus { action } => commands::focus::run(action),
        Commands::Conflict { action } => commands::conflict::run(action),
        Commands::Close { action } => commands::close::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
