use clap::{CommandFactory, Parser, Subcommand};
use streakboard_core::{Config, CoreError};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "streakboard", version, about = "75-day habit challenge tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account seeded with the default goals
    Register {
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Log in and remember the session
    Login {
        username: String,
        #[arg(long)]
        password: String,
    },
    /// End the current session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Today's goals, completion and streak
    Dashboard {
        /// Challenge day to show goal state for (clamped to 1..=75)
        #[arg(long, allow_hyphen_values = true)]
        day: Option<i64>,
    },
    /// Goal list management
    Goals {
        #[command(subcommand)]
        action: commands::goals::GoalsAction,
    },
    /// Flip a goal's completion for a day
    Toggle {
        goal_id: i64,
        /// Challenge day (defaults to the current day)
        #[arg(long, allow_hyphen_values = true)]
        day: Option<i64>,
    },
    /// Ranking of all users
    Scoreboard,
    /// Challenge settings
    Challenge {
        #[command(subcommand)]
        action: commands::challenge::ChallengeAction,
    },
    /// Account management
    Account {
        #[command(subcommand)]
        action: commands::account::AccountAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print a shell completion script
    Completions { shell: clap_complete::Shell },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("STREAKBOARD_LOG")
        .unwrap_or_else(|_| EnvFilter::new(Config::peek().unwrap_or_default().logging.level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Process exit code for an HTTP-style status.
fn exit_code(status: u16) -> i32 {
    match status {
        400 => 4,
        401 => 5,
        403 => 6,
        404 => 7,
        409 => 8,
        _ => 1,
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Register { username, password } => {
            commands::account::register(&username, &password)
        }
        Commands::Login { username, password } => commands::account::login(&username, &password),
        Commands::Logout => commands::account::logout(),
        Commands::Whoami => commands::account::whoami(),
        Commands::Dashboard { day } => commands::dashboard::run(day),
        Commands::Goals { action } => commands::goals::run(action),
        Commands::Toggle { goal_id, day } => commands::toggle::run(goal_id, day),
        Commands::Scoreboard => commands::scoreboard::run(),
        Commands::Challenge { action } => commands::challenge::run(action),
        Commands::Account { action } => commands::account::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "streakboard", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        let status = e
            .downcast_ref::<CoreError>()
            .map(CoreError::status_code)
            .unwrap_or(500);
        eprintln!("error ({status}): {e}");
        std::process::exit(exit_code(status));
    }
}
