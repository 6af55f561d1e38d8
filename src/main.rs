//! `users` - command-line access to the `users` table.
//!
//! Connection settings come from `config/default.*`, `config/{RUN_MODE}.*`
//! and `APP_DATABASE__*` environment variables (a `.env` file is honoured).
//! Results are printed to stdout as JSON.

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use user_repository::{Settings, UserId, UserRepository};

#[derive(Parser, Debug)]
#[command(
    name = "users",
    version,
    about = "Create, read, update and delete rows of the users table"
)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Insert a user and print the generated id
    Create { name: String, email: String },
    /// Print one user, or null when the id is unknown
    Get { id: UserId },
    /// Print every user
    List,
    /// Replace the name and email of a user
    Update {
        id: UserId,
        name: String,
        email: String,
    },
    /// Delete a user
    Delete { id: UserId },
}

fn init_tracing(level: &str, debug: bool) {
    let fallback = if debug { "debug" } else { level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .ok();
}

fn print_json<T: Serialize>(value: &T) -> user_repository::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> user_repository::Result<()> {
    // Load environment variables
    dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::new()?;
    init_tracing(&settings.logging.level, cli.debug);
    info!(
        "Configuration loaded ({}), store at {}:{}/{}",
        settings.environment,
        settings.database.host,
        settings.database.port,
        settings.database.name
    );

    let repo = UserRepository::from_config(settings.database);

    match cli.command {
        Commands::Create { name, email } => {
            let id = repo.create_user(&name, &email).await?;
            print_json(&serde_json::json!({ "id": id }))?;
        }
        Commands::Get { id } => {
            let user = repo.get_user_by_id(id).await?;
            print_json(&user)?;
        }
        Commands::List => {
            let users = repo.get_all_users().await?;
            print_json(&users)?;
        }
        Commands::Update { id, name, email } => {
            repo.update_user(id, &name, &email).await?;
            print_json(&serde_json::json!({ "updated": id }))?;
        }
        Commands::Delete { id } => {
            repo.delete_user(id).await?;
            print_json(&serde_json::json!({ "deleted": id }))?;
        }
    }

    Ok(())
}
