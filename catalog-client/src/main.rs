use anyhow::Context as _;
use catalog_client::{Gateway, GatewayConfig, NETLIFY_FUNCTIONS_ROOT};
use catalog_common::{Action, Credentials, Database, SessionStore, SqliteSessionStore};
use clap::Parser;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
struct Cli {
    /// Origin the serverless functions are served from. Empty means same origin.
    #[arg(long, env = "CATALOG_API_BASE", default_value = "")]
    api_base: String,

    /// Path prefix the functions are mounted under
    #[arg(long, env = "CATALOG_FUNCTIONS_ROOT", default_value = NETLIFY_FUNCTIONS_ROOT)]
    functions_root: String,

    /// Local database holding the logged-in session
    #[arg(long, env = "DATABASE_URL", default_value = "./catalog.db")]
    database_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser)]
enum Commands {
    /// List all authors
    Authors,

    /// List all publishers
    Publishers,

    /// Fetch authors and publishers together
    Catalog,

    /// Queue a create/update/delete of an author
    EnqueueAuthor(EnqueueCommand),

    /// Queue a create/update/delete of a publisher
    EnqueuePublisher(EnqueueCommand),

    /// Ask the server to process queued operations
    RunQueue,

    /// Log in and remember the session locally
    Login(LoginCommand),

    /// Forget the local session
    Logout,

    /// Show the locally remembered session
    Whoami,
}

#[derive(Debug, Parser)]
struct EnqueueCommand {
    #[arg(long, value_enum)]
    action: Action,

    /// JSON payload describing the record
    #[arg(long, value_parser = parse_json)]
    payload: Value,
}

#[derive(Debug, Parser)]
struct LoginCommand {
    #[arg(long)]
    gmail: String,

    #[arg(long, env = "CATALOG_PASSWORD", hide_env_values = true)]
    password: String,
}

fn parse_json(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON payload: {}", e))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `RUST_LOG` directives when set and valid, otherwise `info`.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let gateway = Gateway::new(
        GatewayConfig::new(cli.api_base.clone()).with_functions_root(cli.functions_root.clone()),
    );

    match cli.command {
        Commands::Authors => print_json(&gateway.list_authors().await?)?,
        Commands::Publishers => print_json(&gateway.list_publishers().await?)?,
        Commands::Catalog => {
            let (authors, publishers) =
                futures::try_join!(gateway.list_authors(), gateway.list_publishers())?;

            print_json(&json!({
                "authors": authors,
                "publishers": publishers,
            }))?;
        }
        Commands::EnqueueAuthor(cmd) => {
            print_json(&gateway.enqueue_author(cmd.action, cmd.payload).await?)?
        }
        Commands::EnqueuePublisher(cmd) => {
            print_json(&gateway.enqueue_publisher(cmd.action, cmd.payload).await?)?
        }
        Commands::RunQueue => print_json(&gateway.run_queue().await?)?,
        Commands::Login(cmd) => {
            let store = open_session_store(&cli.database_url).await?;
            let user = gateway
                .login(&Credentials::new(cmd.gmail, cmd.password))
                .await
                .context("Login failed")?;

            store.save(&user).await?;
            info!("Saved session for {}", user.gmail);
            print_json(&user)?;
        }
        Commands::Logout => {
            let store = open_session_store(&cli.database_url).await?;
            store.clear().await?;
            info!("Session cleared");
        }
        Commands::Whoami => {
            let store = open_session_store(&cli.database_url).await?;
            match store.get().await? {
                Some(user) => print_json(&user)?,
                None => info!("Not logged in"),
            }
        }
    }

    Ok(())
}

async fn open_session_store(database_url: &str) -> anyhow::Result<SqliteSessionStore> {
    let db = Database::new(database_url).await?;
    Ok(SqliteSessionStore::new(db))
}
