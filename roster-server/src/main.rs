//! # Roster Server
//!
//! User directory backend: bearer-token login, a per-request authentication
//! gate and keyset-paginated user listing over PostgreSQL, or over an
//! in-memory directory in dev mode.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use roster_config::{Config, ConfigLoad, ConfigLoader, ConfigWarnings};
use roster_core::{
    AuthCrypto, IdSet, Principal,
    database::{
        InMemoryUsersRepository, PostgresUsersRepository, UsersRepository,
    },
    users::Credentials,
};
use roster_server::{AppState, create_app};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "roster-server")]
#[command(about = "User directory server with token authentication")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Path to the TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to a .env file to load before reading the environment
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    #[command(subcommand)]
    Db(DbCommand),
    /// Print an Argon2id hash of a password using the configured pepper
    HashPassword {
        /// Plaintext password to hash
        plaintext: String,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config(&cli.serve)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run_server(config).await,
        Command::Db(DbCommand::Migrate) => run_db_migrate(&config).await,
        Command::HashPassword { plaintext } => {
            let crypto = AuthCrypto::new(&config.auth.password_pepper)
                .context("failed to initialise password hashing")?;
            let hash = crypto
                .hash_password(&plaintext)
                .context("failed to hash password")?;
            println!("{hash}");
            Ok(())
        }
    }
}

fn load_config(args: &ServeArgs) -> anyhow::Result<Arc<Config>> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_config_path(path);
    }
    if let Some(path) = &args.env_file {
        loader = loader.with_env_file(path);
    }

    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "loaded configuration file");
    }
    log_warnings(&warnings);

    Ok(Arc::new(config))
}

fn log_warnings(warnings: &ConfigWarnings) {
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(
                    message = %warning.message,
                    hint = %hint,
                    "configuration warning"
                )
            }
            None => {
                warn!(message = %warning.message, "configuration warning")
            }
        }
    }
}

async fn connect_postgres(
    config: &Config,
    url: &str,
) -> anyhow::Result<PostgresUsersRepository> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(url)
        .await
        .context("failed to connect to PostgreSQL")?;
    Ok(PostgresUsersRepository::new(pool))
}

async fn run_db_migrate(config: &Config) -> anyhow::Result<()> {
    let url = config
        .database
        .url
        .as_deref()
        .context("no database URL configured; set ROSTER_DATABASE_URL")?;
    let repository = connect_postgres(config, url).await?;
    repository
        .initialize_schema()
        .await
        .context("database migration failed")?;
    info!("Database migrations applied successfully");
    Ok(())
}

async fn run_server(config: Arc<Config>) -> anyhow::Result<()> {
    let crypto = AuthCrypto::new(&config.auth.password_pepper)
        .context("failed to initialise password hashing")?;

    let users: Arc<dyn UsersRepository> = match config.database.url.as_deref() {
        Some(url) => {
            let repository = connect_postgres(&config, url).await?;
            repository
                .initialize_schema()
                .await
                .context("database migration failed")?;
            info!(
                max_connections = config.database.max_connections,
                "connected to PostgreSQL"
            );
            Arc::new(repository)
        }
        None => {
            let directory = dev_directory(&crypto)?;
            warn!(
                users = directory.len(),
                "serving the in-memory dev directory; log in as admin/admin"
            );
            Arc::new(directory)
        }
    };

    let state = AppState::new(Arc::clone(&config), users, Arc::new(crypto))?;
    let app = create_app(state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        address = %addr,
        dev_mode = config.dev_mode,
        "roster server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

/// Directory used when no database is configured (dev mode only).
fn dev_directory(
    crypto: &AuthCrypto,
) -> anyhow::Result<InMemoryUsersRepository> {
    let password_hash = crypto
        .hash_password("admin")
        .context("failed to hash dev admin password")?;

    Ok(InMemoryUsersRepository::new()
        .with_role(1, "ROLE_ADMIN")
        .with_role(2, "ROLE_USER")
        .with_module(1, "USERS")
        .with_submodule(1, "USERS_READ")
        .with_user(Credentials {
            principal: Principal {
                id: 1,
                username: "admin".into(),
                email: "admin@localhost".into(),
                enabled: true,
                is_admin: true,
                roles: IdSet::from(vec![1, 2]),
                modules: IdSet::from(vec![1]),
                submodules: IdSet::from(vec![1]),
            },
            password_hash,
        }))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
