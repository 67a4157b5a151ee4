use anyhow::Result;
use clap::{Parser, Subcommand};
use sqlx::migrate::MigrateDatabase;

use store_ratings::model::Role;
use store_ratings::password::hash_password;
use store_ratings::queries::user::{NewUser, insert_user};
use store_ratings::{Config, db, observability, server};

/// store-ratings - store rating and feedback service
#[derive(Parser)]
#[command(name = "store-ratings")]
#[command(about = "Store rating service with per-store aggregate averages", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server host address (overrides config file)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run database migrations
    Migrate,
    /// Drop database if exists and recreate with migrations
    Reset,
    /// Create the bootstrap admin account
    Seed {
        #[arg(long, default_value = "admin@example.com")]
        email: String,

        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    observability::init_observability(&config.observability.log_level)?;

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve_command(config).await
        }
        Commands::Migrate => migrate_command(config).await,
        Commands::Reset => reset_command(config).await,
        Commands::Seed { email, password } => seed_command(config, email, password).await,
    }
}

#[tracing::instrument(skip(config))]
async fn serve_command(config: Config) -> Result<()> {
    tracing::info!("Starting store-ratings server...");

    let pool = db::create_pool(&config.database.url, config.database.max_connections).await?;

    server::serve(config, pool).await
}

#[tracing::instrument(skip(config))]
async fn migrate_command(config: Config) -> Result<()> {
    tracing::info!("Running database migrations...");

    if !sqlx::Sqlite::database_exists(&config.database.url).await? {
        tracing::info!("Database does not exist, creating: {}", config.database.url);
        sqlx::Sqlite::create_database(&config.database.url).await?;
    }

    let pool = db::create_pool(&config.database.url, 1).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!("Migrations completed successfully");

    Ok(())
}

#[tracing::instrument(skip(config))]
async fn reset_command(config: Config) -> Result<()> {
    tracing::info!("Resetting database...");

    if sqlx::Sqlite::database_exists(&config.database.url).await? {
        tracing::warn!("Dropping existing database: {}", config.database.url);
        sqlx::Sqlite::drop_database(&config.database.url).await?;
    } else {
        tracing::info!("Database does not exist, nothing to drop");
    }

    migrate_command(config).await
}

#[tracing::instrument(skip(config, password))]
async fn seed_command(config: Config, email: String, password: String) -> Result<()> {
    tracing::info!("Seeding admin account...");

    let pool = db::create_pool(&config.database.url, 1).await?;

    let password_hash = hash_password(&password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let admin = insert_user(
        &pool,
        NewUser {
            name: "Admin".to_string(),
            email,
            password_hash,
            address: None,
            role: Role::Admin,
        },
    )
    .await
    .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    tracing::info!(user_id = %admin.id, email = %admin.email, "Admin account created");

    Ok(())
}
