/// Pulse Server - social media backend
use clap::{Parser, Subcommand};
use pulse_core::SocialStore;
use pulse_server::{
    config::{MediaProvider, ServerConfig},
    create_router,
    services::{media, AccountService, AuthService},
    state::AppState,
};
use pulse_storage::SqliteStore;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pulse-server")]
#[command(about = "Pulse social media server", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./config.toml if present)
    #[arg(short, long, global = true, env = "PULSE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Register a new user
    AddUser {
        /// Login email
        #[arg(short, long)]
        email: String,
        /// Display name
        #[arg(short, long)]
        name: String,
        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// List all users
    ListUsers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulse_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::AddUser {
            email,
            name,
            password,
        } => add_user(config, &email, &name, &password).await?,
        Commands::ListUsers => list_users(config).await?,
    }

    Ok(())
}

fn auth_service(config: &ServerConfig) -> anyhow::Result<Arc<AuthService>> {
    Ok(Arc::new(
        AuthService::new(config.token_settings()?)
            .with_secure_cookies(config.auth.secure_cookies),
    ))
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    tracing::info!("Starting Pulse Server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    // Initialize database
    let store: Arc<dyn SocialStore> =
        Arc::new(SqliteStore::open(&config.storage.database_url).await?);
    tracing::info!("Database connected");

    // Initialize media host
    let media_host = media::from_config(&config.media).await?;
    let media_dir =
        (config.media.provider == MediaProvider::Local).then(|| config.media.path.clone());

    let auth_service = auth_service(&config)?;
    tracing::info!(
        secure_cookies = config.auth.secure_cookies,
        "Auth service initialized"
    );

    // Build application state and router
    let app_state = AppState::new(store, auth_service, media_host);
    let app = create_router(app_state, media_dir);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

async fn add_user(
    config: ServerConfig,
    email: &str,
    name: &str,
    password: &str,
) -> anyhow::Result<()> {
    let store: Arc<dyn SocialStore> =
        Arc::new(SqliteStore::open(&config.storage.database_url).await?);
    let media_host = media::from_config(&config.media).await?;

    let accounts = AccountService::new(store, auth_service(&config)?, media_host);
    let user = accounts.signup(email, password, name).await?;

    println!("Created user {} <{}> ({})", user.name, user.email, user.id);
    Ok(())
}

async fn list_users(config: ServerConfig) -> anyhow::Result<()> {
    let store = SqliteStore::open(&config.storage.database_url).await?;
    let users = store.list_users().await?;

    println!("Users:");
    for user in users {
        println!(
            "  {} - {} <{}> ({} posts, {} followers, {} following)",
            user.id,
            user.name,
            user.email,
            user.posts.len(),
            user.followers.len(),
            user.followings.len()
        );
    }

    Ok(())
}
