//! Entry point: load config, wire dependencies, and run the server.

use credentials::auth::{PasswordHasher, TokenIssuer};
use credentials::config::{Config, StoreBackend};
use credentials::db::{self, CredentialStore, InMemoryCredentialStore, PgCredentialStore};
use credentials::{create_app, AppState, AuthService};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.uses_default_secret() {
        tracing::warn!("JWT_SECRET not set; using the development default");
    }

    let store: Arc<dyn CredentialStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let pool = db::create_pool(&config.database_url).await?;
            db::run_migrations(&pool).await?;
            tracing::info!("connected to the database");
            Arc::new(PgCredentialStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory credential store; accounts are lost on exit");
            Arc::new(InMemoryCredentialStore::new())
        }
    };

    let hasher = PasswordHasher::from_costs(
        config.hash_memory_kib,
        config.hash_iterations,
        config.hash_parallelism,
    )?;
    let tokens = TokenIssuer::new(config.jwt_secret.as_bytes());
    let auth_service = AuthService::new(store, hasher, tokens)?.with_policy(config.error_policy);

    let app = create_app(AppState::new(auth_service));

    tracing::info!(addr = %config.server_addr, policy = ?config.error_policy, "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
