use std::sync::Arc;

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use tracing::{info, warn};

use bookstore_auth::TokenService;
use bookstore_config::{CorsConfig, JwtConfig, ServerConfig, StoreBackend};
use bookstore_core::hash_password;
use bookstore_db::{init_db_pool, run_migrations};
use bookstore_models::{NewUser, Role};

use crate::store::{InventoryLedger, MemoryStore, OrderStore, PgStore, UserDirectory};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserDirectory>,
    pub inventory: Arc<dyn InventoryLedger>,
    pub orders: Arc<dyn OrderStore>,
    pub tokens: TokenService,
    pub cors_config: CorsConfig,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Wires every store seam to the same backing store.
    pub fn from_store<S>(
        store: Arc<S>,
        tokens: TokenService,
        cors_config: CorsConfig,
        metrics: Option<PrometheusHandle>,
    ) -> Self
    where
        S: UserDirectory + InventoryLedger + OrderStore + 'static,
    {
        Self {
            users: store.clone(),
            inventory: store.clone(),
            orders: store,
            tokens,
            cors_config,
            metrics,
        }
    }
}

pub async fn init_app_state(
    config: &ServerConfig,
    metrics: Option<PrometheusHandle>,
) -> anyhow::Result<AppState> {
    let tokens = TokenService::new(&JwtConfig::from_env());
    let cors_config = CorsConfig::from_env();

    match config.store_backend {
        StoreBackend::Postgres => {
            let database_url =
                std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
            let pool = init_db_pool(&database_url, config.database_max_connections)
                .await
                .context("Failed to connect to database")?;
            run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            info!("Connected to PostgreSQL");

            Ok(AppState::from_store(
                Arc::new(PgStore::new(pool)),
                tokens,
                cors_config,
                metrics,
            ))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; data is lost on shutdown");
            let store = Arc::new(MemoryStore::new());
            seed_memory_store(&store).await?;

            Ok(AppState::from_store(store, tokens, cors_config, metrics))
        }
    }
}

/// Demo catalogue and an `admin`/`admin123` account for the in-memory backend.
async fn seed_memory_store(store: &MemoryStore) -> anyhow::Result<()> {
    store
        .create_user(NewUser {
            username: "admin".to_string(),
            email: "admin@bookstore.local".to_string(),
            password_hash: hash_password("admin123").map_err(|err| err.error)?,
            address: "Head Office".to_string(),
            age: 30,
            customer_id: "CUST0".to_string(),
            role: Role::Admin,
        })
        .await?;

    let catalogue = [
        ("The Rust Programming Language", Decimal::new(3999, 2), 25),
        ("Designing Data-Intensive Applications", Decimal::new(4550, 2), 10),
        ("Structure and Interpretation of Computer Programs", Decimal::new(2999, 2), 5),
        ("The Pragmatic Programmer", Decimal::new(3200, 2), 1),
    ];
    for (title, price, stock) in catalogue {
        let id = store.add_book(title, price, stock).await;
        info!(book_id = %id, title, stock, "Seeded book");
    }

    Ok(())
}
