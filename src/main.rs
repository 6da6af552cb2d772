use std::sync::Arc;

use axum::Router;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use events_server::config::{Config, StorageBackend};
use events_server::handlers::AppState;
use events_server::routes::create_routes;
use events_server::storage::{EventStore, InMemoryEventStore, PgEventStore};

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("events_server=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env();

    let store: Arc<dyn EventStore> = match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&config.database_url)
                .await
                .expect("Failed to connect to database");

            tracing::info!("Successfully connected to database");

            sqlx::migrate!()
                .run(&pool)
                .await
                .expect("Failed to run migrations");

            tracing::info!("Migrations run successfully");

            Arc::new(PgEventStore::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory event storage, data will not survive a restart");
            Arc::new(InMemoryEventStore::new())
        }
    };

    let app: Router = create_routes(AppState::new(store));

    let addr = config.bind_addr;
    tracing::info!("🚀 Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
