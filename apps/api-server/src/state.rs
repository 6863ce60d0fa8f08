//! Application state - shared across all handlers.

use std::sync::Arc;

use social_core::FeedService;
use social_infra::{InMemoryDatabase, LocalMediaStore};

#[cfg(feature = "postgres")]
use social_infra::database::{
    DatabaseConnections, PostgresCommentRepository, PostgresPostRepository,
    PostgresUserRepository,
};

use crate::config::{AppConfig, MediaConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub feed: FeedService,
    /// URL prefix media is served under, ending in `/`.
    pub media_url: String,
    pub max_upload_bytes: usize,
    #[cfg(feature = "postgres")]
    pub db: Option<Arc<DatabaseConnections>>,
}

/// Which store the service is running against, for the health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Memory,
    Connected,
    Unreachable,
}

impl StoreStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreStatus::Memory => "memory",
            StoreStatus::Connected => "connected",
            StoreStatus::Unreachable => "unreachable",
        }
    }
}

impl AppState {
    /// Build the application state, connecting to PostgreSQL when configured.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        {
            if let Some(db_config) = &config.database {
                match DatabaseConnections::init(db_config).await {
                    Ok(connections) => {
                        if config.auto_migrate {
                            run_migrations(&connections).await;
                        }
                        tracing::info!("Application state initialized (postgres)");
                        return Self::postgres(Arc::new(connections), &config.media);
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            }
        }

        #[cfg(not(feature = "postgres"))]
        {
            if config.database.is_some() {
                tracing::warn!("Built without postgres support - ignoring DATABASE_URL");
            }
        }

        tracing::info!("Application state initialized (in-memory)");
        Self::in_memory(&config.media)
    }

    /// State over a fresh in-memory store.
    pub fn in_memory(media: &MediaConfig) -> Self {
        let db = InMemoryDatabase::new();
        let feed = FeedService::with_implicit_authors(
            Arc::new(db.users()),
            Arc::new(db.posts()),
            Arc::new(db.comments()),
            Arc::new(media_store(media)),
        );

        Self {
            feed,
            media_url: media.url_prefix.clone(),
            max_upload_bytes: media.max_upload_bytes,
            #[cfg(feature = "postgres")]
            db: None,
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(connections: Arc<DatabaseConnections>, media: &MediaConfig) -> Self {
        let conn = &connections.main;
        let feed = FeedService::with_implicit_authors(
            Arc::new(PostgresUserRepository::new(conn.clone())),
            Arc::new(PostgresPostRepository::new(conn.clone())),
            Arc::new(PostgresCommentRepository::new(conn.clone())),
            Arc::new(media_store(media)),
        );

        Self {
            feed,
            media_url: media.url_prefix.clone(),
            max_upload_bytes: media.max_upload_bytes,
            db: Some(connections),
        }
    }

    pub async fn store_status(&self) -> StoreStatus {
        #[cfg(feature = "postgres")]
        {
            if let Some(db) = &self.db {
                return match db.ping().await {
                    Ok(()) => StoreStatus::Connected,
                    Err(e) => {
                        tracing::warn!(error = %e, "Database ping failed");
                        StoreStatus::Unreachable
                    }
                };
            }
        }

        StoreStatus::Memory
    }
}

fn media_store(media: &MediaConfig) -> LocalMediaStore {
    tracing::info!(root = %media.root.display(), url = %media.url_prefix, "Media store ready");
    LocalMediaStore::new(media.root.clone(), media.max_upload_bytes)
}

#[cfg(feature = "postgres")]
async fn run_migrations(connections: &DatabaseConnections) {
    use migration::{Migrator, MigratorTrait};

    match Migrator::up(&connections.main, None).await {
        Ok(()) => tracing::info!("Database migrations applied"),
        Err(e) => tracing::error!("Failed to apply migrations: {}", e),
    }
}
