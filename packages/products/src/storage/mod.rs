use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::types::{HarvestInput, Product, ProductPatch};

// Re-export modules
pub mod sqlite;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Product not found")]
    NotFound,
    #[error("Invalid configuration format")]
    InvalidFormat,
    #[error("Duplicate tracking code: {0}")]
    DuplicateId(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub provider: StorageProvider,
    pub enable_wal: bool,
    pub max_connections: u32,
    pub busy_timeout_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: StorageProvider::Sqlite {
                path: agritrace_core::database_file(),
            },
            enable_wal: true,
            max_connections: 10,
            busy_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StorageProvider {
    Sqlite { path: PathBuf },
}

/// Repository contract for produce records.
///
/// This is the only seam between the lifecycle engine and persistence;
/// a versioned compare-and-swap write can later slot in here without
/// touching calling code.
#[async_trait]
pub trait ProductStorage: Send + Sync {
    /// Run migrations and prepare the backend
    async fn initialize(&self) -> StorageResult<()>;

    // Core CRUD operations
    async fn create_product(&self, input: HarvestInput) -> StorageResult<Product>;
    async fn get_product(&self, id: &str) -> StorageResult<Option<Product>>;
    async fn list_products(&self) -> StorageResult<Vec<Product>>;

    /// Replace stage, timeline, and photos in a single write. The patch
    /// always carries all three so a timeline append and its photo append
    /// can never be split across writes.
    async fn update_product(&self, id: &str, patch: ProductPatch) -> StorageResult<Product>;

    // Queries
    /// Case-insensitive substring match over the crop label
    async fn search_products(&self, query: &str) -> StorageResult<Vec<Product>>;
    /// Legacy wide search: crop, tracking code, and timeline text
    /// (locations, handler names)
    async fn search_products_any(&self, query: &str) -> StorageResult<Vec<Product>>;

    // Storage information
    async fn count_products(&self) -> StorageResult<u64>;
}
