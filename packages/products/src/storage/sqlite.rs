use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{migrate::MigrateDatabase, Row};
use tracing::{debug, info};

use super::{
    ProductStorage, StorageConfig, StorageError, StorageProvider, StorageResult,
};
use crate::types::{HarvestInput, Product, ProductPatch, Stage, StageEntry};
use agritrace_core::generate_tracking_code;
use async_trait::async_trait;

/// SQLite implementation of ProductStorage
pub struct SqliteStorage {
    pool: SqlitePool,
    config: StorageConfig,
}

impl SqliteStorage {
    /// Create a new SqliteStorage instance
    pub async fn new(config: StorageConfig) -> StorageResult<Self> {
        let StorageProvider::Sqlite { path } = &config.provider;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(StorageError::Io)?;
            }
        }

        let database_url = format!("sqlite:{}", path.display());

        // Create database if it doesn't exist
        if !sqlx::Sqlite::database_exists(&database_url)
            .await
            .map_err(StorageError::Sqlx)?
        {
            debug!("Creating database at: {}", database_url);
            sqlx::Sqlite::create_database(&database_url)
                .await
                .map_err(StorageError::Sqlx)?;
        }

        // Configure connection pool
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.busy_timeout_seconds))
            .connect(&database_url)
            .await
            .map_err(StorageError::Sqlx)?;

        // Configure SQLite settings (after pool creation, before migrations)
        if config.enable_wal {
            sqlx::query("PRAGMA journal_mode = WAL")
                .execute(&pool)
                .await
                .map_err(StorageError::Sqlx)?;
        }

        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .map_err(StorageError::Sqlx)?;

        sqlx::query("PRAGMA synchronous = NORMAL")
            .execute(&pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(Self { pool, config })
    }

    /// The underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert a product under a caller-supplied tracking code. Used by
    /// `create_product` and by data imports; the code must already be
    /// normalized to uppercase.
    pub async fn create_product_with_code(
        &self,
        code: &str,
        input: HarvestInput,
    ) -> StorageResult<Product> {
        let now = Utc::now();

        let entry = StageEntry::farmer(
            input.price,
            input.harvest_date.clone(),
            input.location.clone(),
            input.notes.clone(),
            input.photo.clone(),
        );
        let timeline_json = serde_json::to_string(&vec![entry])?;
        let photos: Vec<String> = input.photo.iter().cloned().collect();
        let photos_json = serde_json::to_string(&photos)?;

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                id, crop, quantity, current_stage, timeline, photos,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(code)
        .bind(&input.crop)
        .bind(input.quantity)
        .bind(Stage::Farmer.as_number() as i64)
        .bind(&timeline_json)
        .bind(&photos_json)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                debug!("Created product '{}' with code {}", input.crop, code);
                self.get_product(code).await?.ok_or(StorageError::NotFound)
            }
            Err(sqlx::Error::Database(db_err)) => {
                // SQLite UNIQUE constraint violation: tracking-code collision
                if let Some(code_str) = db_err.code() {
                    if code_str == "2067" || code_str == "1555" {
                        return Err(StorageError::DuplicateId(code.to_string()));
                    }
                }
                Err(StorageError::Sqlx(sqlx::Error::Database(db_err)))
            }
            Err(e) => Err(StorageError::Sqlx(e)),
        }
    }

    /// Convert a database row to a Product
    fn row_to_product(&self, row: &SqliteRow) -> StorageResult<Product> {
        let timeline_json: String = row.try_get("timeline")?;
        let photos_json: String = row.try_get("photos")?;

        let timeline: Vec<StageEntry> = serde_json::from_str(&timeline_json)?;
        let photos: Vec<String> = serde_json::from_str(&photos_json)?;

        let stage_number: i64 = row.try_get("current_stage")?;
        let current_stage = Stage::from_number(stage_number).ok_or_else(|| {
            StorageError::Database(format!("Invalid stage number: {}", stage_number))
        })?;

        let created_at_str: String = row.try_get("created_at")?;
        let updated_at_str: String = row.try_get("updated_at")?;

        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|_| StorageError::Database("Invalid created_at timestamp".to_string()))?
            .with_timezone(&Utc);

        let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
            .map_err(|_| StorageError::Database("Invalid updated_at timestamp".to_string()))?
            .with_timezone(&Utc);

        Ok(Product {
            id: row.try_get("id")?,
            crop: row.try_get("crop")?,
            quantity: row.try_get("quantity")?,
            current_stage,
            timeline,
            photos,
            created_at,
            updated_at,
        })
    }
}

#[async_trait]
impl ProductStorage for SqliteStorage {
    async fn initialize(&self) -> StorageResult<()> {
        info!("Initializing SQLite storage with migrations");

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(StorageError::Migration)?;

        info!("SQLite storage initialized successfully");
        Ok(())
    }

    async fn create_product(&self, input: HarvestInput) -> StorageResult<Product> {
        let code = generate_tracking_code();
        self.create_product_with_code(&code, input).await
    }

    async fn get_product(&self, id: &str) -> StorageResult<Option<Product>> {
        // The id column carries COLLATE NOCASE, so scanned codes match in
        // any case
        let row = sqlx::query("SELECT * FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        match row {
            Some(row) => Ok(Some(self.row_to_product(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_products(&self) -> StorageResult<Vec<Product>> {
        let rows = sqlx::query("SELECT * FROM products ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let mut products = Vec::new();
        for row in rows {
            products.push(self.row_to_product(&row)?);
        }

        debug!("Retrieved {} products", products.len());
        Ok(products)
    }

    async fn update_product(&self, id: &str, patch: ProductPatch) -> StorageResult<Product> {
        let timeline_json = serde_json::to_string(&patch.timeline)?;
        let photos_json = serde_json::to_string(&patch.photos)?;

        let result = sqlx::query(
            r#"
            UPDATE products
            SET current_stage = ?, timeline = ?, photos = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(patch.current_stage.as_number() as i64)
        .bind(&timeline_json)
        .bind(&photos_json)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        debug!("Updated product with code {}", id);
        self.get_product(id).await?.ok_or(StorageError::NotFound)
    }

    async fn search_products(&self, query: &str) -> StorageResult<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM products
            WHERE crop LIKE ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(format!("%{}%", query))
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        let mut products = Vec::new();
        for row in rows {
            products.push(self.row_to_product(&row)?);
        }

        debug!(
            "Found {} products matching query '{}'",
            products.len(),
            query
        );
        Ok(products)
    }

    async fn search_products_any(&self, query: &str) -> StorageResult<Vec<Product>> {
        // The timeline column carries locations and handler names as JSON
        // text, so a substring match over it covers the legacy wide search
        let rows = sqlx::query(
            r#"
            SELECT * FROM products
            WHERE crop LIKE ? OR id LIKE ? OR timeline LIKE ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(format!("%{}%", query))
        .bind(format!("%{}%", query))
        .bind(format!("%{}%", query))
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        let mut products = Vec::new();
        for row in rows {
            products.push(self.row_to_product(&row)?);
        }

        Ok(products)
    }

    async fn count_products(&self) -> StorageResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(count as u64)
    }
}
