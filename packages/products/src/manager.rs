use crate::lifecycle::{check_transition, TransitionError};
use crate::storage::sqlite::SqliteStorage;
use crate::storage::{ProductStorage, StorageConfig, StorageError};
use crate::types::{HarvestInput, Product, ProductPatch, Stage, StageEntry, StageUpdateInput};
use crate::validator::{validate_harvest_input, validate_stage_input, ValidationError};
use agritrace_core::normalize_tracking_code;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Manager errors
#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Validation errors: {0:?}")]
    Validation(Vec<ValidationError>),
    #[error("Product not found: {0}")]
    NotFound(String),
    #[error("Illegal stage transition: {0}")]
    Transition(#[from] TransitionError),
}

pub type ManagerResult<T> = Result<T, ManagerError>;

/// Global storage instance
static STORAGE: OnceCell<Arc<dyn ProductStorage>> = OnceCell::const_new();

/// Initialize the global storage with default configuration
pub async fn initialize_storage() -> ManagerResult<()> {
    initialize_storage_with(StorageConfig::default()).await
}

/// Initialize the global storage with a custom configuration
pub async fn initialize_storage_with(config: StorageConfig) -> ManagerResult<()> {
    let storage = SqliteStorage::new(config).await?;
    storage.initialize().await?;

    let storage: Arc<dyn ProductStorage> = Arc::new(storage);
    STORAGE.set(storage).map_err(|_| {
        ManagerError::Storage(StorageError::Database(
            "Storage already initialized".to_string(),
        ))
    })?;
    info!("Product storage initialized successfully");
    Ok(())
}

/// Get the global storage instance
pub async fn get_storage() -> ManagerResult<Arc<dyn ProductStorage>> {
    match STORAGE.get() {
        Some(storage) => Ok(storage.clone()),
        None => {
            warn!("Storage not initialized, initializing now");
            initialize_storage().await?;
            STORAGE
                .get()
                .ok_or_else(|| {
                    ManagerError::Storage(StorageError::Database(
                        "Failed to initialize storage".to_string(),
                    ))
                })
                .cloned()
        }
    }
}

/// Creates a new product at the farmer stage
pub async fn create_product(data: HarvestInput) -> ManagerResult<Product> {
    ProductsManager::new().await?.create_product(data).await
}

/// Advances a product to the given stage
pub async fn advance_stage(
    code: &str,
    to: Stage,
    input: StageUpdateInput,
) -> ManagerResult<Product> {
    ProductsManager::new()
        .await?
        .advance_stage(code, to, input)
        .await
}

/// Marks a retailer-stage product ready for sale
pub async fn mark_ready_for_sale(code: &str) -> ManagerResult<Product> {
    ProductsManager::new().await?.mark_ready_for_sale(code).await
}

/// Gets a product by tracking code
pub async fn get_product(code: &str) -> ManagerResult<Option<Product>> {
    ProductsManager::new().await?.get_product(code).await
}

/// Gets all products, newest first
pub async fn get_all_products() -> ManagerResult<Vec<Product>> {
    ProductsManager::new().await?.get_all_products().await
}

/// Search products by crop name
pub async fn search_products(query: &str) -> ManagerResult<Vec<Product>> {
    ProductsManager::new().await?.search_products(query).await
}

/// Products manager over a storage backend
pub struct ProductsManager {
    storage: Arc<dyn ProductStorage>,
}

impl ProductsManager {
    /// Create a new ProductsManager with the global storage
    pub async fn new() -> ManagerResult<Self> {
        let storage = get_storage().await?;
        Ok(Self { storage })
    }

    /// Create a new ProductsManager with custom storage
    pub fn with_storage(storage: Arc<dyn ProductStorage>) -> Self {
        Self { storage }
    }

    /// Creates a new product. Allocates a tracking code and writes the
    /// record with its initial farmer timeline entry in one store call.
    pub async fn create_product(&self, data: HarvestInput) -> ManagerResult<Product> {
        let validation_errors = validate_harvest_input(&data);
        if !validation_errors.is_empty() {
            return Err(ManagerError::Validation(validation_errors));
        }

        let product = self.storage.create_product(data).await?;

        info!(
            "Created product '{}' with code {}",
            product.crop, product.id
        );
        Ok(product)
    }

    /// Advances a product to `to`, appending one timeline entry and moving
    /// `current_stage` forward. Illegal transitions (skipping a stage,
    /// re-entering a stage, advancing past ready-for-sale) are rejected
    /// before anything is written.
    ///
    /// Advancing to `ReadyForSale` never collects new economics, so that
    /// target routes through [`ProductsManager::mark_ready_for_sale`] and
    /// `input` is ignored.
    pub async fn advance_stage(
        &self,
        code: &str,
        to: Stage,
        input: StageUpdateInput,
    ) -> ManagerResult<Product> {
        if to == Stage::ReadyForSale {
            return self.mark_ready_for_sale(code).await;
        }

        let validation_errors = validate_stage_input(&input);
        if !validation_errors.is_empty() {
            return Err(ManagerError::Validation(validation_errors));
        }

        let code = normalize_tracking_code(code);
        let product = self
            .storage
            .get_product(&code)
            .await?
            .ok_or_else(|| ManagerError::NotFound(code.clone()))?;

        check_transition(product.current_stage, to)?;

        let entry = match to {
            Stage::Middleman => StageEntry::middleman(
                input.price,
                input.date,
                input.location,
                input.notes,
                input.photo,
                input.handler_name,
            ),
            Stage::Retailer => StageEntry::retailer(
                input.price,
                input.date,
                input.location,
                input.notes,
                input.photo,
                input.quality,
                input.expiry_date,
                input.handler_name,
            ),
            // No stage transitions into Farmer, and ReadyForSale was routed
            // above; check_transition has already rejected both.
            Stage::Farmer | Stage::ReadyForSale => {
                return Err(ManagerError::Transition(TransitionError {
                    from: product.current_stage,
                    to,
                }))
            }
        };

        let updated = self.append_entry(&code, product, entry, to).await?;
        info!("Advanced product {} to stage {}", code, to);
        Ok(updated)
    }

    /// The 3→4 transition. Copies the last entry's price and location
    /// forward with a fixed note; no new economic event is recorded.
    pub async fn mark_ready_for_sale(&self, code: &str) -> ManagerResult<Product> {
        let code = normalize_tracking_code(code);
        let product = self
            .storage
            .get_product(&code)
            .await?
            .ok_or_else(|| ManagerError::NotFound(code.clone()))?;

        check_transition(product.current_stage, Stage::ReadyForSale)?;

        let last = product.last_entry().ok_or_else(|| {
            ManagerError::Storage(StorageError::Database(
                "Product has an empty timeline".to_string(),
            ))
        })?;
        let entry = StageEntry::ready_for_sale(last, Utc::now().to_rfc3339());

        let updated = self
            .append_entry(&code, product, entry, Stage::ReadyForSale)
            .await?;
        info!("Marked product {} ready for sale", code);
        Ok(updated)
    }

    /// Gets a product by tracking code. Codes are normalized before
    /// lookup, so scanned or typed input matches in any case.
    pub async fn get_product(&self, code: &str) -> ManagerResult<Option<Product>> {
        let code = normalize_tracking_code(code);
        Ok(self.storage.get_product(&code).await?)
    }

    /// Gets all products, newest first
    pub async fn get_all_products(&self) -> ManagerResult<Vec<Product>> {
        Ok(self.storage.list_products().await?)
    }

    /// Case-insensitive substring search over crop names
    pub async fn search_products(&self, query: &str) -> ManagerResult<Vec<Product>> {
        Ok(self.storage.search_products(query).await?)
    }

    /// Legacy wide search over crop, tracking code, and timeline text
    pub async fn search_products_any(&self, query: &str) -> ManagerResult<Vec<Product>> {
        Ok(self.storage.search_products_any(query).await?)
    }

    /// Number of tracked products
    pub async fn count_products(&self) -> ManagerResult<u64> {
        Ok(self.storage.count_products().await?)
    }

    /// Append one timeline entry and write the whole state back as a
    /// single patch. The photo reference, when present, travels in the
    /// same write as the timeline append.
    async fn append_entry(
        &self,
        code: &str,
        product: Product,
        entry: StageEntry,
        to: Stage,
    ) -> ManagerResult<Product> {
        let mut timeline = product.timeline;
        let mut photos = product.photos;
        if let Some(photo) = &entry.photo {
            photos.push(photo.clone());
        }
        timeline.push(entry);

        let patch = ProductPatch {
            current_stage: to,
            timeline,
            photos,
        };

        Ok(self.storage.update_product(code, patch).await?)
    }
}
