//! # AgriTrace Products
//!
//! Produce record lifecycle for AgriTrace: creation of tracked records,
//! ordered stage advancement with an append-only timeline, persistent
//! storage behind a repository trait, and derived pricing views.

pub mod lifecycle;
pub mod manager;
pub mod pricing;
pub mod storage;
pub mod types;
pub mod validator;

// Re-export main types
pub use types::{
    HarvestInput, Product, ProductPatch, Stage, StageEntry, StageUpdateInput, READY_FOR_SALE_NOTE,
};

// Re-export manager functions
pub use manager::{
    advance_stage, create_product, get_all_products, get_product, get_storage,
    initialize_storage, initialize_storage_with, mark_ready_for_sale, search_products,
    ManagerError, ManagerResult, ProductsManager,
};

// Re-export lifecycle policy
pub use lifecycle::{check_transition, TransitionError};

// Re-export storage types and traits
pub use storage::{
    sqlite::SqliteStorage, ProductStorage, StorageConfig, StorageError, StorageProvider,
    StorageResult,
};

// Re-export derived views
pub use pricing::{
    chart_points, pending_stages, percent_change, price_summary, stage_label, PricePoint,
    PriceSummary, PriceTrend,
};

// Re-export validation
pub use validator::{validate_harvest_input, validate_stage_input, ValidationError};

// Re-export tracking-code helpers from core
pub use agritrace_core::{generate_tracking_code, normalize_tracking_code};
