// ABOUTME: Integration tests for the produce record lifecycle
// ABOUTME: Drives create -> advance -> mark-ready against SQLite storage

use std::path::PathBuf;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use agritrace_products::{
    pending_stages, price_summary, HarvestInput, ManagerError, PriceTrend, ProductStorage,
    ProductsManager, SqliteStorage, Stage, StageUpdateInput, StorageConfig, StorageError,
    StorageProvider, READY_FOR_SALE_NOTE,
};

/// Helper to create a manager over an in-memory database
async fn create_test_manager() -> (ProductsManager, Arc<SqliteStorage>) {
    let config = StorageConfig {
        provider: StorageProvider::Sqlite {
            path: PathBuf::from(":memory:"),
        },
        enable_wal: false,
        max_connections: 1,
        busy_timeout_seconds: 10,
    };

    let storage = Arc::new(SqliteStorage::new(config).await.unwrap());
    storage.initialize().await.unwrap();

    (ProductsManager::with_storage(storage.clone()), storage)
}

fn basmati_harvest() -> HarvestInput {
    HarvestInput {
        crop: "Basmati Rice".to_string(),
        quantity: 1000.0,
        price: 80.0,
        location: "Haryana".to_string(),
        harvest_date: "2024-12-10".to_string(),
        notes: None,
        photo: None,
    }
}

fn middleman_handoff() -> StageUpdateInput {
    StageUpdateInput {
        price: 95.0,
        date: "2024-12-12".to_string(),
        location: "NH-44".to_string(),
        ..Default::default()
    }
}

fn retailer_stocking() -> StageUpdateInput {
    StageUpdateInput {
        price: 110.0,
        date: "2024-12-14".to_string(),
        location: "Fresh Mart, Delhi".to_string(),
        quality: Some("Grade A".to_string()),
        expiry_date: Some("2025-01-14".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_end_to_end_harvest_to_middleman() {
    let (manager, _) = create_test_manager().await;

    let product = manager.create_product(basmati_harvest()).await.unwrap();
    assert_eq!(product.current_stage, Stage::Farmer);
    assert_eq!(product.timeline.len(), 1);
    assert_eq!(product.timeline[0].stage, Stage::Farmer);
    assert_eq!(product.timeline[0].price, 80.0);
    assert_eq!(product.timeline[0].location, "Haryana");
    assert_eq!(product.timeline[0].date, "2024-12-10");

    let updated = manager
        .advance_stage(&product.id, Stage::Middleman, middleman_handoff())
        .await
        .unwrap();

    assert_eq!(updated.current_stage, Stage::Middleman);
    assert_eq!(updated.timeline.len(), 2);
    // First entry is unchanged by the append
    assert_eq!(updated.timeline[0], product.timeline[0]);
    assert_eq!(updated.timeline[0].price, 80.0);
    assert_eq!(updated.timeline[1].price, 95.0);
    assert_eq!(updated.timeline[1].location, "NH-44");
}

#[tokio::test]
async fn test_full_lifecycle_to_ready_for_sale() {
    let (manager, _) = create_test_manager().await;

    let product = manager.create_product(basmati_harvest()).await.unwrap();
    manager
        .advance_stage(&product.id, Stage::Middleman, middleman_handoff())
        .await
        .unwrap();
    manager
        .advance_stage(&product.id, Stage::Retailer, retailer_stocking())
        .await
        .unwrap();
    let ready = manager.mark_ready_for_sale(&product.id).await.unwrap();

    assert_eq!(ready.current_stage, Stage::ReadyForSale);
    assert_eq!(ready.timeline.len(), 4);

    // Current stage always equals the last timeline entry's stage
    assert_eq!(ready.current_stage, ready.last_entry().unwrap().stage);

    // The terminal marker copies the retailer's economics forward
    let last = ready.last_entry().unwrap();
    assert_eq!(last.price, 110.0);
    assert_eq!(last.location, "Fresh Mart, Delhi");
    assert_eq!(last.notes.as_deref(), Some(READY_FOR_SALE_NOTE));

    // Nothing is pending once the lifecycle completes
    assert!(pending_stages(&ready.timeline).is_empty());
}

#[tokio::test]
async fn test_current_stage_tracks_last_entry_at_every_step() {
    let (manager, _) = create_test_manager().await;

    let product = manager.create_product(basmati_harvest()).await.unwrap();
    assert_eq!(product.current_stage, product.last_entry().unwrap().stage);

    let product = manager
        .advance_stage(&product.id, Stage::Middleman, middleman_handoff())
        .await
        .unwrap();
    assert_eq!(product.current_stage, product.last_entry().unwrap().stage);

    let product = manager
        .advance_stage(&product.id, Stage::Retailer, retailer_stocking())
        .await
        .unwrap();
    assert_eq!(product.current_stage, product.last_entry().unwrap().stage);
}

#[tokio::test]
async fn test_stage_order_is_enforced() {
    let (manager, _) = create_test_manager().await;
    let product = manager.create_product(basmati_harvest()).await.unwrap();

    // Farmer stage cannot jump to retailer
    let skip = manager
        .advance_stage(&product.id, Stage::Retailer, retailer_stocking())
        .await;
    assert!(matches!(skip, Err(ManagerError::Transition(_))));

    // Farmer stage cannot mark ready
    let early_ready = manager.mark_ready_for_sale(&product.id).await;
    assert!(matches!(early_ready, Err(ManagerError::Transition(_))));

    manager
        .advance_stage(&product.id, Stage::Middleman, middleman_handoff())
        .await
        .unwrap();
    manager
        .advance_stage(&product.id, Stage::Retailer, retailer_stocking())
        .await
        .unwrap();

    // Retailer stage cannot be stocked twice
    let again = manager
        .advance_stage(&product.id, Stage::Retailer, retailer_stocking())
        .await;
    assert!(matches!(again, Err(ManagerError::Transition(_))));

    manager.mark_ready_for_sale(&product.id).await.unwrap();

    // Terminal records accept no further appends
    let past_terminal = manager
        .advance_stage(&product.id, Stage::Middleman, middleman_handoff())
        .await;
    assert!(matches!(past_terminal, Err(ManagerError::Transition(_))));
}

#[tokio::test]
async fn test_lookup_is_case_insensitive() {
    let (manager, _) = create_test_manager().await;
    let product = manager.create_product(basmati_harvest()).await.unwrap();

    let found = manager
        .get_product(&product.id.to_lowercase())
        .await
        .unwrap();
    assert_eq!(found.map(|p| p.id), Some(product.id));
}

#[tokio::test]
async fn test_search_matches_substring_case_insensitive() {
    let (manager, _) = create_test_manager().await;

    let mut tomatoes = basmati_harvest();
    tomatoes.crop = "Organic Tomatoes".to_string();
    manager.create_product(tomatoes).await.unwrap();
    manager.create_product(basmati_harvest()).await.unwrap();

    let results = manager.search_products("tomato").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].crop, "Organic Tomatoes");
}

#[tokio::test]
async fn test_wide_search_matches_location_and_code() {
    let (manager, _) = create_test_manager().await;
    let product = manager.create_product(basmati_harvest()).await.unwrap();
    manager
        .advance_stage(&product.id, Stage::Middleman, middleman_handoff())
        .await
        .unwrap();

    // Matches the middleman location recorded on the timeline
    let by_location = manager.search_products_any("NH-44").await.unwrap();
    assert_eq!(by_location.len(), 1);

    // Matches the tracking code itself
    let suffix = product.id.split('-').next_back().unwrap().to_string();
    let by_code = manager.search_products_any(&suffix).await.unwrap();
    assert!(by_code.iter().any(|p| p.id == product.id));
}

#[tokio::test]
async fn test_photos_follow_timeline_appends() {
    let (manager, _) = create_test_manager().await;

    let mut harvest = basmati_harvest();
    harvest.photo = Some("https://example.com/field.jpg".to_string());
    let product = manager.create_product(harvest).await.unwrap();
    assert_eq!(product.photos.len(), 1);

    // Middleman adds no photo; the photos list is unchanged
    let product = manager
        .advance_stage(&product.id, Stage::Middleman, middleman_handoff())
        .await
        .unwrap();
    assert_eq!(product.photos.len(), 1);

    let mut stocking = retailer_stocking();
    stocking.photo = Some("https://example.com/shelf.jpg".to_string());
    let product = manager
        .advance_stage(&product.id, Stage::Retailer, stocking)
        .await
        .unwrap();
    assert_eq!(
        product.photos,
        vec![
            "https://example.com/field.jpg".to_string(),
            "https://example.com/shelf.jpg".to_string()
        ]
    );
}

#[tokio::test]
async fn test_price_summary_over_stored_record() {
    let (manager, _) = create_test_manager().await;

    let mut harvest = basmati_harvest();
    harvest.price = 25.0;
    let product = manager.create_product(harvest).await.unwrap();
    let product = manager
        .advance_stage(
            &product.id,
            Stage::Middleman,
            StageUpdateInput {
                price: 45.0,
                date: "2024-12-12".to_string(),
                location: "NH-44".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let summary = price_summary(&product).unwrap();
    assert_eq!(summary.farm_price, 25.0);
    assert_eq!(summary.final_price, 45.0);
    assert_eq!(summary.percent_change, 80.0);
    assert_eq!(summary.trend, PriceTrend::Increase);
}

#[tokio::test]
async fn test_pending_stages_after_creation() {
    let (manager, _) = create_test_manager().await;
    let product = manager.create_product(basmati_harvest()).await.unwrap();

    assert_eq!(
        pending_stages(&product.timeline),
        vec![Stage::Middleman, Stage::Retailer, Stage::ReadyForSale]
    );
}

#[tokio::test]
async fn test_tracking_code_collision_surfaces_as_error() {
    let (_, storage) = create_test_manager().await;

    storage
        .create_product_with_code("AGR-COLLIDE-0001", basmati_harvest())
        .await
        .unwrap();

    let result = storage
        .create_product_with_code("AGR-COLLIDE-0001", basmati_harvest())
        .await;
    assert!(matches!(result, Err(StorageError::DuplicateId(_))));
}

#[tokio::test]
async fn test_list_products_returns_everything() {
    let (manager, _) = create_test_manager().await;

    manager.create_product(basmati_harvest()).await.unwrap();
    let mut tomatoes = basmati_harvest();
    tomatoes.crop = "Organic Tomatoes".to_string();
    manager.create_product(tomatoes).await.unwrap();

    let all = manager.get_all_products().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(manager.count_products().await.unwrap(), 2);
}
