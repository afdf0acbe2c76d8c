//! Catalog endpoints

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{Duration, Utc};
use serde::Serialize;

use crate::AppState;
use crate::data::{EntityId, Item};
use crate::error::AppError;

/// Sample catalog: (name, price, description)
const SAMPLE_ITEMS: [(&str, f64, &str); 6] = [
    (
        "Laptop Pro",
        1299.0,
        "High-performance laptop with 16GB RAM, 512GB SSD, Intel i7",
    ),
    (
        "Wireless Headphones",
        199.0,
        "Noise-cancelling Bluetooth headphones with 30-hour battery life",
    ),
    (
        "Smartphone X",
        999.0,
        "6.7\" AMOLED display, 256GB storage, 48MP camera",
    ),
    (
        "Smartwatch",
        299.0,
        "Fitness tracking, heart rate monitor, 5-day battery life",
    ),
    (
        "Tablet Plus",
        599.0,
        "12.9\" display, 128GB storage, great for creative work",
    ),
    (
        "Wireless Charger",
        49.0,
        "Fast charging pad compatible with all Qi-enabled devices",
    ),
];

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub message: String,
    pub count: usize,
}

/// GET /api/items
/// All items, newest first
pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<Item>>, AppError> {
    let items = state.db.list_items().await?;
    Ok(Json(items))
}

/// POST /api/items/seed
/// Replace the catalog with the sample items
pub async fn seed_items(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SeedResponse>), AppError> {
    let now = Utc::now();
    // Staggered timestamps keep "newest first" deterministic
    let items: Vec<Item> = SAMPLE_ITEMS
        .iter()
        .enumerate()
        .map(|(i, (name, price, description))| Item {
            id: EntityId::new().0,
            name: name.to_string(),
            price: *price,
            description: description.to_string(),
            created_at: now + Duration::milliseconds(i as i64),
        })
        .collect();

    state.db.replace_items(&items).await?;
    tracing::info!(count = items.len(), "Catalog seeded");

    Ok((
        StatusCode::CREATED,
        Json(SeedResponse {
            message: "Sample items seeded successfully".to_string(),
            count: items.len(),
        }),
    ))
}
