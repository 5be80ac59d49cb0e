//! Shared fixtures for row-store integration tests.

#![allow(dead_code)]

use serde_json::json;
use tba_db::MemoryStore;
use uuid::Uuid;

/// A catalog store with a few categories and brands and no markers.
pub fn seeded_store() -> MemoryStore {
    MemoryStore::catalog()
        .with_rows(
            "categories",
            vec![
                json!({"id": 1, "name": "Pizza", "icon_url": "icons/pizza.svg", "is_active": true, "for_places": true, "for_products": false}),
                json!({"id": 2, "name": "Croissant", "icon_url": null, "is_active": true, "for_places": true, "for_products": true}),
                json!({"id": 3, "name": "Chocolate", "icon_url": "", "is_active": true, "for_places": false, "for_products": true}),
                json!({"id": 4, "name": "Retired", "icon_url": null, "is_active": false, "for_places": true, "for_products": true}),
            ],
        )
        .with_rows(
            "brands",
            vec![
                json!({"id": 10, "name": "Lindt", "is_active": true}),
                json!({"id": 11, "name": "Milka", "is_active": true}),
                json!({"id": 12, "name": "Gone", "is_active": false}),
            ],
        )
}

/// A marker row with a server-maintained aggregate already filled in.
pub fn marker_row(
    title: &str,
    group_type: &str,
    category_id: i64,
    avg: Option<f64>,
    count: i64,
) -> serde_json::Value {
    json!({
        "id": Uuid::new_v4(),
        "title": title,
        "group_type": group_type,
        "category_id": category_id,
        "brand_id": null,
        "rating_avg": avg,
        "rating_count": count,
        "lat": if group_type == "place" { json!(41.39) } else { json!(null) },
        "lon": if group_type == "place" { json!(2.16) } else { json!(null) },
        "is_active": true,
        "created_at": "2025-01-01T00:00:00+00:00",
    })
}
