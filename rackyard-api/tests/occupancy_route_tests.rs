//! Occupancy grids, filter options, and the live snapshot through the HTTP
//! router.

#[path = "support/app.rs"]
mod support;

use axum::http::StatusCode;
use rackyard_core::{OccupancyFilter, OccupancySnapshot};
use rackyard_storage::WarehouseStore;
use serde_json::{json, Value};
use support::test_app;

fn cell<'a>(grid: &'a Value, floor: i64, position: i64, column: usize) -> &'a Value {
    grid["rows"]
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["floor"] == floor && row["position"] == position)
        .map(|row| &row["cells"][column])
        .unwrap()
}

#[tokio::test]
async fn test_occupancy_grids_and_utilization() {
    let app = test_app();

    let (status, body) = app.get("/api/v1/occupancy").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["occupied"], 3);
    assert_eq!(body["total"], 10);
    assert_eq!(body["utilization"], "30.00%");

    let racks = body["racks"].as_array().unwrap();
    assert_eq!(racks.len(), 2);

    let cold = &racks[0];
    assert_eq!(cold["warehouse_type"], "COLD");
    assert_eq!(cold["rack"], 1);
    assert_eq!(cold["letters"], json!(["A", "B"]));
    assert_eq!(cold["utilization"], "25.00%");
    // Highest floor and deepest position come first.
    assert_eq!(cold["rows"][0]["floor"], 2);
    assert_eq!(cold["rows"][0]["position"], 2);

    assert_eq!(cell(cold, 1, 1, 0)["label"], "10000001");
    assert_eq!(cell(cold, 1, 1, 0)["class"], "unmatched");
    assert_eq!(cell(cold, 1, 1, 1)["label"], "Free");
    assert_eq!(cell(cold, 1, 1, 1)["class"], "free");
    // COLD-2-1 has no lane B.
    assert!(cell(cold, 2, 1, 1).is_null());

    let dry = &racks[1];
    assert_eq!(dry["warehouse_type"], "DRY");
    assert_eq!(dry["utilization"], "50.00%");
}

#[tokio::test]
async fn test_occupancy_filter_marks_matches() {
    let app = test_app();

    let (status, body) = app.get("/api/v1/occupancy?varieties=Fuji").await;
    assert_eq!(status, StatusCode::OK);

    let racks = body["racks"].as_array().unwrap();
    let cold = &racks[0];
    let dry = &racks[1];
    assert_eq!(cell(cold, 1, 1, 0)["class"], "matched");
    assert_eq!(cell(cold, 1, 2, 0)["class"], "unmatched");
    assert_eq!(cell(dry, 1, 1, 0)["class"], "matched");

    // Axes combine with OR.
    let (_, body) = app
        .get("/api/v1/occupancy?varieties=Fuji&markets=US")
        .await;
    assert_eq!(cell(&body["racks"][0], 1, 2, 0)["class"], "matched");
}

#[tokio::test]
async fn test_filter_options_list_occupied_values() {
    let app = test_app();

    let (status, body) = app.get("/api/v1/occupancy/filters").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["codes"], json!(["10000001", "10000002", "10000003"]));
    assert_eq!(body["varieties"], json!(["Fuji", "Gala"]));
    assert_eq!(body["markets"], json!(["ASIA", "EU", "US"]));
    assert_eq!(
        body["harvest_dates"],
        json!(["20240115", "20240116", "20240117"])
    );
}

#[tokio::test]
async fn test_occupancy_reflects_assignment() {
    let app = test_app();

    app.post(
        "/api/v1/slots/assign",
        json!({
            "pallet_code": "10000004",
            "warehouse_type": "COLD",
            "floor": 1,
            "rack": 1,
            "letter": "B",
        }),
    )
    .await;

    let (_, body) = app.get("/api/v1/occupancy").await;
    assert_eq!(body["occupied"], 4);
    assert_eq!(body["utilization"], "40.00%");
}

#[tokio::test]
async fn test_live_snapshot_unavailable_until_published() {
    let app = test_app();

    let (status, body) = app.get("/api/v1/occupancy/live").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "SNAPSHOT_UNAVAILABLE");

    let records = app.store.slot_list_all().await.unwrap();
    app.live.publish(OccupancySnapshot::build(
        &records,
        &OccupancyFilter::default(),
        chrono::Utc::now(),
    ));

    let (status, body) = app.get("/api/v1/occupancy/live").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["utilization"], "30.00%");
}

#[tokio::test]
async fn test_occupancy_requires_token() {
    let app = test_app();

    let (status, _) = app
        .send(support::get("/api/v1/occupancy/live", None))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
