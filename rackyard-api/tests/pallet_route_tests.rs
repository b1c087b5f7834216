//! QR pallet ingestion through the HTTP router.

#[path = "support/app.rs"]
mod support;

use axum::http::StatusCode;
use rackyard_storage::WarehouseStore;
use rackyard_test_utils::PalletCode;
use serde_json::json;
use support::test_app;

#[tokio::test]
async fn test_ingest_registers_pallet() {
    let app = test_app();

    let (status, body) = app
        .post(
            "/api/v1/pallets/ingest",
            json!({ "payload": "Honeycrisp,Bin 40kg,EU,20240301,20000001\r\n" }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["severity"], "success");
    assert_eq!(body["message"], "Pallet 20000001 registered");
    assert_eq!(body["pallet"]["code"], "20000001");
    assert_eq!(body["pallet"]["variety"], "Honeycrisp");
    assert_eq!(body["pallet"]["harvest_date"], "20240301");
    assert_eq!(app.store.pallet_count().unwrap(), 5);

    let stored = app
        .store
        .pallet_find_by_code(&PalletCode::from_stored("20000001"))
        .await
        .unwrap();
    assert!(stored.is_some());
}

#[tokio::test]
async fn test_ingest_duplicate_code() {
    let app = test_app();

    let (status, body) = app
        .post(
            "/api/v1/pallets/ingest",
            json!({ "payload": "Fuji,Bin,EU,20240115,10000001" }),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["severity"], "danger");
    assert_eq!(body["code"], "DUPLICATE_PALLET_CODE");
    assert_eq!(app.store.pallet_count().unwrap(), 4);
}

#[tokio::test]
async fn test_ingest_rejects_bad_fields() {
    let app = test_app();

    for payload in [
        "Fuji,Bin,EU,2024011,20000001",
        "Fuji,Bin,EU,20240115,2000000",
        "Fuji,Bin,EU,20240115,200000011",
    ] {
        let (status, body) = app
            .post("/api/v1/pallets/ingest", json!({ "payload": payload }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload}");
        assert_eq!(body["code"], "INVALID_FORMAT", "payload {payload}");
    }

    assert_eq!(app.store.pallet_count().unwrap(), 4);
}

#[tokio::test]
async fn test_ingest_rejects_wrong_field_count() {
    let app = test_app();

    let (status, body) = app
        .post(
            "/api/v1/pallets/ingest",
            json!({ "payload": "Fuji,EU,20240115,20000001" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");

    let (status, body) = app
        .post("/api/v1/pallets/ingest", json!({ "payload": "  " }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_FIELD");

    assert_eq!(app.store.pallet_count().unwrap(), 4);
}

#[tokio::test]
async fn test_ingested_pallet_can_be_assigned() {
    let app = test_app();

    app.post(
        "/api/v1/pallets/ingest",
        json!({ "payload": "Honeycrisp,Bin,EU,20240301,20000001" }),
    )
    .await;

    let (status, body) = app
        .post(
            "/api/v1/slots/assign",
            json!({
                "pallet_code": "20000001",
                "warehouse_type": "COLD",
                "floor": 2,
                "rack": 1,
                "letter": "A",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Pallet 20000001 assigned to slot COLD-2-1-A-1"
    );
}

#[tokio::test]
async fn test_ingest_keeps_code_exactly_as_scanned() {
    let app = test_app();

    let (status, body) = app
        .post(
            "/api/v1/pallets/ingest",
            json!({ "payload": "Fuji,Bin,EU,20240115,2000001 \r\n" }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["pallet"]["code"], "2000001 ");
    assert!(app
        .store
        .pallet_find_by_code(&PalletCode::from_stored("2000001 "))
        .await
        .unwrap()
        .is_some());
}
