use parcel_valuation::core::service::handle_batch_request;
use parcel_valuation::Valuator;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

fn shipped_valuator() -> Valuator {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let catalog = std::fs::read(root.join("config/catalog.toml")).unwrap();
    let territories = std::fs::read(root.join("config/territories.toml")).unwrap();
    Valuator::from_documents("catalog.toml", &catalog, "territories.toml", &territories).unwrap()
}

#[test]
fn test_registry_shaped_records_are_valued() {
    let payload = json!({
        "records": [
            {
                "referencia_catastral": "46181A01200045",
                "clase": "Rústico",
                "provincia": "VALENCIA",
                "municipio": "OLIVA",
                "cultivos": [
                    {"cultivo_aprovechamiento": "O- Olivos secano", "superficie_m2": "10.000"}
                ]
            },
            {
                "referencia_catastral": "4618105YJ4141N0001XK",
                "clase": "Urbano",
                "uso_principal": "Garaje",
                "provincia": "Valencia",
                "municipio": "Gandia",
                "valor_catastral": 12000.0
            }
        ]
    });

    let response = handle_batch_request(&shipped_valuator(), payload);
    assert_eq!(response.status_code, 200);

    let entries = response.body["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["estimate"], 12200.0);
    assert_eq!(entries[0]["breakdown"][0]["category"], "olive_dry");
    assert_eq!(entries[0]["resolution_tier"], "municipality");

    assert_eq!(entries[1]["territory"], "valencia");
    assert_eq!(entries[1]["resolution_tier"], "province_group");
    assert_eq!(entries[1]["coefficient_key"], "garaje");
    assert_eq!(entries[1]["estimate"], 4800.0);
    assert_eq!(response.body["summary"]["catalog_version"], "gva-2025");
}

#[test]
fn test_per_record_failures_do_not_fail_the_request() {
    let payload = json!({
        "records": [
            {"parcel_id": "ok", "class": "Urbano", "cadastral_value": 1000.0},
            {"parcel_id": "bad", "class": "Urbano", "cadastral_value": -1.0}
        ]
    });

    let response = handle_batch_request(&shipped_valuator(), payload);
    assert_eq!(response.status_code, 200);
    assert_eq!(response.body["entries"][1]["status"], "failed");
    assert_eq!(response.body["entries"][1]["parcel_id"], "bad");
    assert_eq!(response.body["summary"]["failed_count"], 1);
}

#[test]
fn test_cultivation_without_area_keeps_every_slot() {
    let payload = json!({
        "records": [
            {"referencia_catastral": "GOOD", "clase": "Urbano", "valor_catastral": 1000.0},
            {
                "referencia_catastral": "SPARSE",
                "clase": "Rústico",
                "municipio": "Oliva",
                "cultivos": [{"cultivo_aprovechamiento": "O- Olivos secano"}]
            }
        ]
    });

    let response = handle_batch_request(&shipped_valuator(), payload);
    assert_eq!(response.status_code, 200);

    let entries = response.body["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["parcel_id"], "GOOD");
    assert_eq!(entries[0]["estimate"], 500.0);
    assert_eq!(entries[1]["parcel_id"], "SPARSE");
    assert_eq!(entries[1]["estimate"], 0.0);
    let caveats = entries[1]["caveats"].as_array().unwrap();
    assert!(caveats
        .iter()
        .any(|c| c.as_str().unwrap().starts_with("Missing sub-parcel 1")));
    assert_eq!(response.body["summary"]["failed_count"], 0);
}

#[test]
fn test_malformed_body_never_reaches_the_engine() {
    let response = handle_batch_request(
        &shipped_valuator(),
        json!({"records": [{"parcel_id": "x", "sub_parcels": [{"use_text": "olivar"}]}]}),
    );
    assert_eq!(response.status_code, 400);
    assert!(response.body.get("entries").is_none());
}

#[tokio::test]
async fn test_shared_valuator_serves_concurrent_requests() {
    let valuator = Arc::new(shipped_valuator());
    let mut handles = Vec::new();
    for i in 0..8 {
        let valuator = Arc::clone(&valuator);
        handles.push(tokio::spawn(async move {
            let payload = json!({
                "records": [{"parcel_id": format!("P{}", i), "class": "Urbano", "cadastral_value": 2000.0}],
                "references": [{"parcel_id": format!("P{}", i), "value": 1000.0}]
            });
            handle_batch_request(&valuator, payload)
        }));
    }

    for handle in handles {
        let response = handle.await.unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.body["consolidation"]["summary"]["deviation_stats"]["mean_pct"],
            0.0
        );
    }
}
