//! Request/response boundary: a JSON body in, the batch output out.
//!
//! Bodies that do not match the request shape are rejected with a client
//! error before any record reaches the engine.

use crate::core::consolidator::{consolidate, estimates_by_id, references_by_id};
use crate::core::valuator::Valuator;
use crate::domain::model::{BatchOutcome, Consolidation, ParcelRecord, ReferenceValue};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchRequest {
    pub records: Vec<ParcelRecord>,
    #[serde(default)]
    pub references: Option<Vec<ReferenceValue>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    #[serde(flatten)]
    pub batch: BatchOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consolidation: Option<Consolidation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceResponse {
    pub status_code: u16,
    pub body: serde_json::Value,
}

impl ServiceResponse {
    fn client_error(message: String) -> Self {
        Self {
            status_code: 400,
            body: serde_json::json!({ "error": message }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

pub fn handle_batch_request(valuator: &Valuator, payload: serde_json::Value) -> ServiceResponse {
    let request: BatchRequest = match serde_json::from_value(payload) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Rejected malformed batch request: {}", e);
            return ServiceResponse::client_error(format!("Malformed request body: {}", e));
        }
    };

    tracing::info!("Valuing batch of {} parcels", request.records.len());
    let batch = valuator.valuate_all(&request.records);
    let consolidation = request.references.as_deref().map(|references| {
        consolidate(
            &request.records,
            &estimates_by_id(&batch.entries),
            &references_by_id(references),
        )
    });

    let response = BatchResponse {
        batch,
        consolidation,
    };
    match serde_json::to_value(&response) {
        Ok(body) => ServiceResponse {
            status_code: 200,
            body,
        },
        Err(e) => {
            tracing::error!("Failed to serialize batch response: {}", e);
            ServiceResponse {
                status_code: 500,
                body: serde_json::json!({ "error": "failed to serialize response" }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valuator() -> Valuator {
        Valuator::from_documents(
            "catalog.json",
            br#"{
                "version": "svc",
                "rural": {"default": {"default": 10000}},
                "urban": {"default": {"default": 0.5}}
            }"#,
            "territories.json",
            b"{}",
        )
        .unwrap()
    }

    #[test]
    fn test_malformed_bodies_are_client_errors() {
        let v = valuator();
        for payload in [
            json!("not an object"),
            json!({}),
            json!({"records": "nope"}),
            json!({"records": [{"class": "Urbano"}]}),
            json!({"records": [], "extra": true}),
        ] {
            let response = handle_batch_request(&v, payload);
            assert_eq!(response.status_code, 400);
            assert!(response.body["error"].as_str().unwrap().starts_with("Malformed"));
        }
    }

    #[test]
    fn test_batch_without_references() {
        let payload = json!({
            "records": [
                {"parcel_id": "R1", "class": "Rústico", "total_area": 5000}
            ]
        });

        let response = handle_batch_request(&valuator(), payload);
        assert!(response.is_success());
        assert_eq!(response.body["summary"]["record_count"], 1);
        assert_eq!(response.body["entries"][0]["status"], "valued");
        assert_eq!(response.body["entries"][0]["estimate"], 5000.0);
        assert!(response.body.get("consolidation").is_none());
    }

    #[test]
    fn test_batch_with_references_is_consolidated() {
        let payload = json!({
            "records": [
                {"parcel_id": "U1", "class": "Urbano", "cadastral_value": 1000.0}
            ],
            "references": [
                {"referencia_catastral": "U1", "valor_referencia": 400.0}
            ]
        });

        let response = handle_batch_request(&valuator(), payload);
        assert_eq!(response.status_code, 200);
        let record = &response.body["consolidation"]["records"][0];
        assert_eq!(record["deviation"]["higher"], "computed_higher");
        assert_eq!(record["deviation"]["diff"], 100.0);
    }
}
