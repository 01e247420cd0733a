//! Route Service Gateway
//!
//! One POST per calculation, no retries. Every failure is folded into a
//! single user-facing message by `RouteClient::calculate`.

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::models::{RecalculationContext, RouteOutcome, RouteResponse};
use crate::weights::WeightVector;

pub const DEFAULT_ROUTE_SERVICE_URL: &str =
    "https://cloudrun-service-fee-316812040520.us-east4.run.app/fecha-estimada-entrega";

/// Request body sent to the route service
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteRequest {
    pub sku: String,
    pub cp: String,
    pub qty: u32,
    pub weights: WeightVector,
    pub recalculo: bool,
    #[serde(rename = "dataRecalculo", skip_serializing_if = "Option::is_none")]
    pub data_recalculo: Option<RecalculationContext>,
}

impl RouteRequest {
    pub fn new(
        sku: &str,
        cp: &str,
        qty: u32,
        weights: WeightVector,
        recalculation: Option<RecalculationContext>,
    ) -> Self {
        Self {
            sku: sku.to_string(),
            cp: cp.to_string(),
            qty,
            weights,
            recalculo: recalculation.is_some(),
            data_recalculo: recalculation,
        }
    }
}

/// Error type for route service calls
#[derive(Debug, thiserror::Error)]
pub enum RouteServiceError {
    #[error("Connection or HTTP error: {0}")]
    Http(String),

    #[error("Could not decode the route service JSON response: {reason}. Response: {body}")]
    Decode { reason: String, body: String },

    #[error("{0}")]
    Application(String),
}

pub struct RouteClient {
    url: String,
    client: reqwest::Client,
}

impl RouteClient {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Call the route service, keeping the failure classification.
    pub async fn request(&self, request: &RouteRequest) -> Result<RouteResponse, RouteServiceError> {
        info!(
            url = %self.url,
            recalculo = request.recalculo,
            "Calling route service with payload {}",
            serde_json::to_string(request).unwrap_or_default()
        );

        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| RouteServiceError::Http(e.to_string()))?
            .error_for_status()
            .map_err(|e| RouteServiceError::Http(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| RouteServiceError::Http(e.to_string()))?;

        parse_response(&body)
    }

    /// Call the route service, folding any failure into an error outcome.
    pub async fn calculate(&self, request: &RouteRequest) -> RouteOutcome {
        match self.request(request).await {
            Ok(response) => {
                info!("Route service returned {} routes", response.rutas.len());
                RouteOutcome::Routes(response)
            }
            Err(e) => {
                warn!("Route service call failed: {}", e);
                RouteOutcome::Error(e.to_string())
            }
        }
    }
}

/// Classify a 2xx response body.
pub fn parse_response(body: &str) -> Result<RouteResponse, RouteServiceError> {
    let value: Value = serde_json::from_str(body).map_err(|e| RouteServiceError::Decode {
        reason: e.to_string(),
        body: body.to_string(),
    })?;

    if let Some(obj) = value.as_object() {
        if let Some(message) = obj.get("error").or_else(|| obj.get("error:")) {
            return Err(RouteServiceError::Application(message_text(message)));
        }
    }

    serde_json::from_value(value).map_err(|e| RouteServiceError::Decode {
        reason: e.to_string(),
        body: body.to_string(),
    })
}

fn message_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_request_body_without_recalculation() {
        let req = RouteRequest::new("1139002876", "52715", 2, WeightVector::LOW_SEASON, None);
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["sku"], json!("1139002876"));
        assert_eq!(body["cp"], json!("52715"));
        assert_eq!(body["qty"], json!(2));
        assert_eq!(body["recalculo"], json!(false));
        assert_eq!(body["weights"]["tiempo"], json!(1.0));
        assert!(body.get("dataRecalculo").is_none());
    }

    #[test]
    fn test_request_body_with_recalculation() {
        let ctx = RecalculationContext {
            original_purchase: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            original_delivery: NaiveDate::from_ymd_opt(2025, 6, 12).unwrap(),
            rejecting_store: 108,
        };
        let req = RouteRequest::new("1", "2", 1, WeightVector::HIGH_SEASON, Some(ctx));
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["recalculo"], json!(true));
        assert_eq!(body["dataRecalculo"]["tiendaRechazo"], json!(108));
        assert_eq!(body["dataRecalculo"]["fechaEntregaOriginal"], json!("2025-06-12"));
    }

    #[test]
    fn test_malformed_json_keeps_raw_text() {
        let err = parse_response("<html>Service Unavailable</html>").unwrap_err();
        assert!(matches!(err, RouteServiceError::Decode { .. }));
        assert!(err.to_string().contains("<html>Service Unavailable</html>"));
    }

    #[test]
    fn test_application_error_keys() {
        let err = parse_response(r#"{"error": "SKU sin inventario"}"#).unwrap_err();
        assert_eq!(err.to_string(), "SKU sin inventario");

        let err = parse_response(r#"{"error:": "CP no valido"}"#).unwrap_err();
        assert_eq!(err.to_string(), "CP no valido");
    }

    #[test]
    fn test_plain_error_key_wins() {
        let err = parse_response(r#"{"error:": "second", "error": "first"}"#).unwrap_err();
        assert!(matches!(err, RouteServiceError::Application(_)));
        assert_eq!(err.to_string(), "first");
    }

    #[test]
    fn test_null_blocks_are_not_decode_errors() {
        let response =
            parse_response(r#"{"rutas": null, "resumen": {"fecha_de_entrega": "2025-06-05"}}"#).unwrap();
        assert!(response.rutas.is_empty());
        assert_eq!(response.resumen["fecha_de_entrega"], json!("2025-06-05"));

        let response = parse_response(r#"{"rutas": [{"id_trazo": null}, {"id_trazo": 5}], "resumen": null}"#).unwrap();
        assert_eq!(response.trace_ids().collect::<Vec<_>>(), vec!["5"]);
        assert!(response.resumen.is_empty());
    }

    #[test]
    fn test_success_body_is_kept() {
        let response = parse_response(
            r#"{"inputs": {"sku": "1"}, "rutas": [{"id_trazo": "t-1", "costo": 3}], "resumen": {"tiempo_maximo_dias": 2}}"#,
        )
        .unwrap();
        assert_eq!(response.rutas.len(), 1);
        assert_eq!(response.resumen["tiempo_maximo_dias"], json!(2));
    }
}
