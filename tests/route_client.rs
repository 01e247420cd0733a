mod common;

use axum::http::StatusCode;
use chrono::NaiveDate;
use common::MockRouteService;
use route_dashboard::models::{RecalculationContext, RouteOutcome};
use route_dashboard::route_client::{RouteClient, RouteRequest, RouteServiceError};
use route_dashboard::weights::{Preset, WeightVector};
use serde_json::json;

fn request() -> RouteRequest {
    RouteRequest::new("1139002876", "52715", 2, WeightVector::LOW_SEASON, None)
}

#[tokio::test]
async fn test_successful_response_is_returned_unchanged() {
    let body = json!({
        "inputs": {"sku": "1139002876", "cp": "52715"},
        "rutas": [{"id_trazo": "t-9", "costo_total": 120.5, "nodo": "CEDIS"}],
        "resumen": {"fecha_de_entrega": "2025-06-05", "costo": 120.5},
        "version": "2.1"
    });
    let mock = MockRouteService::new(StatusCode::OK, &body.to_string());
    let client = RouteClient::new(&mock.spawn().await);

    let outcome = client.calculate(&request()).await;
    let RouteOutcome::Routes(response) = outcome else {
        panic!("expected routes, got {:?}", outcome);
    };
    assert_eq!(serde_json::to_value(&response).unwrap(), body);
    assert_eq!(mock.hits(), 1);

    let sent = mock.last_request().unwrap();
    assert_eq!(sent["sku"], json!("1139002876"));
    assert_eq!(sent["recalculo"], json!(false));
    assert_eq!(sent["weights"]["costo"], json!(2.0));
    assert!(sent.get("dataRecalculo").is_none());
}

#[tokio::test]
async fn test_recalculation_block_is_sent() {
    let mock = MockRouteService::new(StatusCode::OK, r#"{"rutas": [], "resumen": {}}"#);
    let client = RouteClient::new(&mock.spawn().await);

    let ctx = RecalculationContext {
        original_purchase: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
        original_delivery: NaiveDate::from_ymd_opt(2025, 6, 12).unwrap(),
        rejecting_store: 108,
    };
    let req = RouteRequest::new("1139002876", "52715", 1, Preset::HighSeason.weights(true), Some(ctx));
    client.request(&req).await.unwrap();

    let sent = mock.last_request().unwrap();
    assert_eq!(sent["recalculo"], json!(true));
    assert_eq!(sent["weights"]["diferencia"], json!(4.0));
    assert_eq!(
        sent["dataRecalculo"],
        json!({
            "fechaCompraOriginal": "2025-06-02",
            "fechaEntregaOriginal": "2025-06-12",
            "tiendaRechazo": 108
        })
    );
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error_with_raw_text() {
    let mock = MockRouteService::new(StatusCode::OK, "upstream timeout, try later");
    let client = RouteClient::new(&mock.spawn().await);

    let err = client.request(&request()).await.unwrap_err();
    assert!(matches!(err, RouteServiceError::Decode { .. }));

    match client.calculate(&request()).await {
        RouteOutcome::Error(message) => assert!(message.contains("upstream timeout, try later")),
        other => panic!("expected error outcome, got {:?}", other),
    }
    assert_eq!(mock.hits(), 2);
}

#[tokio::test]
async fn test_non_success_status_is_an_http_error() {
    let mock = MockRouteService::new(StatusCode::INTERNAL_SERVER_ERROR, r#"{"rutas": []}"#);
    let client = RouteClient::new(&mock.spawn().await);

    let err = client.request(&request()).await.unwrap_err();
    assert!(matches!(err, RouteServiceError::Http(_)));
    assert!(err.to_string().starts_with("Connection or HTTP error"));
    // no retries
    assert_eq!(mock.hits(), 1);
}

#[tokio::test]
async fn test_application_error_message_is_extracted() {
    let mock = MockRouteService::new(StatusCode::OK, r#"{"error:": "No hay rutas disponibles"}"#);
    let client = RouteClient::new(&mock.spawn().await);

    assert_eq!(
        client.calculate(&request()).await,
        RouteOutcome::Error("No hay rutas disponibles".to_string())
    );
}

#[tokio::test]
async fn test_unreachable_service_is_an_http_error() {
    // Bind then drop a listener to get a port nothing is serving on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = RouteClient::new(&format!("http://{}/fecha-estimada-entrega", addr));
    let err = client.request(&request()).await.unwrap_err();
    assert!(matches!(err, RouteServiceError::Http(_)));
}
