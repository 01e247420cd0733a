#![allow(dead_code)]

use async_trait::async_trait;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use chrono::NaiveDate;
use route_dashboard::{
    config::{DashboardConfig, FormDefaults},
    db::TableRef,
    models::{DeliveryMethod, QueryParams, WarehouseRow},
    warehouse::{Warehouse, WarehouseError, WarehouseResult},
};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ROUTE_PATH: &str = "/fecha-estimada-entrega";

/// Stand-in for the route service: records every request body and answers
/// with a fixed status and body.
#[derive(Clone)]
pub struct MockRouteService {
    pub status: StatusCode,
    pub body: String,
    pub hits: Arc<AtomicUsize>,
    pub requests: Arc<Mutex<Vec<Value>>>,
}

impl MockRouteService {
    pub fn new(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            hits: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<Value> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Serve on an ephemeral local port, returning the endpoint URL.
    pub async fn spawn(&self) -> String {
        async fn handle(State(mock): State<MockRouteService>, Json(body): Json<Value>) -> (StatusCode, String) {
            mock.hits.fetch_add(1, Ordering::SeqCst);
            mock.requests.lock().unwrap().push(body);
            (mock.status, mock.body.clone())
        }

        let app = Router::new()
            .route(ROUTE_PATH, post(handle))
            .with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}{}", addr, ROUTE_PATH)
    }
}

/// Warehouse answering every lookup with the same rows
pub struct FixedWarehouse {
    pub rows: Vec<WarehouseRow>,
    pub lookups: Mutex<Vec<QueryParams>>,
}

impl FixedWarehouse {
    pub fn new(rows: Vec<WarehouseRow>) -> Self {
        Self {
            rows,
            lookups: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Warehouse for FixedWarehouse {
    async fn find_routes(&self, params: QueryParams) -> WarehouseResult<Vec<WarehouseRow>> {
        self.lookups.lock().unwrap().push(params);
        Ok(self.rows.clone())
    }
}

pub struct UnreachableWarehouse;

#[async_trait]
impl Warehouse for UnreachableWarehouse {
    async fn find_routes(&self, _params: QueryParams) -> WarehouseResult<Vec<WarehouseRow>> {
        Err(WarehouseError::Connection("lock held by another process".to_string()))
    }
}

pub fn row(trace: &str, store: i64, inventory: i64, method: &str) -> WarehouseRow {
    WarehouseRow {
        id_trazo: trace.to_string(),
        sku_cve: 1139002876,
        cp: 52715,
        tda_cve: store,
        inventario_oh: inventory,
        met_entrega: DeliveryMethod::from(method),
        zona_roja: false,
        excl_prod: 0,
    }
}

pub fn config(route_url: &str) -> DashboardConfig {
    DashboardConfig {
        table: TableRef::new("fee", "test", "route_candidates").unwrap(),
        db_path: String::new(),
        route_url: route_url.to_string(),
        purchase_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
        session_idle: Duration::from_secs(30 * 60),
        defaults: FormDefaults::default(),
    }
}
