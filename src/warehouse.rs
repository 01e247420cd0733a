//! Warehouse Query Gateway
//!
//! Looks up route candidates with stock for a SKU and postal code. The
//! exclusion rules live in the query so the store only returns eligible rows.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::db::{self, DbConn, TableRef};
use crate::models::{DeliveryMethod, QueryParams, WarehouseRow};

/// Error type for warehouse lookups
#[derive(Debug, thiserror::Error)]
pub enum WarehouseError {
    #[error("Warehouse connection error: {0}")]
    Connection(String),

    #[error("Warehouse query error: {0}")]
    Query(String),
}

pub type WarehouseResult<T> = Result<T, WarehouseError>;

/// Source of warehouse rows
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Rows for `params` passing the delivery and inventory filters.
    async fn find_routes(&self, params: QueryParams) -> WarehouseResult<Vec<WarehouseRow>>;
}

pub const ROUTE_QUERY: &str = r#"
    SELECT id_trazo, sku_cve, cp, tda_cve, inventario_oh, met_entrega, zona_roja, excl_prod
    FROM type::table($tb)
    WHERE sku_cve = $sku
      AND cp = $cp
      AND (met_entrega != $company_fleet OR zona_roja = false)
      AND (met_entrega != $external_courier OR excl_prod = 0)
      AND inventario_oh > 0
    ORDER BY tda_cve, id_trazo
"#;

/// Warehouse backed by the embedded SurrealDB store
pub struct SurrealWarehouse {
    db_path: String,
    table: TableRef,
    conn: Arc<RwLock<Option<DbConn>>>,
}

impl SurrealWarehouse {
    pub fn new(db_path: &str, table: TableRef) -> Self {
        Self {
            db_path: db_path.to_string(),
            table,
            conn: Arc::new(RwLock::new(None)),
        }
    }

    /// Wrap an already-open connection
    pub fn with_connection(conn: DbConn, table: TableRef) -> Self {
        Self {
            db_path: String::new(),
            table,
            conn: Arc::new(RwLock::new(Some(conn))),
        }
    }

    async fn connection(&self) -> WarehouseResult<DbConn> {
        {
            let conn = self.conn.read().await;
            if let Some(db) = conn.as_ref() {
                return Ok(db.clone());
            }
        }

        let mut conn = self.conn.write().await;
        if let Some(db) = conn.as_ref() {
            return Ok(db.clone());
        }
        let db = db::connect(&self.db_path, &self.table)
            .await
            .map_err(|e| WarehouseError::Connection(e.to_string()))?;
        info!("Connected to warehouse {} at {}", self.table, self.db_path);
        *conn = Some(db.clone());
        Ok(db)
    }
}

#[async_trait]
impl Warehouse for SurrealWarehouse {
    async fn find_routes(&self, params: QueryParams) -> WarehouseResult<Vec<WarehouseRow>> {
        let db = self.connection().await?;

        info!(
            table = %self.table,
            sku = params.sku,
            cp = params.cp,
            "Running warehouse query:{}",
            ROUTE_QUERY
        );

        let mut response = db
            .query(ROUTE_QUERY)
            .bind(("tb", self.table.table.clone()))
            .bind(("sku", params.sku))
            .bind(("cp", params.cp))
            .bind(("company_fleet", DeliveryMethod::COMPANY_FLEET))
            .bind(("external_courier", DeliveryMethod::EXTERNAL_COURIER))
            .await
            .map_err(|e| WarehouseError::Query(e.to_string()))?;

        let rows: Vec<WarehouseRow> = response
            .take(0)
            .map_err(|e| WarehouseError::Query(e.to_string()))?;

        info!("Warehouse returned {} rows", rows.len());
        Ok(rows)
    }
}

/// Run a lookup, degrading any failure to an empty row set plus a message.
pub async fn query_or_empty(
    warehouse: &dyn Warehouse,
    params: QueryParams,
) -> (Vec<WarehouseRow>, Option<String>) {
    match warehouse.find_routes(params).await {
        Ok(rows) => (rows, None),
        Err(e) => {
            warn!("Warehouse lookup failed: {}", e);
            (Vec::new(), Some(e.to_string()))
        }
    }
}
