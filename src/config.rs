//! Command-line and environment configuration.

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use std::time::Duration;

use crate::db::TableRef;
use crate::input::parse_date;
use crate::route_client::DEFAULT_ROUTE_SERVICE_URL;

#[derive(Parser, Debug, Clone)]
#[command(name = "route_dashboard")]
#[command(about = "Delivery route lookup and estimated delivery date dashboard")]
pub struct Args {
    /// Port to listen on
    #[arg(long, env = "ROUTE_DASHBOARD_PORT", default_value = "8080")]
    pub port: u16,

    /// Path to the embedded warehouse database
    #[arg(long, env = "ROUTE_DASHBOARD_DB_PATH", default_value = "data/warehouse.db")]
    pub db_path: String,

    /// Warehouse namespace
    #[arg(long, env = "ROUTE_DASHBOARD_NAMESPACE", default_value = "fee")]
    pub namespace: String,

    /// Warehouse database
    #[arg(long, env = "ROUTE_DASHBOARD_DATABASE", default_value = "fecha_estimada_entrega")]
    pub database: String,

    /// Warehouse table holding route candidates
    #[arg(long, env = "ROUTE_DASHBOARD_TABLE", default_value = "route_candidates")]
    pub table: String,

    /// Route calculation endpoint
    #[arg(long, env = "ROUTE_DASHBOARD_ROUTE_URL", default_value = DEFAULT_ROUTE_SERVICE_URL)]
    pub route_url: String,

    /// Original purchase date used for recalculation and the calendar (YYYY-MM-DD)
    #[arg(long, env = "ROUTE_DASHBOARD_PURCHASE_DATE", default_value = "2025-06-02")]
    pub purchase_date: String,

    /// Minutes a session may stay idle before it is dropped
    #[arg(long, env = "ROUTE_DASHBOARD_SESSION_IDLE_MINUTES", default_value = "30")]
    pub session_idle_minutes: u64,

    /// Initial SKU shown in the form
    #[arg(long, default_value = "1139002876")]
    pub default_sku: String,

    /// Initial postal code shown in the form
    #[arg(long, default_value = "52715")]
    pub default_cp: String,

    /// Initial quantity shown in the form
    #[arg(long, default_value = "2")]
    pub default_qty: u32,

    /// Initial original delivery date for recalculation (YYYY-MM-DD)
    #[arg(long, default_value = "2025-06-12")]
    pub default_original_delivery: String,

    /// Initial rejecting store for recalculation
    #[arg(long, default_value = "108")]
    pub default_rejecting_store: i64,
}

/// Values a new session's form starts with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDefaults {
    pub sku: String,
    pub cp: String,
    pub qty: u32,
    pub original_delivery: NaiveDate,
    pub rejecting_store: i64,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            sku: "1139002876".to_string(),
            cp: "52715".to_string(),
            qty: 2,
            original_delivery: NaiveDate::from_ymd_opt(2025, 6, 12).unwrap_or_default(),
            rejecting_store: 108,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub table: TableRef,
    pub db_path: String,
    pub route_url: String,
    pub purchase_date: NaiveDate,
    pub session_idle: Duration,
    pub defaults: FormDefaults,
}

impl DashboardConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        Ok(Self {
            table: TableRef::new(&args.namespace, &args.database, &args.table)?,
            db_path: args.db_path.clone(),
            route_url: args.route_url.clone(),
            purchase_date: parse_date(&args.purchase_date)?,
            session_idle: Duration::from_secs(args.session_idle_minutes * 60),
            defaults: FormDefaults {
                sku: args.default_sku.clone(),
                cp: args.default_cp.clone(),
                qty: args.default_qty,
                original_delivery: parse_date(&args.default_original_delivery)?,
                rejecting_store: args.default_rejecting_store,
            },
        })
    }
}
