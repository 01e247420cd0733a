//! Dashboard server
//!
//! Usage:
//!   ./target/release/route_dashboard [options]
//!
//! Options (each also readable from a ROUTE_DASHBOARD_* variable):
//!   --port PORT          Port to listen on (default: 8080)
//!   --db-path PATH       Embedded warehouse database (default: data/warehouse.db)
//!   --namespace NS       Warehouse namespace
//!   --database DB        Warehouse database
//!   --table TABLE        Warehouse table
//!   --route-url URL      Route calculation endpoint
//!   --purchase-date DATE Original purchase date (default: 2025-06-02)
//!
//! Endpoints:
//!   GET  /                          Dashboard page
//!   POST /actions/query-routes      Warehouse lookup
//!   POST /actions/calculate-route   Route service call
//!   POST /actions/recalculation     Toggle recalculation mode
//!   POST /actions/presets/:name     Apply a weight preset
//!   GET  /api/v1/health             Health check

use anyhow::Result;
use clap::Parser;
use route_dashboard::{
    api,
    config::{Args, DashboardConfig},
    dashboard::DashboardService,
    route_client::RouteClient,
    warehouse::SurrealWarehouse,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn print_banner(port: u16, config: &DashboardConfig) {
    println!("============================================================");
    println!("        DELIVERY ROUTE DASHBOARD");
    println!("============================================================");
    println!();
    println!("  Dashboard:  http://localhost:{}/", port);
    println!("  Warehouse:  {} ({})", config.table, config.db_path);
    println!("  Routes:     {}", config.route_url);
    println!("  Purchase:   {}", config.purchase_date);
    println!();
    println!("============================================================");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();

    let args = Args::parse();
    let config = DashboardConfig::from_args(&args)?;
    print_banner(args.port, &config);

    // Connected lazily so a missing warehouse shows up as a page error
    // instead of preventing startup.
    let warehouse = Arc::new(SurrealWarehouse::new(&config.db_path, config.table.clone()));
    let routes = RouteClient::new(&config.route_url);
    let service = Arc::new(DashboardService::new(config, warehouse, routes));

    let addr: SocketAddr = format!("0.0.0.0:{}", args.port).parse()?;
    let app = api::create_router(service);
    tracing::info!("Starting dashboard on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
