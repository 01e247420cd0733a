//! Load warehouse rows from a CSV export into the embedded warehouse.
//!
//! Run: ./target/release/ingest --csv raw-data/route_candidates.csv
//!
//! The CSV uses the upstream column names:
//!   ID_TRAZO, SKU_CVE, CP, TDA_CVE, INVENTARIO_OH, MET_ENTREGA, ZONA_ROJA, EXCL_PROD

use anyhow::Result;
use clap::Parser;
use csv::ReaderBuilder;
use route_dashboard::{
    db::{self, TableRef},
    models::CsvRecord,
};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Load warehouse route candidates from CSV")]
struct Args {
    /// CSV file to load
    #[arg(long, default_value = "raw-data/route_candidates.csv")]
    csv: PathBuf,

    /// Path to the embedded warehouse database
    #[arg(long, env = "ROUTE_DASHBOARD_DB_PATH", default_value = "data/warehouse.db")]
    db_path: String,

    #[arg(long, env = "ROUTE_DASHBOARD_NAMESPACE", default_value = "fee")]
    namespace: String,

    #[arg(long, env = "ROUTE_DASHBOARD_DATABASE", default_value = "fecha_estimada_entrega")]
    database: String,

    #[arg(long, env = "ROUTE_DASHBOARD_TABLE", default_value = "route_candidates")]
    table: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let args = Args::parse();
    let table = TableRef::new(&args.namespace, &args.database, &args.table)?;

    info!("Connecting to warehouse {} at {}", table, args.db_path);
    let conn = db::connect(&args.db_path, &table).await?;

    info!("Initializing schema...");
    db::init_schema(&conn, &table).await?;

    info!("Reading CSV from {:?}", args.csv);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(&args.csv)?;

    let mut inserted = 0;
    let mut error_count = 0;

    for (i, record) in reader.deserialize::<CsvRecord>().enumerate() {
        let result = match record {
            Ok(record) => db::insert_row(&conn, &table, &record.to_row()).await,
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(()) => inserted += 1,
            Err(e) => {
                if error_count < 5 {
                    warn!("Failed to load record {}: {}", i, e);
                }
                error_count += 1;
            }
        }

        if (i + 1) % 5000 == 0 {
            info!("Processed {} records...", i + 1);
        }
    }

    info!("Ingestion complete: {} rows, {} errors", inserted, error_count);
    info!("Warehouse total: {} rows", db::count_rows(&conn, &table).await?);

    Ok(())
}
