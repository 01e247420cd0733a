use anyhow::{bail, Result};
use surrealdb::engine::local::{Db, RocksDb};
use surrealdb::Surreal;

use crate::models::WarehouseRow;

pub type DbConn = Surreal<Db>;

/// Three-part identifier of the warehouse table: `namespace.database.table`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub namespace: String,
    pub database: String,
    pub table: String,
}

impl TableRef {
    pub fn new(namespace: &str, database: &str, table: &str) -> Result<Self> {
        for part in [namespace, database, table] {
            if !is_identifier(part) {
                bail!("invalid warehouse identifier '{}'", part);
            }
        }
        Ok(Self {
            namespace: namespace.to_string(),
            database: database.to_string(),
            table: table.to_string(),
        })
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.namespace, self.database, self.table)
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Initialize database connection with RocksDB backend
pub async fn connect(path: &str, table: &TableRef) -> Result<DbConn> {
    let db = Surreal::new::<RocksDb>(path).await?;
    db.use_ns(table.namespace.as_str())
        .use_db(table.database.as_str())
        .await?;
    Ok(db)
}

/// Initialize the warehouse table schema
pub async fn init_schema(db: &DbConn, table: &TableRef) -> Result<()> {
    // Table names cannot be bound as parameters in DEFINE statements;
    // TableRef::new only admits plain identifiers.
    db.query(format!(
        r#"
        DEFINE TABLE {t} SCHEMALESS;
        DEFINE INDEX idx_{t}_sku_cp ON TABLE {t} FIELDS sku_cve, cp;
        DEFINE INDEX idx_{t}_trace ON TABLE {t} FIELDS id_trazo;
        "#,
        t = table.table
    ))
    .await?
    .check()?;

    Ok(())
}

pub async fn insert_row(db: &DbConn, table: &TableRef, row: &WarehouseRow) -> Result<()> {
    db.query("CREATE type::table($tb) CONTENT $row")
        .bind(("tb", table.table.clone()))
        .bind(("row", row.clone()))
        .await?
        .check()?;
    Ok(())
}

/// Insert warehouse rows, returning how many were written
pub async fn insert_rows(db: &DbConn, table: &TableRef, rows: &[WarehouseRow]) -> Result<usize> {
    for row in rows {
        insert_row(db, table, row).await?;
    }
    Ok(rows.len())
}

/// Number of rows currently in the warehouse table
pub async fn count_rows(db: &DbConn, table: &TableRef) -> Result<i64> {
    let total: Option<i64> = db
        .query("SELECT count() FROM type::table($tb) GROUP ALL")
        .bind(("tb", table.table.clone()))
        .await?
        .take("count")?;
    Ok(total.unwrap_or(0))
}
