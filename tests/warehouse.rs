mod common;

use route_dashboard::{
    db::{self, TableRef},
    models::{DeliveryMethod, QueryParams, WarehouseRow},
    warehouse::{query_or_empty, SurrealWarehouse, Warehouse},
};

fn candidate(trace: &str, sku: i64, cp: i64, store: i64, inventory: i64, method: &str) -> WarehouseRow {
    WarehouseRow {
        id_trazo: trace.to_string(),
        sku_cve: sku,
        cp,
        tda_cve: store,
        inventario_oh: inventory,
        met_entrega: DeliveryMethod::from(method),
        zona_roja: false,
        excl_prod: 0,
    }
}

#[tokio::test]
async fn test_filter_rules_are_applied() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("warehouse.db");
    let table = TableRef::new("fee", "test", "route_candidates").unwrap();

    let conn = db::connect(path.to_str().unwrap(), &table).await.unwrap();
    db::init_schema(&conn, &table).await.unwrap();

    let fleet_red_zone = WarehouseRow {
        zona_roja: true,
        ..candidate("fleet-red", 100, 52715, 1, 5, "FLOTA LIVERPOOL")
    };
    let courier_excluded = WarehouseRow {
        excl_prod: 1,
        ..candidate("courier-excl", 100, 52715, 2, 5, "MENSAJERIA EXTERNA")
    };
    // red zone only matters for the company fleet
    let courier_red_zone = WarehouseRow {
        zona_roja: true,
        ..candidate("courier-red", 100, 52715, 3, 5, "MENSAJERIA EXTERNA")
    };
    let rows = vec![
        candidate("fleet-ok", 100, 52715, 4, 2, "FLOTA LIVERPOOL"),
        fleet_red_zone,
        courier_excluded,
        courier_red_zone,
        candidate("no-stock", 100, 52715, 5, 0, "FLOTA LIVERPOOL"),
        candidate("other-sku", 200, 52715, 6, 3, "FLOTA LIVERPOOL"),
        candidate("other-cp", 100, 11000, 7, 3, "FLOTA LIVERPOOL"),
        candidate("store-pickup", 100, 52715, 8, 1, "TIENDA"),
    ];
    assert_eq!(db::insert_rows(&conn, &table, &rows).await.unwrap(), rows.len());
    assert_eq!(db::count_rows(&conn, &table).await.unwrap(), rows.len() as i64);

    let warehouse = SurrealWarehouse::with_connection(conn, table);
    let found = warehouse
        .find_routes(QueryParams { sku: 100, cp: 52715 })
        .await
        .unwrap();

    let traces: Vec<&str> = found.iter().map(|r| r.id_trazo.as_str()).collect();
    assert_eq!(traces, vec!["courier-red", "fleet-ok", "store-pickup"]);
    assert_eq!(found[1].met_entrega, DeliveryMethod::CompanyFleet);
    assert_eq!(found[2].met_entrega, DeliveryMethod::Other("TIENDA".to_string()));
}

#[tokio::test]
async fn test_unknown_sku_returns_no_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("warehouse.db");
    let table = TableRef::new("fee", "test", "route_candidates").unwrap();

    let conn = db::connect(path.to_str().unwrap(), &table).await.unwrap();
    db::init_schema(&conn, &table).await.unwrap();

    let warehouse = SurrealWarehouse::with_connection(conn, table);
    let (rows, failure) = query_or_empty(&warehouse, QueryParams { sku: 1, cp: 2 }).await;
    assert!(rows.is_empty());
    assert!(failure.is_none());
}

#[tokio::test]
async fn test_connection_failure_degrades_to_empty_result() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file where the database directory should be
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"x").unwrap();
    let table = TableRef::new("fee", "test", "route_candidates").unwrap();

    let warehouse = SurrealWarehouse::new(blocker.join("db").to_str().unwrap(), table);
    let (rows, failure) = query_or_empty(&warehouse, QueryParams { sku: 1, cp: 2 }).await;
    assert!(rows.is_empty());
    assert!(failure.unwrap().starts_with("Warehouse connection error"));

    let (rows, failure) = query_or_empty(&common::UnreachableWarehouse, QueryParams { sku: 1, cp: 2 }).await;
    assert!(rows.is_empty());
    assert!(failure.is_some());
}
