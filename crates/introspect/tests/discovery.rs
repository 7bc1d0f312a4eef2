use fastback_core::DatabaseType;
use fastback_introspect::{SchemaConnection, SchemaIntrospector, StaticSchema, discover};
use fastback_ir::{ColumnMetadata, ForeignKeyConstraint, Relationship, TableMetadata};
use pretty_assertions::assert_eq;
use sqlx::sqlite::SqlitePoolOptions;

const SCHEMA: &[&str] = &[
    "CREATE TABLE pedido (id INTEGER PRIMARY KEY AUTOINCREMENT, cliente TEXT NOT NULL, total REAL)",
    "CREATE TABLE item_pedido (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        pedido_id INTEGER NOT NULL REFERENCES pedido(id),
        produto TEXT,
        quantidade INTEGER
    )",
    "CREATE TABLE nota (id INTEGER PRIMARY KEY, texto TEXT)",
];

async fn sqlite_connection() -> SchemaConnection {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    for statement in SCHEMA {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }
    SchemaConnection::Sqlite(pool)
}

#[tokio::test]
async fn test_sqlite_lists_user_tables_only() {
    let conn = sqlite_connection().await;
    let tables = conn.list_tables().await.unwrap();
    assert_eq!(tables, vec!["item_pedido", "nota", "pedido"]);
}

#[tokio::test]
async fn test_sqlite_describes_columns_in_order() {
    let conn = sqlite_connection().await;
    let columns = conn.describe_columns("pedido").await.unwrap();

    let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "cliente", "total"]);
    assert!(columns[0].primary_key);
    assert_eq!(columns[0].declared_type, "INTEGER");
    assert!(!columns[1].nullable);
    assert!(columns[2].nullable);
}

#[tokio::test]
async fn test_sqlite_foreign_keys_seen_from_both_sides() {
    let conn = sqlite_connection().await;

    let from_master = conn.describe_foreign_keys("pedido").await.unwrap();
    let from_detail = conn.describe_foreign_keys("item_pedido").await.unwrap();
    assert_eq!(from_master, from_detail);
    assert_eq!(from_master.len(), 1);
    assert_eq!(from_master[0].detail_column, "pedido_id");
    assert_eq!(from_master[0].master_table, "pedido");
    assert_eq!(from_master[0].position, 1);

    assert!(conn.describe_foreign_keys("nota").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sqlite_discover_builds_snapshot() {
    let conn = sqlite_connection().await;
    let snapshot = discover(&conn).await.unwrap();

    assert_eq!(snapshot.database, DatabaseType::SQLite);
    assert_eq!(snapshot.tables.len(), 3);
    assert!(snapshot.skipped.is_empty());

    let pedido = snapshot.relationships_for("pedido");
    assert_eq!(
        pedido.as_master,
        vec![Relationship::new("item_pedido", "pedido_id", "pedido")]
    );
    assert!(!snapshot.relationships_for("nota").is_master());
}

#[tokio::test]
async fn test_sqlite_missing_table_has_no_columns() {
    let conn = sqlite_connection().await;
    assert!(conn.describe_columns("ghost").await.unwrap().is_empty());
}

fn static_schema() -> StaticSchema {
    StaticSchema::new(DatabaseType::MySQL)
        .with_table(
            TableMetadata::new("pedido")
                .with_column(ColumnMetadata::new("id", "int(11)").with_primary_key(true))
                .with_column(ColumnMetadata::new("cliente", "varchar(100)")),
        )
        .with_table(
            TableMetadata::new("item_pedido")
                .with_column(ColumnMetadata::new("id", "int(11)").with_primary_key(true))
                .with_column(ColumnMetadata::new("pedido_id", "int(11)")),
        )
        .with_table(TableMetadata::new("vazia"))
        .with_constraint(ForeignKeyConstraint::new(
            "fk_item_pedido",
            "item_pedido",
            "pedido_id",
            "pedido",
        ))
}

#[tokio::test]
async fn test_table_failure_skips_only_that_table() {
    let schema = static_schema().with_failing_table("item_pedido");
    let snapshot = discover(&schema).await.unwrap();

    let names: Vec<_> = snapshot.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["pedido"]);
    assert!(snapshot.is_skipped("item_pedido"));
    assert!(snapshot.is_skipped("vazia"));
    assert_eq!(snapshot.skipped.len(), 2);
}

#[tokio::test]
async fn test_unreachable_schema_is_fatal() {
    let schema = static_schema().unreachable();
    let err = discover(&schema).await.unwrap_err();
    assert!(err.is_connectivity());
}

#[tokio::test]
async fn test_static_constraints_reported_per_table() {
    let snapshot = discover(&static_schema()).await.unwrap();
    // reported once by each side of the dependency
    assert_eq!(snapshot.constraints.len(), 2);
    assert_eq!(snapshot.relationships_for("pedido").as_master.len(), 1);
}

#[tokio::test]
async fn test_unsupported_url_is_fatal() {
    let err = SchemaConnection::connect("oracle://localhost/xe")
        .await
        .unwrap_err();
    assert!(err.is_connectivity());
}
