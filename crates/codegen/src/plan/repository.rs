//! Repository plans
//!
//! A `RepositoryPlan` is the data-access surface of one table: the
//! statements behind every operation, plus the master-detail statements when
//! the table owns detail sets. The repository emitter renders it; tests
//! execute it.

use fastback_core::DatabaseType;
use fastback_ir::Relationship;
use serde::Serialize;

use super::routes::OperationKind;
use super::sql::{Bind, SqlBuilder, Statement};
use crate::context::{DetailInfo, TableInfo};

/// Operation names every repository exposes
pub const BASE_OPERATIONS: &[&str] = &["find_all", "find_by_id", "create", "update", "delete"];

/// Operation names added for master tables
pub const MASTER_OPERATIONS: &[&str] = &[
    "find_with_details",
    "save_master_detail",
    "update_detail",
    "delete_detail",
];

// ============================================================================
// RepositoryPlan
// ============================================================================

/// Statements for one table's repository
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryPlan {
    pub table: String,
    pub type_name: String,
    pub database: DatabaseType,

    /// All columns, in physical order
    pub columns: Vec<String>,

    pub create: Statement,
    pub find_by_id: Statement,
    pub find_all: Statement,
    pub update: Statement,
    pub delete: Statement,

    /// Present only when the table is a master
    pub master_detail: Option<MasterDetailPlan>,
}

/// Statements used by the master-detail operations
#[derive(Debug, Clone, Serialize)]
pub struct MasterDetailPlan {
    /// Insert that yields the new master id
    pub insert_master: Statement,
    pub update_master: Statement,
    pub details: Vec<DetailPlan>,
}

/// Statements for one detail set of a master
#[derive(Debug, Clone, Serialize)]
pub struct DetailPlan {
    pub relationship: Relationship,

    /// camelCase JSON key of the set
    pub key: String,

    /// Rust field name of the set
    pub field: String,

    pub columns: Vec<String>,

    /// Detail rows whose foreign key equals the master id
    pub select_by_master: Statement,

    /// Insert with the foreign key bound to the captured master id
    pub insert: Statement,

    /// Update of every non-key, non-foreign-key column by detail id
    pub update: Statement,

    pub delete: Statement,
}

impl DetailPlan {
    pub fn table(&self) -> &str {
        &self.relationship.detail_table
    }

    pub fn foreign_key(&self) -> &str {
        &self.relationship.detail_column
    }
}

/// A named repository operation and its kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Operation {
    pub name: &'static str,
    pub kind: OperationKind,
}

impl RepositoryPlan {
    /// Build the plan for a keyed table and the detail sets it owns.
    pub fn build(info: &TableInfo<'_>, details: &[DetailInfo<'_>]) -> Self {
        let db = info.ctx.database();
        let sql = SqlBuilder::new(db).reading_as_text(info.table.text_columns(db));
        let table = info.name();

        let columns: Vec<&str> = info.table.columns.iter().map(|c| c.name.as_str()).collect();
        let values: Vec<(&str, Bind)> = info
            .table
            .non_key_columns()
            .map(|c| (c.name.as_str(), Bind::Field(c.name.clone())))
            .collect();

        let update = sql.update(table, &values, Bind::Id);

        let master_detail = if details.is_empty() {
            None
        } else {
            Some(MasterDetailPlan {
                insert_master: sql.insert(table, &values, true),
                update_master: update.clone(),
                details: details.iter().map(|d| DetailPlan::build(db, d)).collect(),
            })
        };

        Self {
            table: table.to_string(),
            type_name: info.type_name(crate::ArtifactRole::Repository),
            database: db,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            create: sql.insert(table, &values, false),
            find_by_id: sql.select_where(table, &columns, "id", Bind::Id),
            find_all: sql.select_all(table, &columns),
            update,
            delete: sql.delete(table, Bind::Id),
            master_detail,
        }
    }

    pub fn is_master(&self) -> bool {
        self.master_detail.is_some()
    }

    /// The operation surface, in declaration order
    pub fn operations(&self) -> Vec<Operation> {
        let master: &[&'static str] = if self.is_master() {
            MASTER_OPERATIONS
        } else {
            &[]
        };
        BASE_OPERATIONS
            .iter()
            .chain(master.iter())
            .copied()
            .map(|name| Operation {
                name,
                kind: OperationKind::classify(name),
            })
            .collect()
    }

    /// Operation names only, as consumed by route inference
    pub fn operation_names(&self) -> Vec<&'static str> {
        self.operations().into_iter().map(|op| op.name).collect()
    }
}

impl DetailPlan {
    fn build(db: DatabaseType, detail: &DetailInfo<'_>) -> Self {
        let sql = SqlBuilder::new(db).reading_as_text(detail.table.table.text_columns(db));
        let table = detail.table.name();
        let fk = detail.relationship.detail_column.as_str();
        let columns: Vec<&str> = detail
            .table
            .table
            .columns
            .iter()
            .map(|c| c.name.as_str())
            .collect();

        // A detail keyed by its master's id binds the captured id to `id` itself
        let insert_values: Vec<(&str, Bind)> = detail
            .table
            .table
            .columns
            .iter()
            .filter(|c| !c.is_id() || c.name == fk)
            .map(|c| {
                let bind = if c.name == fk {
                    Bind::MasterId
                } else {
                    Bind::Field(c.name.clone())
                };
                (c.name.as_str(), bind)
            })
            .collect();

        let update_values: Vec<(&str, Bind)> = detail
            .table
            .table
            .non_key_columns()
            .filter(|c| c.name != fk)
            .map(|c| (c.name.as_str(), Bind::Field(c.name.clone())))
            .collect();

        Self {
            relationship: detail.relationship.clone(),
            key: detail.key.clone(),
            field: detail.field.clone(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            select_by_master: sql.select_where(table, &columns, fk, Bind::Id),
            insert: sql.insert(table, &insert_values, false),
            update: sql.update(table, &update_values, Bind::DetailId),
            delete: sql.delete(table, Bind::DetailId),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::GenerationContext;
    use crate::fixtures::order_snapshot;
    use fastback_ir::{ColumnMetadata, ForeignKeyConstraint, TableMetadata};
    use pretty_assertions::assert_eq;

    fn plan_for(ctx: &GenerationContext, table: &str) -> RepositoryPlan {
        let info = TableInfo::new(ctx.table(table).unwrap(), ctx);
        let (details, _) = info.details();
        RepositoryPlan::build(&info, &details)
    }

    #[test]
    fn test_basic_statements() {
        let ctx = GenerationContext::from_snapshot_default(order_snapshot());
        let plan = plan_for(&ctx, "item_pedido");

        assert_eq!(plan.type_name, "ItemPedidoRepository");
        assert_eq!(
            plan.create.sql,
            "INSERT INTO \"item_pedido\" (\"pedido_id\", \"produto\") VALUES (?, ?)"
        );
        assert_eq!(
            plan.find_all.sql,
            "SELECT \"id\", \"pedido_id\", \"produto\" FROM \"item_pedido\" ORDER BY \"id\""
        );
        assert_eq!(plan.find_by_id.binds, vec![Bind::Id]);
        assert_eq!(plan.update.arity(), 3);
        assert!(!plan.is_master());
    }

    #[test]
    fn test_plain_table_operations() {
        let ctx = GenerationContext::from_snapshot_default(order_snapshot());
        let plan = plan_for(&ctx, "item_pedido");
        assert_eq!(plan.operation_names(), BASE_OPERATIONS.to_vec());
    }

    #[test]
    fn test_master_gets_detail_operations() {
        let ctx = GenerationContext::from_snapshot_default(order_snapshot());
        let plan = plan_for(&ctx, "pedido");
        let names = plan.operation_names();

        assert!(names.contains(&"save_master_detail"));
        assert!(names.contains(&"find_with_details"));
        assert_eq!(names.len(), 9);

        let kinds: Vec<_> = plan.operations().iter().map(|op| op.kind).collect();
        assert!(!kinds.contains(&OperationKind::Other));
    }

    #[test]
    fn test_detail_statements_bind_master_id() {
        let ctx = GenerationContext::from_snapshot_default(order_snapshot());
        let plan = plan_for(&ctx, "pedido");
        let md = plan.master_detail.unwrap();
        let detail = &md.details[0];

        assert_eq!(detail.key, "itemPedido");
        assert_eq!(detail.foreign_key(), "pedido_id");
        assert_eq!(
            detail.insert.binds,
            vec![Bind::MasterId, Bind::Field("produto".to_string())]
        );
        assert_eq!(
            detail.update.sql,
            "UPDATE \"item_pedido\" SET \"produto\" = ? WHERE \"id\" = ?"
        );
        assert_eq!(detail.delete.binds, vec![Bind::DetailId]);
        assert!(detail.select_by_master.sql.ends_with("WHERE \"pedido_id\" = ? ORDER BY \"id\""));
    }

    #[test]
    fn test_postgres_master_insert_returns_id() {
        let mut snap = order_snapshot();
        snap.database = DatabaseType::PostgreSQL;
        for table in &mut snap.tables {
            table.columns[0].declared_type = "integer".to_string();
        }
        let ctx = GenerationContext::from_snapshot_default(snap);
        let plan = plan_for(&ctx, "pedido");
        let md = plan.master_detail.unwrap();
        assert_eq!(
            md.insert_master.sql,
            "INSERT INTO \"pedido\" (\"cliente\") VALUES ($1) RETURNING \"id\""
        );
        assert!(!plan.create.sql.contains("RETURNING"));
    }

    #[test]
    fn test_shared_key_detail_binds_master_id_to_id() {
        let mut snap = order_snapshot();
        snap.tables.push(
            TableMetadata::new("entrega")
                .with_column(ColumnMetadata::new("id", "INTEGER").with_primary_key(true))
                .with_column(ColumnMetadata::new("endereco", "TEXT")),
        );
        snap.constraints
            .push(ForeignKeyConstraint::new("fk_entrega", "entrega", "id", "pedido"));
        let ctx = GenerationContext::from_snapshot_default(snap);
        let plan = plan_for(&ctx, "pedido");
        let md = plan.master_detail.unwrap();
        let entrega = md.details.iter().find(|d| d.table() == "entrega").unwrap();

        assert_eq!(
            entrega.insert.sql,
            "INSERT INTO \"entrega\" (\"id\", \"endereco\") VALUES (?, ?)"
        );
        assert_eq!(
            entrega.insert.binds,
            vec![Bind::MasterId, Bind::Field("endereco".to_string())]
        );
        assert_eq!(
            entrega.update.sql,
            "UPDATE \"entrega\" SET \"endereco\" = ? WHERE \"id\" = ?"
        );
    }

    #[test]
    fn test_postgres_reads_money_as_text() {
        let mut snap = order_snapshot();
        snap.database = DatabaseType::PostgreSQL;
        for table in &mut snap.tables {
            table.columns[0].declared_type = "integer".to_string();
        }
        snap.tables[0].columns[2].declared_type = "money".to_string();
        let ctx = GenerationContext::from_snapshot_default(snap);
        let plan = plan_for(&ctx, "pedido");
        let md = plan.master_detail.unwrap();

        assert_eq!(
            md.details[0].select_by_master.sql,
            "SELECT \"id\", \"pedido_id\", \"produto\"::text AS \"produto\" \
             FROM \"item_pedido\" WHERE \"pedido_id\" = $1 ORDER BY \"id\""
        );
        assert!(!plan.find_all.sql.contains("::text"));
    }
}
