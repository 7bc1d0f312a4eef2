//! # Generation Context
//!
//! The `GenerationContext` holds everything the emitters need to produce
//! artifacts. It is built from a `SchemaSnapshot` and provides:
//!
//! - The dialect of the introspected schema
//! - The described tables, in schema order
//! - Master/detail lookups that respect skipped tables
//! - Per-table naming (type names, module names, route segments)
//!

use fastback_core::{DataType, DatabaseType};
use fastback_ir::naming;
use fastback_ir::{ColumnMetadata, Relationship, SchemaSnapshot, TableMetadata};
use std::collections::HashMap;

use crate::ArtifactRole;
use crate::GeneratorConfig;
use crate::render;

// ============================================================================
// GenerationContext
// ============================================================================

/// Context carrying all information needed for code generation.
///
/// Built once per run and shared (by reference) with every emitter.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    /// Generator configuration (output dir, flags, …)
    pub generator_config: GeneratorConfig,

    /// The snapshot being generated from
    snapshot: SchemaSnapshot,
}

impl GenerationContext {
    /// Build a context from an introspection snapshot and generator config.
    pub fn from_snapshot(snapshot: SchemaSnapshot, generator_config: GeneratorConfig) -> Self {
        Self {
            generator_config,
            snapshot,
        }
    }

    /// Build with default generator config (convenience for tests).
    pub fn from_snapshot_default(snapshot: SchemaSnapshot) -> Self {
        Self::from_snapshot(snapshot, GeneratorConfig::default())
    }

    /// Dialect of the schema
    pub fn database(&self) -> DatabaseType {
        self.snapshot.database
    }

    /// Whether generated code carries doc comments
    pub fn generate_docs(&self) -> bool {
        self.generator_config.generate_docs
    }

    /// All described tables, in schema order
    pub fn tables(&self) -> &[TableMetadata] {
        &self.snapshot.tables
    }

    /// Tables that get a repository and a controller
    pub fn keyed_tables(&self) -> impl Iterator<Item = &TableMetadata> {
        self.snapshot
            .tables
            .iter()
            .filter(|t| t.has_integer_id(self.database()))
    }

    /// Look up a described table by name
    pub fn table(&self, name: &str) -> Option<&TableMetadata> {
        self.snapshot.table(name)
    }

    /// The underlying snapshot
    pub fn snapshot(&self) -> &SchemaSnapshot {
        &self.snapshot
    }
}

// ============================================================================
// TableInfo: convenience wrapper for a single table during generation
// ============================================================================

/// Lightweight wrapper for generating code for one table at a time.
#[derive(Debug, Clone, Copy)]
pub struct TableInfo<'a> {
    pub table: &'a TableMetadata,
    pub ctx: &'a GenerationContext,
}

/// Types and variants in scope inside generated files
const RESERVED_TYPE_NAMES: &[&str] = &[
    "Option", "Some", "None", "Result", "Ok", "Err", "Vec", "String", "Box", "Map", "Value",
    "Serialize", "Deserialize", "DeserializeOwned", "Arc", "Json", "Path", "Query", "State",
    "Router", "Response", "IntoResponse", "StatusCode", "ApiResponse", "DetailSelector", "Db",
    "Pool", "RepositoryError", "RepositoryResult",
];

impl<'a> TableInfo<'a> {
    pub fn new(table: &'a TableMetadata, ctx: &'a GenerationContext) -> Self {
        Self { table, ctx }
    }

    /// Raw table name.
    pub fn name(&self) -> &'a str {
        &self.table.name
    }

    /// PascalCase name, used as the model type.
    ///
    /// Names that would shadow a type the generated files use get a `Row`
    /// suffix, e.g. `option` becomes `OptionRow`.
    pub fn pascal_name(&self) -> String {
        let pascal = naming::to_pascal(&self.table.name);
        if RESERVED_TYPE_NAMES.contains(&pascal.as_str()) {
            format!("{}Row", pascal)
        } else {
            pascal
        }
    }

    /// Payload record type, e.g. `PedidoData`.
    pub fn data_type_name(&self) -> String {
        format!("{}Data", self.pascal_name())
    }

    /// Type name for a role, e.g. `PedidoRepository`.
    pub fn type_name(&self, role: ArtifactRole) -> String {
        naming::artifact_type_name(&self.table.name, role.suffix())
    }

    /// File stem for a role, e.g. `pedido_repository`.
    pub fn file_stem(&self, role: ArtifactRole) -> String {
        match role {
            ArtifactRole::Model => naming::module_name(&self.pascal_name()),
            _ => naming::artifact_file_stem(&self.table.name, role.suffix()),
        }
    }

    /// Route segment, e.g. `itemPedido`.
    pub fn resource(&self) -> String {
        naming::to_route_segment(&self.table.name)
    }

    /// Column type for this dialect.
    pub fn column_type(&self, column: &ColumnMetadata) -> DataType {
        column.data_type(self.ctx.database())
    }

    /// Type of the `id` column, if the table has an integer key.
    pub fn id_type(&self) -> Option<DataType> {
        self.table
            .id_column()
            .map(|c| self.column_type(c))
            .filter(|dt| dt.is_integer())
    }

    /// Detail sets this table owns as a master.
    ///
    /// Relationships to skipped tables, or to tables without an integer
    /// `id`, are dropped and reported in the returned warnings.
    pub fn details(&self) -> (Vec<DetailInfo<'a>>, Vec<String>) {
        let relationships = self.ctx.snapshot.relationships_for(&self.table.name);
        let mut warnings = Vec::new();
        let mut kept: Vec<(Relationship, &'a TableMetadata)> = Vec::new();

        for rel in relationships.as_master {
            match self.ctx.table(&rel.detail_table) {
                Some(detail) if detail.has_integer_id(self.ctx.database()) => {
                    if detail.column(&rel.detail_column).is_some() {
                        kept.push((rel, detail));
                    } else {
                        warnings.push(format!(
                            "Relationship {} names a column missing from '{}'; dropped.",
                            rel, rel.detail_table
                        ));
                    }
                }
                Some(_) => warnings.push(format!(
                    "Relationship {} dropped: '{}' has no integer id column.",
                    rel, rel.detail_table
                )),
                None => warnings.push(format!(
                    "Relationship {} dropped: table '{}' was not introspected.",
                    rel, rel.detail_table
                )),
            }
        }

        let mut per_table: HashMap<String, usize> = HashMap::new();
        for (rel, _) in &kept {
            *per_table.entry(rel.detail_table.clone()).or_default() += 1;
        }

        let details = kept
            .into_iter()
            .map(|(relationship, table)| {
                let singular = naming::singularize(&relationship.detail_table);
                let base = if per_table[&relationship.detail_table] > 1 {
                    format!("{}_by_{}", singular, relationship.detail_column)
                } else {
                    singular
                };
                // `master` is taken by the embedded master row
                let field = match render::field_name(&base) {
                    field if field == "master" => "master_rows".to_string(),
                    field => field,
                };
                DetailInfo {
                    key: naming::to_camel(&base),
                    field,
                    relationship,
                    table: TableInfo::new(table, self.ctx),
                }
            })
            .collect();

        (details, warnings)
    }
}

// ============================================================================
// DetailInfo
// ============================================================================

/// One detail set of a master table
#[derive(Debug, Clone)]
pub struct DetailInfo<'a> {
    /// JSON key, camelCase singular detail name (e.g. `itemPedido`)
    pub key: String,

    /// Rust field name for the set (e.g. `item_pedido`)
    pub field: String,

    pub relationship: Relationship,

    pub table: TableInfo<'a>,
}

impl DetailInfo<'_> {
    /// Variant name used in the detail selector enums
    pub fn variant(&self) -> String {
        naming::to_pascal(&self.field)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::order_snapshot;
    use fastback_ir::{ForeignKeyConstraint, TableMetadata};

    #[test]
    fn test_table_names() {
        let ctx = GenerationContext::from_snapshot_default(order_snapshot());
        let info = TableInfo::new(ctx.table("item_pedido").unwrap(), &ctx);
        assert_eq!(info.pascal_name(), "ItemPedido");
        assert_eq!(info.data_type_name(), "ItemPedidoData");
        assert_eq!(info.type_name(ArtifactRole::Repository), "ItemPedidoRepository");
        assert_eq!(info.file_stem(ArtifactRole::Controller), "item_pedido_controller");
        assert_eq!(info.file_stem(ArtifactRole::Model), "item_pedido");
        assert_eq!(info.resource(), "itemPedido");
        assert_eq!(info.id_type(), Some(DataType::Int64));
    }

    #[test]
    fn test_details_of_master() {
        let ctx = GenerationContext::from_snapshot_default(order_snapshot());
        let info = TableInfo::new(ctx.table("pedido").unwrap(), &ctx);
        let (details, warnings) = info.details();
        assert!(warnings.is_empty());
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].key, "itemPedido");
        assert_eq!(details[0].field, "item_pedido");
        assert_eq!(details[0].variant(), "ItemPedido");
    }

    #[test]
    fn test_detail_on_missing_table_dropped() {
        let mut snap = order_snapshot();
        snap.tables.retain(|t| t.name != "item_pedido");
        snap.skip("item_pedido", "permission denied");
        let ctx = GenerationContext::from_snapshot_default(snap);
        let info = TableInfo::new(ctx.table("pedido").unwrap(), &ctx);
        let (details, warnings) = info.details();
        assert!(details.is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_two_links_to_same_detail_get_distinct_keys() {
        let mut snap = order_snapshot();
        snap.tables[0]
            .columns
            .push(ColumnMetadata::new("pedido_origem_id", "INTEGER"));
        snap.constraints.push(ForeignKeyConstraint::new(
            "fk_origem",
            "item_pedido",
            "pedido_origem_id",
            "pedido",
        ));
        let ctx = GenerationContext::from_snapshot_default(snap);
        let info = TableInfo::new(ctx.table("pedido").unwrap(), &ctx);
        let (details, _) = info.details();
        let keys: Vec<_> = details.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["itemPedidoByPedidoId", "itemPedidoByPedidoOrigemId"]
        );
    }

    #[test]
    fn test_std_type_names_get_row_suffix() {
        let mut snap = order_snapshot();
        for name in ["option", "vec", "string"] {
            snap.tables.push(
                TableMetadata::new(name).with_column(ColumnMetadata::new("id", "INTEGER")),
            );
        }
        let ctx = GenerationContext::from_snapshot_default(snap);
        let names: Vec<String> = ["option", "vec", "string"]
            .iter()
            .map(|t| TableInfo::new(ctx.table(t).unwrap(), &ctx).pascal_name())
            .collect();
        assert_eq!(names, vec!["OptionRow", "VecRow", "StringRow"]);

        let option = TableInfo::new(ctx.table("option").unwrap(), &ctx);
        assert_eq!(option.data_type_name(), "OptionRowData");
        assert_eq!(option.file_stem(ArtifactRole::Model), "option_row");
        assert_eq!(option.resource(), "option");
    }

    #[test]
    fn test_detail_named_master_gets_distinct_field() {
        let mut snap = order_snapshot();
        snap.tables.push(
            TableMetadata::new("masters")
                .with_column(ColumnMetadata::new("id", "INTEGER"))
                .with_column(ColumnMetadata::new("pedido_id", "INTEGER")),
        );
        snap.constraints
            .push(ForeignKeyConstraint::new("fk_masters", "masters", "pedido_id", "pedido"));
        let ctx = GenerationContext::from_snapshot_default(snap);
        let info = TableInfo::new(ctx.table("pedido").unwrap(), &ctx);
        let (details, _) = info.details();
        let master = details.iter().find(|d| d.relationship.detail_table == "masters").unwrap();
        assert_eq!(master.field, "master_rows");
        assert_eq!(master.key, "master");
    }
}
