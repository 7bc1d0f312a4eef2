//! # Commands
//!
//! Each command runs one introspection pass over an explicitly opened
//! connection, then hands the snapshot to the generator or the reporter.

use anyhow::{Context, Result};
use fastback_codegen::rust::controllers::controller_plan;
use fastback_codegen::{ArtifactRole, GenerationContext, Generator, TableInfo, summarize};
use fastback_introspect::{SchemaConnection, discover};
use fastback_ir::SchemaSnapshot;

use crate::config::Settings;
use crate::output;

/// Connect, read the whole schema once, and close the connection
pub async fn introspect(database_url: &str) -> Result<SchemaSnapshot> {
    let connection = SchemaConnection::connect(database_url)
        .await
        .context("Could not connect to the schema")?;
    let snapshot = discover(&connection).await;
    connection.close().await;
    snapshot.context("Schema introspection failed")
}

/// Generate and write the artifacts of `roles`
pub async fn generate(settings: &Settings, roles: &[ArtifactRole]) -> Result<()> {
    let snapshot = introspect(&settings.database_url).await?;
    generate_from_snapshot(settings, &snapshot, roles)
}

/// Generation half of [`generate`], on an already-read snapshot
pub fn generate_from_snapshot(
    settings: &Settings,
    snapshot: &SchemaSnapshot,
    roles: &[ArtifactRole],
) -> Result<()> {
    output::step(&format!(
        "Generating {} for {} table(s) from {}",
        roles
            .iter()
            .map(ArtifactRole::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        snapshot.tables.len(),
        snapshot.database
    ));

    let generator = Generator::new(settings.generator.clone());
    let (generated, report) = generator
        .generate_and_write(snapshot, roles)
        .context("Code generation failed")?;

    output::written(&settings.generator.output_dir, &report);
    output::warnings(&generated.warnings);
    output::stale(&report);
    output::required_crates(&generated.required_crates);
    println!("{}", summarize(snapshot, &generated));
    Ok(())
}

/// Print what was discovered, without writing anything
pub async fn inspect(settings: &Settings, json: bool) -> Result<()> {
    let snapshot = introspect(&settings.database_url).await?;
    if json {
        let text = snapshot
            .to_json()
            .context("Could not serialize the snapshot")?;
        println!("{}", text);
        return Ok(());
    }

    print!("{}", describe(&snapshot, settings));
    Ok(())
}

/// Plain-text report of tables, relationships and inferred routes
pub fn describe(snapshot: &SchemaSnapshot, settings: &Settings) -> String {
    let ctx = GenerationContext::from_snapshot(snapshot.clone(), settings.generator.clone());
    let mut lines = vec![format!(
        "{} table(s) on {}",
        snapshot.tables.len(),
        snapshot.database
    )];

    for table in ctx.tables() {
        let info = TableInfo::new(table, &ctx);
        let columns: Vec<String> = table
            .columns
            .iter()
            .map(|c| format!("{}: {}", c.name, info.column_type(c).to_rust_type()))
            .collect();
        lines.push(String::new());
        lines.push(format!("{} ({})", output::table_name(info.name()), columns.join(", ")));

        let relationships = snapshot.relationships_for(info.name());
        for rel in &relationships.as_master {
            lines.push(format!("  master of {}", rel));
        }
        for rel in &relationships.as_detail {
            lines.push(format!("  detail of {}", rel));
        }

        if info.id_type().is_none() {
            lines.push("  no integer id: model only".to_string());
            continue;
        }
        let (_, plan) = controller_plan(&info);
        for binding in &plan.bindings {
            lines.push(format!(
                "  {:<6} {:<32} -> {}",
                binding.method.as_str(),
                binding.path,
                binding.operation
            ));
        }
    }

    for skipped in &snapshot.skipped {
        lines.push(String::new());
        lines.push(format!("skipped {}: {}", skipped.table, skipped.reason));
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Overrides;
    use fastback_core::DatabaseType;
    use fastback_ir::{ColumnMetadata, ForeignKeyConstraint, TableMetadata};

    fn snapshot() -> SchemaSnapshot {
        let mut snap = SchemaSnapshot::new(DatabaseType::SQLite);
        snap.tables.push(
            TableMetadata::new("pedido")
                .with_column(ColumnMetadata::new("id", "INTEGER").with_primary_key(true))
                .with_column(ColumnMetadata::new("cliente", "TEXT")),
        );
        snap.tables.push(
            TableMetadata::new("item_pedido")
                .with_column(ColumnMetadata::new("id", "INTEGER").with_primary_key(true))
                .with_column(ColumnMetadata::new("pedido_id", "INTEGER")),
        );
        snap.tables.push(
            TableMetadata::new("auditoria").with_column(ColumnMetadata::new("linha", "TEXT")),
        );
        snap.constraints.push(ForeignKeyConstraint::new(
            "fk_item",
            "item_pedido",
            "pedido_id",
            "pedido",
        ));
        snap.skip("bloqueada", "permission denied");
        snap
    }

    fn settings(output_dir: &std::path::Path) -> Settings {
        let overrides = Overrides {
            database_url: Some("sqlite://unused.db".to_string()),
            output_dir: Some(output_dir.to_path_buf()),
            prune: false,
        };
        Settings::resolve(&overrides, None).unwrap()
    }

    #[test]
    fn test_describe_lists_routes_and_roles() {
        colored::control::set_override(false);
        let text = describe(&snapshot(), &settings(std::path::Path::new(".")));

        assert!(text.starts_with("3 table(s) on SQLite"));
        assert!(text.contains("pedido (id: i64, cliente: String)"));
        assert!(text.contains("POST   /pedido/savemasterdetail"));
        assert!(text.contains("GET    /pedido/{id}/details"));
        assert!(text.contains("no integer id: model only"));
        assert!(text.contains("skipped bloqueada: permission denied"));
    }

    #[test]
    fn test_generate_from_snapshot_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());

        generate_from_snapshot(&settings, &snapshot(), ArtifactRole::all()).unwrap();

        let src = dir.path().join("src");
        assert!(src.join("models/auditoria.rs").is_file());
        assert!(src.join("repositories/pedido_repository.rs").is_file());
        assert!(src.join("controllers/item_pedido_controller.rs").is_file());
        assert!(!src.join("repositories/auditoria_repository.rs").exists());
    }

    #[test]
    fn test_generate_single_role() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());

        generate_from_snapshot(&settings, &snapshot(), &[ArtifactRole::Model]).unwrap();

        assert!(dir.path().join("src/models/mod.rs").is_file());
        assert!(!dir.path().join("src/controllers").exists());
    }
}
