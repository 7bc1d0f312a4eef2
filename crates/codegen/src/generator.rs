//! # Code Generator Orchestrator
//!
//! The `Generator` is the top-level entry point for code generation. It takes
//! a [`SchemaSnapshot`] and a [`GeneratorConfig`], builds a
//! [`GenerationContext`], and runs the requested emitters to produce a
//! [`GenerationOutput`].
//!
//! ## Pipeline
//!
//! ```text
//! SchemaSnapshot + GeneratorConfig
//!         │
//!         ▼
//!   GenerationContext::from_snapshot()
//!         │
//!         ├──► rust::generate_models()        → models/*.rs
//!         ├──► rust::generate_repositories()  → repositories/*.rs
//!         ├──► rust::generate_controllers()   → controllers/*.rs
//!         │
//!         ▼
//!   GenerationOutput { artifacts, warnings }
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fastback_codegen::{ArtifactRole, Generator, GeneratorConfig};
//!
//! let output = Generator::new(GeneratorConfig::default())
//!     .generate(&snapshot, ArtifactRole::all())?;
//!
//! println!("Generated {} files", output.file_count());
//! output.write_to_disk("/path/to/output", false)?;
//! ```

use fastback_core::{EngineResult, Validatable};
use fastback_ir::SchemaSnapshot;
use std::collections::BTreeSet;

use crate::context::GenerationContext;
use crate::rust;
use crate::{ArtifactRole, GenerationOutput, GeneratorConfig, WriteReport};

// ============================================================================
// Generator
// ============================================================================

/// Top-level code generator.
///
/// Stateless aside from its configuration. Every call regenerates every
/// artifact of the requested roles from scratch.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    // ====================================================================
    // Generation
    // ====================================================================

    /// Run the emitters for `roles` over a snapshot.
    ///
    /// # Steps
    ///
    /// 1. **Validate** the configuration.
    /// 2. **Report** tables that introspection skipped.
    /// 3. **Emit** each requested role once, in pipeline order.
    /// 4. **Collect** the extra crates the generated types need.
    ///
    /// # Errors
    ///
    /// Configuration errors and rendering failures. Per-table problems are
    /// warnings, not errors.
    pub fn generate(
        &self,
        snapshot: &SchemaSnapshot,
        roles: &[ArtifactRole],
    ) -> EngineResult<GenerationOutput> {
        // ── 1. Validate ──────────────────────────────────────────────────
        self.config.validate()?;

        let ctx = GenerationContext::from_snapshot(snapshot.clone(), self.config.clone());
        let mut output = GenerationOutput::default();

        // ── 2. Skipped tables ────────────────────────────────────────────
        for skipped in &snapshot.skipped {
            output.add_warning(format!(
                "Table '{}' was skipped during introspection: {}",
                skipped.table, skipped.reason
            ));
        }

        // ── 3. Emit ──────────────────────────────────────────────────────
        let requested: BTreeSet<ArtifactRole> = roles.iter().copied().collect();
        for role in requested {
            let (artifacts, warnings) = match role {
                ArtifactRole::Model => rust::generate_models(&ctx)?,
                ArtifactRole::Repository => rust::generate_repositories(&ctx)?,
                ArtifactRole::Controller => rust::generate_controllers(&ctx)?,
            };
            tracing::debug!(role = %role, artifacts = artifacts.len(), "role emitted");

            output.artifacts.extend(artifacts);
            output.warnings.extend(warnings);
            output
                .role_dirs
                .push((role, self.config.role_dir(role).to_path_buf()));
        }

        // ── 4. Extra crates ──────────────────────────────────────────────
        output.required_crates = ctx
            .tables()
            .iter()
            .flat_map(|t| t.columns.iter())
            .filter_map(|c| c.data_type(ctx.database()).required_crate())
            .collect();

        tracing::info!(
            files = output.file_count(),
            warnings = output.warnings.len(),
            database = %ctx.database(),
            "code generation complete",
        );

        Ok(output)
    }

    /// Generate and write to the configured output directory, pruning stale
    /// artifacts when the configuration asks for it.
    pub fn generate_and_write(
        &self,
        snapshot: &SchemaSnapshot,
        roles: &[ArtifactRole],
    ) -> EngineResult<(GenerationOutput, WriteReport)> {
        let output = self.generate(snapshot, roles)?;
        let report = output.write_to_disk(&self.config.output_dir, self.config.prune_stale)?;
        tracing::info!(
            output_dir = %self.config.output_dir.display(),
            written = report.written.len(),
            stale = report.stale.len(),
            "files written to disk",
        );
        Ok((output, report))
    }
}

// ============================================================================
// Standalone convenience function
// ============================================================================

/// Generate every role with default configuration.
pub fn generate(snapshot: &SchemaSnapshot) -> EngineResult<GenerationOutput> {
    Generator::with_defaults().generate(snapshot, ArtifactRole::all())
}

// ============================================================================
// GenerationSummary: human-readable report
// ============================================================================

/// A human-readable summary of a completed generation run.
#[derive(Debug, Clone)]
pub struct GenerationSummary {
    pub database: String,
    pub tables: usize,
    pub skipped_tables: usize,
    pub models: usize,
    pub repositories: usize,
    pub controllers: usize,
    pub warning_count: usize,
    pub total_bytes: usize,
}

impl GenerationSummary {
    /// Build a summary from a snapshot and the output generated from it.
    pub fn from_output(snapshot: &SchemaSnapshot, output: &GenerationOutput) -> Self {
        let per_table = |role: ArtifactRole| {
            output
                .artifacts_for(role)
                .iter()
                .filter(|a| !a.is_support())
                .count()
        };

        Self {
            database: snapshot.database.display_name().to_string(),
            tables: snapshot.tables.len(),
            skipped_tables: snapshot.skipped.len(),
            models: per_table(ArtifactRole::Model),
            repositories: per_table(ArtifactRole::Repository),
            controllers: per_table(ArtifactRole::Controller),
            warning_count: output.warnings.len(),
            total_bytes: output.artifacts.iter().map(|a| a.content.len()).sum(),
        }
    }

    /// Format the summary as a human-readable string.
    pub fn display(&self) -> String {
        let mut out = String::with_capacity(512);

        out.push_str("╔══════════════════════════════════════════════════╗\n");
        out.push_str("║         Code Generation Complete                 ║\n");
        out.push_str("╠══════════════════════════════════════════════════╣\n");
        out.push_str(&format!("║  Database:     {:<34}║\n", self.database));
        out.push_str(&format!("║  Tables:       {:<34}║\n", self.tables));
        out.push_str(&format!("║    Skipped:    {:<34}║\n", self.skipped_tables));
        out.push_str(&format!("║  Models:       {:<34}║\n", self.models));
        out.push_str(&format!("║  Repositories: {:<34}║\n", self.repositories));
        out.push_str(&format!("║  Controllers:  {:<34}║\n", self.controllers));
        out.push_str(&format!("║  Warnings:     {:<34}║\n", self.warning_count));

        let size_str = if self.total_bytes < 1024 {
            format!("{} B", self.total_bytes)
        } else if self.total_bytes < 1024 * 1024 {
            format!("{:.1} KB", self.total_bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", self.total_bytes as f64 / (1024.0 * 1024.0))
        };
        out.push_str(&format!("║  Total Size:   {:<34}║\n", size_str));
        out.push_str("╚══════════════════════════════════════════════════╝\n");

        out
    }
}

impl std::fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Produce a [`GenerationSummary`] for a run.
pub fn summarize(snapshot: &SchemaSnapshot, output: &GenerationOutput) -> GenerationSummary {
    GenerationSummary::from_output(snapshot, output)
}

// ============================================================================
// Tests
// ============================================================================
