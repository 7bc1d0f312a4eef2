//! # Fastback Codegen
//!
//! Code generation engine for Fastback.
//!
//! This crate turns a `SchemaSnapshot` into Rust source artifacts for an
//! axum + sqlx backend.
//!
//! ## Features
//!
//! - **Model Generation**: one data holder and one payload record per table
//! - **Repository Generation**: parameterized CRUD plus transactional
//!   master-detail operations for master tables
//! - **Controller Generation**: axum routers whose bindings are inferred from
//!   each repository's operation names
//! - **Stale Artifact Detection**: artifacts of tables no longer in the
//!   schema are reported, and pruned on request
//!

// ============================================================================
// Modules
// ============================================================================

pub mod context;
pub mod generator;
pub mod plan;
pub mod render;
pub mod rust;

// ============================================================================
// Re-exports
// ============================================================================

pub use context::{DetailInfo, GenerationContext, TableInfo};
pub use generator::{GenerationSummary, Generator, generate, summarize};
pub use plan::{ControllerPlan, HttpMethod, OperationKind, RepositoryPlan, Statement};

use fastback_core::{EngineError, EngineResult, Validatable};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

// ============================================================================
// GeneratorConfig
// ============================================================================

/// Configuration for the code generator
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Output root for generated code
    pub output_dir: PathBuf,

    /// Model directory, relative to the output root
    pub models_dir: PathBuf,

    /// Repository directory, relative to the output root
    pub repositories_dir: PathBuf,

    /// Controller directory, relative to the output root
    pub controllers_dir: PathBuf,

    /// Whether to generate documentation comments
    pub generate_docs: bool,

    /// Whether to delete artifacts of tables no longer in the schema
    pub prune_stale: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            models_dir: PathBuf::from("src/models"),
            repositories_dir: PathBuf::from("src/repositories"),
            controllers_dir: PathBuf::from("src/controllers"),
            generate_docs: true,
            prune_stale: false,
        }
    }
}

impl GeneratorConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the directory of one role
    pub fn with_role_dir(mut self, role: ArtifactRole, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        match role {
            ArtifactRole::Model => self.models_dir = dir,
            ArtifactRole::Repository => self.repositories_dir = dir,
            ArtifactRole::Controller => self.controllers_dir = dir,
        }
        self
    }

    /// Disable documentation generation
    pub fn without_docs(mut self) -> Self {
        self.generate_docs = false;
        self
    }

    /// Delete stale artifacts when writing
    pub fn with_prune_stale(mut self, prune: bool) -> Self {
        self.prune_stale = prune;
        self
    }

    /// Directory of a role, relative to the output root
    pub fn role_dir(&self, role: ArtifactRole) -> &Path {
        match role {
            ArtifactRole::Model => &self.models_dir,
            ArtifactRole::Repository => &self.repositories_dir,
            ArtifactRole::Controller => &self.controllers_dir,
        }
    }
}

impl Validatable for GeneratorConfig {
    fn validate(&self) -> EngineResult<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(EngineError::InvalidOutputPath(self.output_dir.clone()));
        }

        let mut seen = BTreeSet::new();
        for role in ArtifactRole::all() {
            let dir = self.role_dir(*role);
            if dir.as_os_str().is_empty() {
                return Err(EngineError::InvalidConfig(format!(
                    "{} directory is empty",
                    role.as_str()
                )));
            }
            let escapes = dir
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
            if escapes {
                return Err(EngineError::InvalidOutputPath(dir.to_path_buf()));
            }
            if !seen.insert(dir.to_path_buf()) {
                return Err(EngineError::InvalidConfig(format!(
                    "{} directory '{}' is shared with another role",
                    role.as_str(),
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// ArtifactRole
// ============================================================================

/// The layer an artifact belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ArtifactRole {
    Model,
    Repository,
    Controller,
}

impl ArtifactRole {
    /// Suffix appended to the Pascal table name
    pub fn suffix(&self) -> &'static str {
        match self {
            ArtifactRole::Model => "",
            ArtifactRole::Repository => "Repository",
            ArtifactRole::Controller => "Controller",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactRole::Model => "model",
            ArtifactRole::Repository => "repository",
            ArtifactRole::Controller => "controller",
        }
    }

    /// All roles, in pipeline order
    pub fn all() -> &'static [ArtifactRole] {
        &[
            ArtifactRole::Model,
            ArtifactRole::Repository,
            ArtifactRole::Controller,
        ]
    }
}

impl std::fmt::Display for ArtifactRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// GeneratedArtifact
// ============================================================================

/// One emitted source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub role: ArtifactRole,

    /// Target table; `None` for the per-role `mod.rs`
    pub table: Option<String>,

    /// Path relative to the output root
    pub path: PathBuf,

    pub content: String,
}

impl GeneratedArtifact {
    /// Create an artifact for a table
    pub fn for_table(
        role: ArtifactRole,
        table: impl Into<String>,
        path: impl Into<PathBuf>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role,
            table: Some(table.into()),
            path: path.into(),
            content: content.into(),
        }
    }

    /// Create a support artifact
    pub fn support(role: ArtifactRole, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            role,
            table: None,
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn is_support(&self) -> bool {
        self.table.is_none()
    }
}

// ============================================================================
// GenerationOutput
// ============================================================================

/// Everything one generation run produced
#[derive(Debug, Clone, Default)]
pub struct GenerationOutput {
    pub artifacts: Vec<GeneratedArtifact>,

    /// Non-fatal problems found while generating
    pub warnings: Vec<String>,

    /// Roles generated in this run, with their relative directories
    pub role_dirs: Vec<(ArtifactRole, PathBuf)>,

    /// Crates the generated code needs beyond axum, serde and sqlx
    pub required_crates: BTreeSet<&'static str>,
}

/// Paths touched by `write_to_disk`
#[derive(Debug, Clone, Default)]
pub struct WriteReport {
    pub written: Vec<PathBuf>,
    /// Artifacts left behind by tables no longer in the schema
    pub stale: Vec<PathBuf>,
    pub pruned: Vec<PathBuf>,
}

impl GenerationOutput {
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn file_count(&self) -> usize {
        self.artifacts.len()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Artifacts of one role
    pub fn artifacts_for(&self, role: ArtifactRole) -> Vec<&GeneratedArtifact> {
        self.artifacts.iter().filter(|a| a.role == role).collect()
    }

    /// Look up an artifact by relative path
    pub fn artifact(&self, path: impl AsRef<Path>) -> Option<&GeneratedArtifact> {
        self.artifacts.iter().find(|a| a.path == path.as_ref())
    }

    /// `.rs` files in the generated role directories that this run did not
    /// produce.
    pub fn stale_files(&self, base_dir: impl AsRef<Path>) -> Vec<PathBuf> {
        let base_dir = base_dir.as_ref();
        let produced: BTreeSet<PathBuf> =
            self.artifacts.iter().map(|a| base_dir.join(&a.path)).collect();

        let mut stale = Vec::new();
        for (_, dir) in &self.role_dirs {
            let dir = base_dir.join(dir);
            if !dir.is_dir() {
                continue;
            }
            for entry in WalkDir::new(&dir)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
            {
                let path = entry.path();
                let is_source = entry.file_type().is_file()
                    && path.extension().is_some_and(|ext| ext == "rs");
                if is_source && !produced.contains(path) {
                    stale.push(path.to_path_buf());
                }
            }
        }
        stale
    }

    /// Write every artifact under `base_dir`, overwriting what is there.
    ///
    /// Stale artifacts are reported and, when `prune` is set, removed.
    pub fn write_to_disk(&self, base_dir: impl AsRef<Path>, prune: bool) -> EngineResult<WriteReport> {
        let base_dir = base_dir.as_ref();
        let mut report = WriteReport::default();

        for artifact in &self.artifacts {
            let full_path = base_dir.join(&artifact.path);

            if let Some(parent) = full_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| EngineError::DirectoryCreate {
                    path: parent.to_path_buf(),
                    message: e.to_string(),
                })?;
            }

            std::fs::write(&full_path, &artifact.content).map_err(|e| EngineError::FileWrite {
                path: full_path.clone(),
                message: e.to_string(),
            })?;

            tracing::info!(
                role = %artifact.role,
                path = %full_path.display(),
                "artifact written"
            );
            report.written.push(full_path);
        }

        report.stale = self.stale_files(base_dir);
        for path in &report.stale {
            if prune {
                std::fs::remove_file(path).map_err(|e| EngineError::FileRemove {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                tracing::info!(path = %path.display(), "stale artifact removed");
                report.pruned.push(path.clone());
            } else {
                tracing::warn!(
                    path = %path.display(),
                    "stale artifact left in place; its table is no longer in the schema"
                );
            }
        }

        Ok(report)
    }
}

// ============================================================================
// Test fixtures
// ============================================================================


// ============================================================================
// Tests
// ============================================================================
