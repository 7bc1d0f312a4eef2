//! # Rust Emitters
//!
//! One emitter per layer. Each returns the artifacts of its role plus the
//! warnings it raised; none of them touch the filesystem.
//!
//! | Role       | Per-table file                      | Support file            |
//! |------------|-------------------------------------|-------------------------|
//! | Model      | `models/<table>.rs`                 | `models/mod.rs`         |
//! | Repository | `repositories/<table>_repository.rs`| `repositories/mod.rs`   |
//! | Controller | `controllers/<table>_controller.rs` | `controllers/mod.rs`    |

pub mod controllers;
pub mod models;
pub mod repositories;

pub use controllers::generate_controllers;
pub use models::generate_models;
pub use repositories::generate_repositories;

use proc_macro2::TokenStream;
use quote::quote;
use std::path::{Component, Path, PathBuf};

use crate::context::{GenerationContext, TableInfo};
use crate::render;
use crate::{ArtifactRole, GeneratedArtifact};

/// Artifacts and warnings of one emitter
pub type Emitted = (Vec<GeneratedArtifact>, Vec<String>);

// ============================================================================
// Paths
// ============================================================================

/// Relative path of a table's artifact for `role`
pub(crate) fn artifact_path(ctx: &GenerationContext, role: ArtifactRole, info: &TableInfo) -> PathBuf {
    ctx.generator_config
        .role_dir(role)
        .join(format!("{}.rs", info.file_stem(role)))
}

/// Relative path of a role's `mod.rs`
pub(crate) fn mod_path(ctx: &GenerationContext, role: ArtifactRole) -> PathBuf {
    ctx.generator_config.role_dir(role).join("mod.rs")
}

/// `crate::...` path of the module a role directory becomes.
///
/// A leading `src` is the crate root; every other component is a module.
pub(crate) fn module_path(ctx: &GenerationContext, role: ArtifactRole) -> TokenStream {
    let segments = module_segments(ctx.generator_config.role_dir(role));
    let idents = segments.iter().map(|s| render::ident(s));
    quote! { crate #(:: #idents)* }
}

fn module_segments(dir: &Path) -> Vec<String> {
    let mut segments: Vec<String> = dir
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if segments.first().map(String::as_str) == Some("src") {
        segments.remove(0);
    }
    segments
}

/// `pub mod a; pub mod b;` for the given module stems
pub(crate) fn module_decls(stems: &[String]) -> TokenStream {
    let idents = stems.iter().map(|s| render::ident(s));
    quote! { #(pub mod #idents;)* }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeneratorConfig;
    use crate::fixtures::order_snapshot;

    #[test]
    fn test_module_segments() {
        assert_eq!(module_segments(Path::new("src/models")), vec!["models"]);
        assert_eq!(
            module_segments(Path::new("./src/db/repositories")),
            vec!["db", "repositories"]
        );
        assert_eq!(module_segments(Path::new("api")), vec!["api"]);
    }

    #[test]
    fn test_module_path_tokens() {
        let config = GeneratorConfig::new().with_role_dir(ArtifactRole::Model, "src/db/models");
        let ctx = GenerationContext::from_snapshot(order_snapshot(), config);
        let path = module_path(&ctx, ArtifactRole::Model).to_string();
        assert_eq!(path.replace(' ', ""), "crate::db::models");
    }

    #[test]
    fn test_artifact_paths() {
        let ctx = GenerationContext::from_snapshot_default(order_snapshot());
        let info = TableInfo::new(ctx.table("item_pedido").unwrap(), &ctx);
        assert_eq!(
            artifact_path(&ctx, ArtifactRole::Repository, &info),
            PathBuf::from("src/repositories/item_pedido_repository.rs")
        );
        assert_eq!(
            mod_path(&ctx, ArtifactRole::Controller),
            PathBuf::from("src/controllers/mod.rs")
        );
    }
}
