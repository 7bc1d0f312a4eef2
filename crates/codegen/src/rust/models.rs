//! # Model Generator
//!
//! Generates one data holder and one payload record per table.
//!
//! ## Generated Files
//!
//! - `src/models/mod.rs`: module declarations, re-exports and the `field()`
//!   lookup helper the constructors share
//! - `src/models/<table>.rs`, e.g. for `pedido`:
//!   - `Pedido`: private `Option<T>` fields, `new(&Map)`, getters, setters,
//!     `sqlx::FromRow`
//!   - `PedidoData`: the structured payload with public optional fields
//!
//! Models depend on column metadata only; relationships play no part.

use fastback_core::EngineResult;
use fastback_ir::ColumnMetadata;
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use std::collections::HashSet;

use super::{Emitted, artifact_path, mod_path, module_decls};
use crate::context::{GenerationContext, TableInfo};
use crate::render::{self, doc};
use crate::{ArtifactRole, GeneratedArtifact};

// ============================================================================
// Public API
// ============================================================================

/// Generate `models/mod.rs` plus one model file per table.
pub fn generate_models(ctx: &GenerationContext) -> EngineResult<Emitted> {
    let mut artifacts = vec![generate_models_mod(ctx)?];

    let mut warnings = Vec::new();

    for table in ctx.tables() {
        let info = TableInfo::new(table, ctx);
        let (artifact, table_warnings) = generate_table_model(&info)?;
        artifacts.push(artifact);
        warnings.extend(table_warnings);
    }

    Ok((artifacts, warnings))
}

// ============================================================================
// Column fields
// ============================================================================

/// How one column appears as a Rust field
pub(crate) struct ColumnField<'a> {
    pub column: &'a ColumnMetadata,
    pub ident: Ident,
    pub ty: syn::Type,
}

impl<'a> ColumnField<'a> {
    pub fn new(info: &TableInfo, column: &'a ColumnMetadata) -> EngineResult<Self> {
        Ok(Self {
            column,
            ident: render::field_ident(&column.name),
            ty: render::rust_type(info.column_type(column))?,
        })
    }

    /// All columns of a table, in physical order
    pub fn all(info: &TableInfo<'a>) -> EngineResult<Vec<Self>> {
        info.table
            .columns
            .iter()
            .map(|c| ColumnField::new(info, c))
            .collect()
    }

    /// `#[serde(rename)]`/`#[sqlx(rename)]` when the field name differs
    pub fn rename_attrs(&self, with_sqlx: bool) -> TokenStream {
        if !render::needs_rename(&self.column.name) {
            return TokenStream::new();
        }
        let name = &self.column.name;
        if with_sqlx {
            quote! {
                #[serde(rename = #name)]
                #[sqlx(rename = #name)]
            }
        } else {
            quote! { #[serde(rename = #name)] }
        }
    }

    fn getter(&self) -> Ident {
        if self.ident == "new" {
            format_ident!("get_new")
        } else {
            self.ident.clone()
        }
    }

    fn setter(&self) -> Ident {
        format_ident!("set_{}", render::field_name(&self.column.name))
    }
}

/// Getter and setter names per field, unique within the model's impl.
///
/// A setter that clashes with another column's getter (columns `x` and
/// `set_x`) takes a `_value` suffix and is reported.
fn accessor_names(info: &TableInfo, fields: &[ColumnField]) -> (Vec<(Ident, Ident)>, Vec<String>) {
    let mut used: HashSet<String> = HashSet::from(["new".to_string()]);
    let mut warnings = Vec::new();

    let getters: Vec<Ident> = fields
        .iter()
        .map(|f| unique_ident(f.getter(), &mut used))
        .collect();

    let names = fields
        .iter()
        .zip(getters)
        .map(|(f, getter)| {
            let wanted = f.setter();
            let setter = unique_ident(wanted.clone(), &mut used);
            if setter != wanted {
                warnings.push(format!(
                    "Table '{}': setter for column '{}' renamed to '{}' ('{}' is taken).",
                    info.name(),
                    f.column.name,
                    setter,
                    wanted
                ));
            }
            (getter, setter)
        })
        .collect();

    (names, warnings)
}

fn unique_ident(wanted: Ident, used: &mut HashSet<String>) -> Ident {
    let base = wanted.to_string();
    if used.insert(base.clone()) {
        return wanted;
    }
    let base = base.trim_start_matches("r#");
    let mut n = 1;
    loop {
        let name = if n == 1 {
            format!("{}_value", base)
        } else {
            format!("{}_value{}", base, n)
        };
        if used.insert(name.clone()) {
            return render::ident(&name);
        }
        n += 1;
    }
}

// ============================================================================
// models/mod.rs
// ============================================================================

fn generate_models_mod(ctx: &GenerationContext) -> EngineResult<GeneratedArtifact> {
    let infos: Vec<TableInfo> = ctx.tables().iter().map(|t| TableInfo::new(t, ctx)).collect();
    let stems: Vec<String> = infos.iter().map(|i| i.file_stem(ArtifactRole::Model)).collect();
    let decls = module_decls(&stems);

    let reexports = infos.iter().map(|info| {
        let module = render::ident(&info.file_stem(ArtifactRole::Model));
        let model = render::ident(&info.pascal_name());
        let data = render::ident(&info.data_type_name());
        quote! { pub use #module::{#model, #data}; }
    });

    let field_doc = doc(
        ctx.generate_docs(),
        "Read `key` from a loosely-typed input. A missing key, or a value that does not deserialize into `T`, is `None`.",
    );

    let body = quote! {
        use serde::de::DeserializeOwned;
        use serde_json::{Map, Value};

        #decls

        #(#reexports)*

        #field_doc
        pub(crate) fn field<T: DeserializeOwned>(input: &Map<String, Value>, key: &str) -> Option<T> {
            input
                .get(key)
                .cloned()
                .and_then(|value| serde_json::from_value(value).ok())
        }
    };

    let path = mod_path(ctx, ArtifactRole::Model);
    let content = render::render_file(&path.to_string_lossy(), "Data holders, one per table.", body)?;
    Ok(GeneratedArtifact::support(ArtifactRole::Model, path, content))
}

// ============================================================================
// Per-table model file
// ============================================================================

fn generate_table_model(info: &TableInfo) -> EngineResult<(GeneratedArtifact, Vec<String>)> {
    let docs = info.ctx.generate_docs();
    let fields = ColumnField::all(info)?;
    let (accessor_idents, warnings) = accessor_names(info, &fields);

    let model = render::ident(&info.pascal_name());
    let data = render::ident(&info.data_type_name());

    let model_fields = fields.iter().map(|f| {
        let ident = &f.ident;
        let ty = &f.ty;
        let rename = f.rename_attrs(true);
        quote! {
            #rename
            #ident: Option<#ty>,
        }
    });

    let constructor_fields = fields.iter().map(|f| {
        let ident = &f.ident;
        let key = &f.column.name;
        quote! { #ident: super::field(input, #key), }
    });

    let accessors = fields.iter().zip(&accessor_idents).map(|(f, (getter, setter))| {
        let ident = &f.ident;
        let ty = &f.ty;
        let get_doc = doc(docs, &format!("Value of `{}`.", f.column.name));
        quote! {
            #get_doc
            pub fn #getter(&self) -> Option<&#ty> {
                self.#ident.as_ref()
            }

            pub fn #setter(&mut self, value: Option<#ty>) {
                self.#ident = value;
            }
        }
    });

    let data_fields = fields.iter().map(|f| {
        let ident = &f.ident;
        let ty = &f.ty;
        let rename = f.rename_attrs(false);
        quote! {
            #rename
            pub #ident: Option<#ty>,
        }
    });

    let model_doc = doc(docs, &format!("Row of `{}`.", info.name()));
    let new_doc = doc(
        docs,
        "Build from a loosely-typed key/value input. Missing keys stay `None`.",
    );
    let data_doc = doc(
        docs,
        &format!("Payload for writes to `{}`. Absent fields are `None`.", info.name()),
    );

    let body = quote! {
        use serde::{Deserialize, Serialize};
        use serde_json::{Map, Value};

        #model_doc
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
        pub struct #model {
            #(#model_fields)*
        }

        impl #model {
            #new_doc
            pub fn new(input: &Map<String, Value>) -> Self {
                Self {
                    #(#constructor_fields)*
                }
            }

            #(#accessors)*
        }

        #data_doc
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct #data {
            #(#data_fields)*
        }
    };

    let path = artifact_path(info.ctx, ArtifactRole::Model, info);
    let summary = format!("Model for table `{}`.", info.name());
    let content = render::render_file(&path.to_string_lossy(), &summary, body)?;
    let artifact = GeneratedArtifact::for_table(ArtifactRole::Model, info.name(), path, content);
    Ok((artifact, warnings))
}

// ============================================================================
// Tests
// ============================================================================
