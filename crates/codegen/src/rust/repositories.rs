//! # Repository Generator (sqlx)
//!
//! Generates one data-access type per keyed table from its
//! [`RepositoryPlan`]. Every statement in the emitted code is the plan's
//! `Statement` text, bound in the plan's order.
//!
//! ## Generated Files
//!
//! - `src/repositories/mod.rs`: module declarations, the `Db`/`Pool` aliases
//!   for the dialect, `RepositoryError` and `RepositoryResult`
//! - `src/repositories/<table>_repository.rs`
//!
//! ## Operations
//!
//! | Operation            | Signature |
//! |----------------------|-----------|
//! | `find_all`           | `async fn find_all(&self) -> RepositoryResult<Vec<Model>>` |
//! | `find_by_id`         | `async fn find_by_id(&self, id) -> RepositoryResult<Option<Model>>` |
//! | `create`             | `async fn create(&self, &Data) -> RepositoryResult<bool>` |
//! | `update`             | `async fn update(&self, id, &Data) -> RepositoryResult<bool>` |
//! | `delete`             | `async fn delete(&self, id) -> RepositoryResult<bool>` |
//! | `find_with_details`  | `async fn find_with_details(&self, id) -> RepositoryResult<Option<ModelWithDetails>>` |
//! | `save_master_detail` | `async fn save_master_detail(&self, &Data, &ModelDetails) -> RepositoryResult<bool>` |
//! | `update_detail`      | `async fn update_detail(&self, i64, &ModelDetailData) -> RepositoryResult<bool>` |
//! | `delete_detail`      | `async fn delete_detail(&self, i64, ModelDetailTable) -> RepositoryResult<bool>` |
//!
//! The last four exist only for master tables.

use fastback_core::{DataType, DatabaseType, EngineError, EngineResult};
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use std::collections::BTreeSet;

use super::{Emitted, artifact_path, mod_path, module_decls, module_path};
use crate::context::{DetailInfo, GenerationContext, TableInfo};
use crate::plan::{Bind, DetailPlan, MasterDetailPlan, RepositoryPlan, Statement};
use crate::render::{self, doc};
use crate::{ArtifactRole, GeneratedArtifact};

// ============================================================================
// Public API
// ============================================================================

/// Generate `repositories/mod.rs` plus one repository per keyed table.
///
/// Tables without an integer `id` are reported and left out.
pub fn generate_repositories(ctx: &GenerationContext) -> EngineResult<Emitted> {
    let mut warnings = Vec::new();
    let mut artifacts = Vec::new();
    let mut stems = Vec::new();
    let mut types = Vec::new();

    for table in ctx.tables() {
        let info = TableInfo::new(table, ctx);
        if info.id_type().is_none() {
            let warning = format!(
                "Table '{}' has no integer 'id' column; no repository generated.",
                info.name()
            );
            tracing::warn!(table = info.name(), "{}", warning);
            warnings.push(warning);
            continue;
        }

        let (details, detail_warnings) = info.details();
        for warning in &detail_warnings {
            tracing::warn!(table = info.name(), "{}", warning);
        }
        warnings.extend(detail_warnings);

        let plan = RepositoryPlan::build(&info, &details);
        artifacts.push(generate_table_repository(&info, &details, &plan)?);
        stems.push(info.file_stem(ArtifactRole::Repository));
        types.push((stems[stems.len() - 1].clone(), plan.type_name.clone()));
    }

    artifacts.insert(0, generate_repositories_mod(ctx, &stems, &types)?);
    Ok((artifacts, warnings))
}

/// `sqlx` database type of a dialect
pub(crate) fn db_type(db: DatabaseType) -> TokenStream {
    match db {
        DatabaseType::PostgreSQL => quote! { sqlx::Postgres },
        DatabaseType::MySQL => quote! { sqlx::MySql },
        DatabaseType::SQLite => quote! { sqlx::Sqlite },
    }
}

/// Rust type of a keyed table's `id`
pub(crate) fn id_type(info: &TableInfo) -> EngineResult<syn::Type> {
    let data_type = info.id_type().ok_or_else(|| {
        EngineError::codegen(format!("table '{}' has no integer id", info.name()))
    })?;
    render::rust_type(data_type)
}

// ============================================================================
// repositories/mod.rs
// ============================================================================

fn generate_repositories_mod(
    ctx: &GenerationContext,
    stems: &[String],
    types: &[(String, String)],
) -> EngineResult<GeneratedArtifact> {
    let docs = ctx.generate_docs();
    let decls = module_decls(stems);
    let reexports = types.iter().map(|(stem, ty)| {
        let module = render::ident(stem);
        let ty = render::ident(ty);
        quote! { pub use #module::#ty; }
    });
    let db = db_type(ctx.database());

    let db_doc = doc(docs, &format!("Driver of the {} schema.", ctx.database()));
    let pool_doc = doc(docs, "Connection pool handed to every repository.");
    let error_doc = doc(
        docs,
        "Structured failure of a data-access operation. `success` is always `false`.",
    );

    let body = quote! {
        use serde::Serialize;

        #decls

        #(#reexports)*

        #db_doc
        pub type Db = #db;

        #pool_doc
        pub type Pool = sqlx::Pool<Db>;

        #error_doc
        #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
        pub struct RepositoryError {
            pub success: bool,
            pub message: String,
            pub code: String,
        }

        impl RepositoryError {
            pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
                Self {
                    success: false,
                    message: message.into(),
                    code: code.into(),
                }
            }
        }

        impl From<sqlx::Error> for RepositoryError {
            fn from(error: sqlx::Error) -> Self {
                let code = match &error {
                    sqlx::Error::Database(db) => db
                        .code()
                        .map(|code| code.into_owned())
                        .unwrap_or_else(|| "database".to_string()),
                    sqlx::Error::RowNotFound => "row_not_found".to_string(),
                    sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => "decode".to_string(),
                    sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => "pool".to_string(),
                    sqlx::Error::Io(_) | sqlx::Error::Tls(_) => "connection".to_string(),
                    _ => "data_access".to_string(),
                };
                Self::new(code, error.to_string())
            }
        }

        impl std::fmt::Display for RepositoryError {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{} ({})", self.message, self.code)
            }
        }

        impl std::error::Error for RepositoryError {}

        pub type RepositoryResult<T> = Result<T, RepositoryError>;
    };

    let path = mod_path(ctx, ArtifactRole::Repository);
    let content = render::render_file(
        &path.to_string_lossy(),
        "Data-access objects, one per keyed table.",
        body,
    )?;
    Ok(GeneratedArtifact::support(ArtifactRole::Repository, path, content))
}

// ============================================================================
// Statement helpers
// ============================================================================

fn sql_const(name: &Ident, statement: &Statement) -> TokenStream {
    let sql = &statement.sql;
    quote! { const #name: &str = #sql; }
}

/// `.bind(..)` calls in placeholder order; `data` names the payload
fn binds(statement: &Statement, data: &TokenStream) -> TokenStream {
    let calls = statement.binds.iter().map(|bind| match bind {
        Bind::Field(column) => {
            let field = render::field_ident(column);
            quote! { .bind(#data.#field.clone()) }
        }
        Bind::Id => quote! { .bind(id) },
        Bind::MasterId => quote! { .bind(master_id) },
        Bind::DetailId => quote! { .bind(detail_id) },
    });
    quote! { #(#calls)* }
}

fn detail_const(prefix: &str, detail: &DetailPlan) -> Ident {
    format_ident!("{}_{}_SQL", prefix, detail.field.to_uppercase())
}

// ============================================================================
// Per-table repository
// ============================================================================

fn generate_table_repository(
    info: &TableInfo,
    details: &[DetailInfo],
    plan: &RepositoryPlan,
) -> EngineResult<GeneratedArtifact> {
    let ctx = info.ctx;
    let docs = ctx.generate_docs();
    let models = module_path(ctx, ArtifactRole::Model);

    let repo = render::ident(&plan.type_name);
    let model = render::ident(&info.pascal_name());
    let data = render::ident(&info.data_type_name());
    let id_ty = id_type(info)?;
    let payload = quote! { data };

    // Model imports, deduplicated for self-referencing tables
    let mut imported = BTreeSet::new();
    imported.insert(info.pascal_name());
    imported.insert(info.data_type_name());
    for detail in details {
        imported.insert(detail.table.pascal_name());
        imported.insert(detail.table.data_type_name());
    }
    let imports = imported.iter().map(|name| render::ident(name));

    let consts = [
        ("FIND_ALL_SQL", &plan.find_all),
        ("FIND_BY_ID_SQL", &plan.find_by_id),
        ("CREATE_SQL", &plan.create),
        ("UPDATE_SQL", &plan.update),
        ("DELETE_SQL", &plan.delete),
    ]
    .into_iter()
    .map(|(name, stmt)| sql_const(&format_ident!("{}", name), stmt))
    .collect::<Vec<_>>();

    let find_by_id_binds = binds(&plan.find_by_id, &payload);
    let create_binds = binds(&plan.create, &payload);
    let update_binds = binds(&plan.update, &payload);
    let delete_binds = binds(&plan.delete, &payload);

    let struct_doc = doc(docs, &format!("Data access for `{}`.", info.name()));
    let find_all_doc = doc(docs, "Every row, ordered by `id`. Empty when the table is empty.");
    let find_by_id_doc = doc(docs, "The row with this `id`, or `None`.");
    let create_doc = doc(
        docs,
        "Insert one row. Columns absent from the payload are written as NULL.",
    );
    let update_doc = doc(docs, "Set every non-key column of the row. `true` when a row changed.");
    let delete_doc = doc(docs, "Delete the row. `true` when a row was removed.");

    let (master_items, master_methods) = match &plan.master_detail {
        Some(md) => master_detail_code(info, details, md, &id_ty)?,
        None => (TokenStream::new(), TokenStream::new()),
    };
    let serde_import = if plan.is_master() {
        quote! { use serde::{Deserialize, Serialize}; }
    } else {
        TokenStream::new()
    };

    let body = quote! {
        #serde_import

        use super::{Pool, RepositoryResult};
        use #models::{#(#imports),*};

        #(#consts)*

        #struct_doc
        #[derive(Debug, Clone)]
        pub struct #repo {
            pool: Pool,
        }

        impl #repo {
            pub fn new(pool: Pool) -> Self {
                Self { pool }
            }

            #find_all_doc
            pub async fn find_all(&self) -> RepositoryResult<Vec<#model>> {
                let rows = sqlx::query_as::<_, #model>(FIND_ALL_SQL)
                    .fetch_all(&self.pool)
                    .await?;
                Ok(rows)
            }

            #find_by_id_doc
            pub async fn find_by_id(&self, id: #id_ty) -> RepositoryResult<Option<#model>> {
                let row = sqlx::query_as::<_, #model>(FIND_BY_ID_SQL)
                    #find_by_id_binds
                    .fetch_optional(&self.pool)
                    .await?;
                Ok(row)
            }

            #create_doc
            pub async fn create(&self, data: &#data) -> RepositoryResult<bool> {
                sqlx::query(CREATE_SQL)
                    #create_binds
                    .execute(&self.pool)
                    .await?;
                Ok(true)
            }

            #update_doc
            pub async fn update(&self, id: #id_ty, data: &#data) -> RepositoryResult<bool> {
                let result = sqlx::query(UPDATE_SQL)
                    #update_binds
                    .execute(&self.pool)
                    .await?;
                Ok(result.rows_affected() > 0)
            }

            #delete_doc
            pub async fn delete(&self, id: #id_ty) -> RepositoryResult<bool> {
                let result = sqlx::query(DELETE_SQL)
                    #delete_binds
                    .execute(&self.pool)
                    .await?;
                Ok(result.rows_affected() > 0)
            }

            #master_methods
        }

        #master_items
    };

    let path = artifact_path(ctx, ArtifactRole::Repository, info);
    let summary = format!("Repository for table `{}`.", info.name());
    let content = render::render_file(&path.to_string_lossy(), &summary, body)?;
    Ok(GeneratedArtifact::for_table(
        ArtifactRole::Repository,
        info.name(),
        path,
        content,
    ))
}

// ============================================================================
// Master-detail
// ============================================================================

/// Supporting types and consts, then the four master-detail methods
fn master_detail_code(
    info: &TableInfo,
    details: &[DetailInfo],
    md: &MasterDetailPlan,
    id_ty: &syn::Type,
) -> EngineResult<(TokenStream, TokenStream)> {
    let docs = info.ctx.generate_docs();
    let db = info.ctx.database();
    let pascal = info.pascal_name();

    let model = render::ident(&pascal);
    let data = render::ident(&info.data_type_name());
    let details_ty = render::ident(&format!("{}Details", pascal));
    let with_details = render::ident(&format!("{}WithDetails", pascal));
    let master_detail = render::ident(&format!("{}MasterDetail", pascal));
    let detail_data = render::ident(&format!("{}DetailData", pascal));
    let detail_table = render::ident(&format!("{}DetailTable", pascal));
    let payload = quote! { data };
    let master_payload = quote! { master };

    // Every DetailPlan pairs with the DetailInfo it was built from
    let pairs: Vec<(&DetailInfo, &DetailPlan)> = details.iter().zip(md.details.iter()).collect();

    let fields: Vec<Ident> = pairs.iter().map(|(d, _)| render::field_ident(&d.field)).collect();
    let keys: Vec<&str> = pairs.iter().map(|(d, _)| d.key.as_str()).collect();
    let variants: Vec<Ident> = pairs.iter().map(|(d, _)| render::ident(&d.variant())).collect();
    let detail_models: Vec<Ident> = pairs
        .iter()
        .map(|(d, _)| render::ident(&d.table.pascal_name()))
        .collect();
    let detail_datas: Vec<Ident> = pairs
        .iter()
        .map(|(d, _)| render::ident(&d.table.data_type_name()))
        .collect();

    let select_consts: Vec<Ident> = md.details.iter().map(|p| detail_const("SELECT", p)).collect();
    let insert_consts: Vec<Ident> = md.details.iter().map(|p| detail_const("INSERT", p)).collect();
    let update_consts: Vec<Ident> = md.details.iter().map(|p| detail_const("UPDATE", p)).collect();
    let delete_consts: Vec<Ident> = md.details.iter().map(|p| detail_const("DELETE", p)).collect();

    let mut consts = vec![sql_const(&format_ident!("INSERT_MASTER_SQL"), &md.insert_master)];
    for (i, plan) in md.details.iter().enumerate() {
        consts.push(sql_const(&select_consts[i], &plan.select_by_master));
        consts.push(sql_const(&insert_consts[i], &plan.insert));
        consts.push(sql_const(&update_consts[i], &plan.update));
        consts.push(sql_const(&delete_consts[i], &plan.delete));
    }

    let select_binds: Vec<TokenStream> = md
        .details
        .iter()
        .map(|p| binds(&p.select_by_master, &payload))
        .collect();
    let insert_binds: Vec<TokenStream> = md.details.iter().map(|p| binds(&p.insert, &payload)).collect();
    let update_binds: Vec<TokenStream> = md.details.iter().map(|p| binds(&p.update, &payload)).collect();
    let update_master_binds = binds(&md.update_master, &master_payload);
    let insert_master_binds = binds(&md.insert_master, &master_payload);

    let capture = capture_master_id(db, info, id_ty, &insert_master_binds)?;

    let (Some(first_key), Some(first_variant)) = (keys.first(), variants.first()) else {
        return Err(EngineError::codegen(format!(
            "master '{}' has no detail sets",
            info.name()
        )));
    };
    let rest_keys = &keys[1..];
    let rest_variants = &variants[1..];

    let details_doc = doc(docs, "Detail rows supplied with a master record.");
    let body_doc = doc(docs, "Request body of `save_master_detail`.");
    let with_doc = doc(docs, "A master row with every detail set embedded.");
    let data_doc = doc(docs, "One detail row update, tagged with its detail set.");
    let table_doc = doc(docs, "Selects the detail table of a `delete_detail` call.");

    let items = quote! {
        #(#consts)*

        #details_doc
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct #details_ty {
            #(
                #[serde(rename = #keys)]
                pub #fields: Vec<#detail_datas>,
            )*
        }

        #body_doc
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct #master_detail {
            pub master: #data,
            pub details: #details_ty,
        }

        #with_doc
        #[derive(Debug, Clone, PartialEq, Serialize)]
        pub struct #with_details {
            #[serde(flatten)]
            pub master: #model,
            #(
                #[serde(rename = #keys)]
                pub #fields: Vec<#detail_models>,
            )*
        }

        #data_doc
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "detail", content = "data")]
        pub enum #detail_data {
            #(
                #[serde(rename = #keys)]
                #variants(#detail_datas),
            )*
        }

        #table_doc
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub enum #detail_table {
            #[default]
            #[serde(rename = #first_key)]
            #first_variant,
            #(
                #[serde(rename = #rest_keys)]
                #rest_variants,
            )*
        }
    };

    let with_details_doc = doc(
        docs,
        "The master row plus all of its detail rows, or `None` when the master is absent.",
    );
    let save_doc = doc(
        docs,
        "Insert or update the master, then insert every detail row, in one transaction. Any failure rolls everything back.",
    );
    let update_detail_doc = doc(
        docs,
        "Update one detail row by its own id. The foreign key is left untouched.",
    );
    let delete_detail_doc = doc(docs, "Delete one detail row by its own id.");

    let methods = quote! {
        #with_details_doc
        pub async fn find_with_details(&self, id: #id_ty) -> RepositoryResult<Option<#with_details>> {
            let Some(master) = self.find_by_id(id).await? else {
                return Ok(None);
            };
            #(
                let #fields = sqlx::query_as::<_, #detail_models>(#select_consts)
                    #select_binds
                    .fetch_all(&self.pool)
                    .await?;
            )*
            Ok(Some(#with_details {
                master,
                #(#fields,)*
            }))
        }

        #save_doc
        pub async fn save_master_detail(
            &self,
            master: &#data,
            details: &#details_ty,
        ) -> RepositoryResult<bool> {
            let mut tx = self.pool.begin().await?;
            match Self::write_master_detail(&mut tx, master, details).await {
                Ok(()) => {
                    tx.commit().await?;
                    Ok(true)
                }
                Err(error) => {
                    tx.rollback().await.ok();
                    Err(error)
                }
            }
        }

        async fn write_master_detail(
            tx: &mut sqlx::Transaction<'_, super::Db>,
            master: &#data,
            details: &#details_ty,
        ) -> RepositoryResult<()> {
            let master_id: #id_ty = match master.id {
                Some(id) if id != 0 => {
                    sqlx::query(UPDATE_SQL)
                        #update_master_binds
                        .execute(&mut **tx)
                        .await?;
                    id
                }
                _ => {
                    #capture
                }
            };
            #(
                for data in &details.#fields {
                    sqlx::query(#insert_consts)
                        #insert_binds
                        .execute(&mut **tx)
                        .await?;
                }
            )*
            Ok(())
        }

        #update_detail_doc
        pub async fn update_detail(&self, detail_id: i64, data: &#detail_data) -> RepositoryResult<bool> {
            let result = match data {
                #(
                    #detail_data::#variants(data) => sqlx::query(#update_consts)
                        #update_binds
                        .execute(&self.pool)
                        .await?,
                )*
            };
            Ok(result.rows_affected() > 0)
        }

        #delete_detail_doc
        pub async fn delete_detail(&self, detail_id: i64, table: #detail_table) -> RepositoryResult<bool> {
            let sql = match table {
                #(#detail_table::#variants => #delete_consts,)*
            };
            let result = sqlx::query(sql).bind(detail_id).execute(&self.pool).await?;
            Ok(result.rows_affected() > 0)
        }
    };

    Ok((items, methods))
}

/// Expression yielding the id of a freshly inserted master row
fn capture_master_id(
    db: DatabaseType,
    info: &TableInfo,
    id_ty: &syn::Type,
    insert_binds: &TokenStream,
) -> EngineResult<TokenStream> {
    let convert = |raw: TokenStream| {
        quote! {
            #id_ty::try_from(#raw)
                .map_err(|e| super::RepositoryError::new("master_id", e.to_string()))?
        }
    };
    Ok(match db {
        DatabaseType::PostgreSQL => quote! {
            sqlx::query_scalar::<_, #id_ty>(INSERT_MASTER_SQL)
                #insert_binds
                .fetch_one(&mut **tx)
                .await?
        },
        DatabaseType::SQLite => {
            let id = if info.id_type() == Some(DataType::Int64) {
                quote! { result.last_insert_rowid() }
            } else {
                convert(quote! { result.last_insert_rowid() })
            };
            quote! {
                let result = sqlx::query(INSERT_MASTER_SQL)
                    #insert_binds
                    .execute(&mut **tx)
                    .await?;
                #id
            }
        }
        DatabaseType::MySQL => {
            let id = if info.id_type() == Some(DataType::UInt64) {
                quote! { result.last_insert_id() }
            } else {
                convert(quote! { result.last_insert_id() })
            };
            quote! {
                let result = sqlx::query(INSERT_MASTER_SQL)
                    #insert_binds
                    .execute(&mut **tx)
                    .await?;
                #id
            }
        }
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{log_table, mysql_unsigned_snapshot, order_snapshot};
    use fastback_ir::{ColumnMetadata, ForeignKeyConstraint, TableMetadata};
    use pretty_assertions::assert_eq;

    fn artifact<'a>(output: &'a Emitted, path: &str) -> &'a GeneratedArtifact {
        output
            .0
            .iter()
            .find(|a| a.path.to_string_lossy() == path)
            .unwrap()
    }

    fn method_names(content: &str, type_name: &str) -> Vec<String> {
        let file = syn::parse_file(content).unwrap();
        file.items
            .iter()
            .filter_map(|item| match item {
                syn::Item::Impl(imp) => Some(imp),
                _ => None,
            })
            .filter(|imp| match imp.self_ty.as_ref() {
                syn::Type::Path(p) => p.path.is_ident(type_name),
                _ => false,
            })
            .flat_map(|imp| imp.items.iter())
            .filter_map(|item| match item {
                syn::ImplItem::Fn(f) => Some(f.sig.ident.to_string()),
                _ => None,
            })
            .collect()
    }

    fn item_names(content: &str) -> Vec<String> {
        let file = syn::parse_file(content).unwrap();
        file.items
            .iter()
            .filter_map(|item| match item {
                syn::Item::Struct(s) => Some(s.ident.to_string()),
                syn::Item::Enum(e) => Some(e.ident.to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_master_repository_has_detail_operations() {
        let ctx = GenerationContext::from_snapshot_default(order_snapshot());
        let output = generate_repositories(&ctx).unwrap();
        let repo = artifact(&output, "src/repositories/pedido_repository.rs");

        assert_eq!(
            method_names(&repo.content, "PedidoRepository"),
            vec![
                "new",
                "find_all",
                "find_by_id",
                "create",
                "update",
                "delete",
                "find_with_details",
                "save_master_detail",
                "write_master_detail",
                "update_detail",
                "delete_detail",
            ]
        );
        assert_eq!(
            item_names(&repo.content),
            vec![
                "PedidoRepository",
                "PedidoDetails",
                "PedidoMasterDetail",
                "PedidoWithDetails",
                "PedidoDetailData",
                "PedidoDetailTable",
            ]
        );
    }

    #[test]
    fn test_detail_repository_is_plain() {
        let ctx = GenerationContext::from_snapshot_default(order_snapshot());
        let output = generate_repositories(&ctx).unwrap();
        let repo = artifact(&output, "src/repositories/item_pedido_repository.rs");

        let methods = method_names(&repo.content, "ItemPedidoRepository");
        assert_eq!(methods.len(), 6);
        assert!(!repo.content.contains("save_master_detail"));
        assert!(!repo.content.contains("use serde"));
    }

    #[test]
    fn test_statements_embedded_verbatim() {
        let ctx = GenerationContext::from_snapshot_default(order_snapshot());
        let output = generate_repositories(&ctx).unwrap();
        let repo = artifact(&output, "src/repositories/pedido_repository.rs");

        assert!(repo.content.contains(
            r#"const INSERT_ITEM_PEDIDO_SQL: &str = "INSERT INTO \"item_pedido\" (\"pedido_id\", \"produto\") VALUES (?, ?)";"#
        ));
        assert!(repo.content.contains(".bind(master_id)"));
        assert!(repo.content.contains("result.last_insert_rowid()"));
        assert!(repo.content.contains("tx.rollback().await.ok();"));
    }

    #[test]
    fn test_detail_keys_are_camel_case() {
        let ctx = GenerationContext::from_snapshot_default(order_snapshot());
        let output = generate_repositories(&ctx).unwrap();
        let repo = artifact(&output, "src/repositories/pedido_repository.rs");
        assert!(repo.content.contains("#[serde(rename = \"itemPedido\")]"));
        assert!(repo.content.contains("#[serde(tag = \"detail\", content = \"data\")]"));
    }

    #[test]
    fn test_postgres_captures_id_with_returning() {
        let mut snap = order_snapshot();
        snap.database = DatabaseType::PostgreSQL;
        let ctx = GenerationContext::from_snapshot_default(snap);
        let output = generate_repositories(&ctx).unwrap();
        let repo = artifact(&output, "src/repositories/pedido_repository.rs");

        assert!(repo.content.contains("sqlx::query_scalar::<_, i32>(INSERT_MASTER_SQL)"));
        assert!(repo.content.contains("RETURNING \\\"id\\\""));
        assert!(repo.content.contains("pub async fn find_by_id(&self, id: i32)"));
        let module = &output.0[0].content;
        assert!(module.contains("pub type Db = sqlx::Postgres;"));
    }

    #[test]
    fn test_mysql_converts_last_insert_id() {
        let mut snap = order_snapshot();
        snap.database = DatabaseType::MySQL;
        let ctx = GenerationContext::from_snapshot_default(snap);
        let output = generate_repositories(&ctx).unwrap();
        let repo = artifact(&output, "src/repositories/pedido_repository.rs");
        assert!(repo.content.contains("i32::try_from(result.last_insert_id())"));
        assert!(repo.content.contains("`item_pedido`"));
    }

    #[test]
    fn test_mysql_unsigned_ids() {
        let ctx = GenerationContext::from_snapshot_default(mysql_unsigned_snapshot("int unsigned"));
        let output = generate_repositories(&ctx).unwrap();
        let repo = artifact(&output, "src/repositories/pedido_repository.rs");
        assert!(repo.content.contains("pub async fn find_by_id(&self, id: u32)"));
        assert!(repo.content.contains("u32::try_from(result.last_insert_id())"));
        assert!(!repo.content.contains("i32"));

        let ctx =
            GenerationContext::from_snapshot_default(mysql_unsigned_snapshot("bigint(20) unsigned"));
        let output = generate_repositories(&ctx).unwrap();
        let repo = artifact(&output, "src/repositories/pedido_repository.rs");
        assert!(repo.content.contains("pub async fn find_by_id(&self, id: u64)"));
        assert!(!repo.content.contains("try_from"));
    }

    #[test]
    fn test_keyless_table_skipped_with_warning() {
        let mut snap = order_snapshot();
        snap.tables.push(log_table());
        let ctx = GenerationContext::from_snapshot_default(snap);
        let (artifacts, warnings) = generate_repositories(&ctx).unwrap();

        assert_eq!(artifacts.len(), 3);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("log_acesso"));
    }

    #[test]
    fn test_two_detail_sets_get_all_variants() {
        let mut snap = order_snapshot();
        snap.tables.push(
            TableMetadata::new("pagamentos")
                .with_column(ColumnMetadata::new("id", "INTEGER"))
                .with_column(ColumnMetadata::new("pedido_id", "INTEGER"))
                .with_column(ColumnMetadata::new("valor", "REAL")),
        );
        snap.constraints.push(ForeignKeyConstraint::new(
            "fk_pag",
            "pagamentos",
            "pedido_id",
            "pedido",
        ));
        let ctx = GenerationContext::from_snapshot_default(snap);
        let output = generate_repositories(&ctx).unwrap();
        let repo = artifact(&output, "src/repositories/pedido_repository.rs");

        assert!(repo.content.contains("#[serde(rename = \"pagamento\")]"));
        assert!(repo.content.contains("PedidoDetailTable::Pagamento => DELETE_PAGAMENTO_SQL"));
        assert!(repo.content.contains("PedidoDetailTable::ItemPedido => DELETE_ITEM_PEDIDO_SQL"));
        let file = syn::parse_file(&repo.content).unwrap();
        let table_enum = file
            .items
            .iter()
            .find_map(|item| match item {
                syn::Item::Enum(e) if e.ident == "PedidoDetailTable" => Some(e),
                _ => None,
            })
            .unwrap();
        assert_eq!(table_enum.variants.len(), 2);
    }

    #[test]
    fn test_mod_holds_error_contract() {
        let ctx = GenerationContext::from_snapshot_default(order_snapshot());
        let output = generate_repositories(&ctx).unwrap();
        let module = &output.0[0];
        assert!(module.is_support());
        assert!(module.content.contains("pub struct RepositoryError"));
        assert!(module.content.contains("impl From<sqlx::Error> for RepositoryError"));
        assert!(module.content.contains("pub type Pool = sqlx::Pool<Db>;"));
        assert!(module.content.contains("pub use pedido_repository::PedidoRepository;"));
    }
}
