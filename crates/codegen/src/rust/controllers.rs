//! # Controller Generator (Axum)
//!
//! Generates one axum router per repository. Routes come from the
//! repository's operation names through [`ControllerPlan::infer`]; the
//! handler body for each binding is chosen by its [`OperationKind`].
//!
//! ## Generated Files
//!
//! - `src/controllers/mod.rs`: `ApiResponse`, the `respond` helpers and
//!   `router(pool)`, which merges every controller
//! - `src/controllers/<table>_controller.rs`: handlers plus `routes()`
//!
//! ## Status Codes
//!
//! | Outcome                         | Status |
//! |---------------------------------|--------|
//! | `Ok(value)`                     | 200    |
//! | `Err(RepositoryError)`          | 400    |
//! | `Ok(None)` from a lookup        | 404    |

use fastback_core::EngineResult;
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use std::collections::HashMap;

use super::repositories::id_type;
use super::{Emitted, artifact_path, mod_path, module_decls, module_path};
use crate::context::{GenerationContext, TableInfo};
use crate::plan::{ControllerPlan, OperationKind, RepositoryPlan, RouteBinding};
use crate::render::{self, doc};
use crate::{ArtifactRole, GeneratedArtifact};

// ============================================================================
// Public API
// ============================================================================

/// Generate `controllers/mod.rs` plus one controller per keyed table.
pub fn generate_controllers(ctx: &GenerationContext) -> EngineResult<Emitted> {
    let mut warnings = Vec::new();
    let mut artifacts = Vec::new();
    let mut mounted: Vec<(String, String)> = Vec::new();
    let mut resources: HashMap<String, String> = HashMap::new();

    for table in ctx.tables() {
        let info = TableInfo::new(table, ctx);
        if info.id_type().is_none() {
            warnings.push(format!(
                "Table '{}' has no integer 'id' column; no controller generated.",
                info.name()
            ));
            continue;
        }

        let (repository, plan) = controller_plan(&info);

        if let Some(owner) = resources.get(&plan.resource) {
            let warning = format!(
                "Table '{}' maps to route '/{}' already used by '{}'; no controller generated.",
                info.name(),
                plan.resource,
                owner
            );
            tracing::warn!(table = info.name(), "{}", warning);
            warnings.push(warning);
            continue;
        }
        resources.insert(plan.resource.clone(), info.name().to_string());

        for dropped in &plan.dropped {
            warnings.push(format!(
                "Operation '{}' of '{}' maps to {} {}, already bound; skipped.",
                dropped.operation,
                info.name(),
                dropped.method,
                dropped.path
            ));
        }

        artifacts.push(generate_table_controller(&info, &repository, &plan, &mut warnings)?);
        mounted.push((info.file_stem(ArtifactRole::Controller), repository.type_name));
    }

    artifacts.insert(0, generate_controllers_mod(ctx, &mounted)?);
    Ok((artifacts, warnings))
}

/// Repository plan and inferred route bindings of a keyed table
pub fn controller_plan(info: &TableInfo) -> (RepositoryPlan, ControllerPlan) {
    let (details, _) = info.details();
    let repository = RepositoryPlan::build(info, &details);
    let plan = ControllerPlan::infer(&info.resource(), &repository.operation_names());
    (repository, plan)
}

// ============================================================================
// controllers/mod.rs
// ============================================================================

fn generate_controllers_mod(
    ctx: &GenerationContext,
    mounted: &[(String, String)],
) -> EngineResult<GeneratedArtifact> {
    let docs = ctx.generate_docs();
    let repositories = module_path(ctx, ArtifactRole::Repository);
    let stems: Vec<String> = mounted.iter().map(|(stem, _)| stem.clone()).collect();
    let decls = module_decls(&stems);

    let modules: Vec<Ident> = stems.iter().map(|s| render::ident(s)).collect();
    let repos: Vec<Ident> = mounted.iter().map(|(_, ty)| render::ident(ty)).collect();

    let envelope_doc = doc(docs, "Uniform response envelope of every handler.");
    let respond_doc = doc(
        docs,
        "200 with the value as `data`, or 400 with the `RepositoryError` as `data`.",
    );
    let lookup_doc = doc(docs, "Like `respond`, with 404 when the lookup found nothing.");
    let router_doc = doc(docs, "Every controller's routes, backed by one pool.");

    let body = quote! {
        use axum::http::StatusCode;
        use axum::response::{IntoResponse, Response};
        use axum::{Json, Router};
        use serde::Serialize;
        use serde_json::Value;

        use #repositories::{Pool, RepositoryError, RepositoryResult};

        #decls

        #envelope_doc
        #[derive(Debug, Clone, PartialEq, Serialize)]
        pub struct ApiResponse {
            pub status: bool,
            pub message: String,
            pub data: Value,
        }

        pub fn reply(code: StatusCode, status: bool, message: impl Into<String>, data: Value) -> Response {
            let body = ApiResponse {
                status,
                message: message.into(),
                data,
            };
            (code, Json(body)).into_response()
        }

        fn failure(error: RepositoryError) -> Response {
            let message = error.message.clone();
            let data = serde_json::to_value(&error).unwrap_or(Value::Null);
            reply(StatusCode::BAD_REQUEST, false, message, data)
        }

        #respond_doc
        pub fn respond<T: Serialize>(result: RepositoryResult<T>) -> Response {
            match result {
                Ok(value) => match serde_json::to_value(value) {
                    Ok(data) => reply(StatusCode::OK, true, "Success.", data),
                    Err(error) => reply(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        false,
                        error.to_string(),
                        Value::Null,
                    ),
                },
                Err(error) => failure(error),
            }
        }

        #lookup_doc
        pub fn respond_lookup<T: Serialize>(result: RepositoryResult<Option<T>>) -> Response {
            match result {
                Ok(Some(value)) => respond(Ok(value)),
                Ok(None) => reply(StatusCode::NOT_FOUND, false, "Resource not found.", Value::Null),
                Err(error) => failure(error),
            }
        }

        #router_doc
        pub fn router(pool: Pool) -> Router {
            Router::new()
                #(.merge(#modules::routes(#repositories::#repos::new(pool.clone()))))*
        }
    };

    let path = mod_path(ctx, ArtifactRole::Controller);
    let content = render::render_file(
        &path.to_string_lossy(),
        "HTTP controllers, one per repository.",
        body,
    )?;
    Ok(GeneratedArtifact::support(ArtifactRole::Controller, path, content))
}

// ============================================================================
// Per-table controller
// ============================================================================

/// Names a handler needs from the model and repository modules
struct HandlerTypes {
    repo: Ident,
    data: Ident,
    id_ty: syn::Type,
    master_detail: Ident,
    detail_data: Ident,
    detail_table: Ident,
}

fn generate_table_controller(
    info: &TableInfo,
    repository: &RepositoryPlan,
    plan: &ControllerPlan,
    warnings: &mut Vec<String>,
) -> EngineResult<GeneratedArtifact> {
    let ctx = info.ctx;
    let docs = ctx.generate_docs();
    let models = module_path(ctx, ArtifactRole::Model);
    let repositories = module_path(ctx, ArtifactRole::Repository);
    let repo_module = render::ident(&info.file_stem(ArtifactRole::Repository));
    let pascal = info.pascal_name();

    let types = HandlerTypes {
        repo: render::ident(&repository.type_name),
        data: render::ident(&info.data_type_name()),
        id_ty: id_type(info)?,
        master_detail: render::ident(&format!("{}MasterDetail", pascal)),
        detail_data: render::ident(&format!("{}DetailData", pascal)),
        detail_table: render::ident(&format!("{}DetailTable", pascal)),
    };

    // Handlers, in binding order
    let mut handlers = Vec::new();
    let mut bound: Vec<&RouteBinding> = Vec::new();
    for binding in &plan.bindings {
        match handler(binding, &types, docs) {
            Some(tokens) => {
                handlers.push(tokens);
                bound.push(binding);
            }
            None => {
                let warning = format!(
                    "Operation '{}' of '{}' has no handler; route {} {} not emitted.",
                    binding.operation,
                    info.name(),
                    binding.method,
                    binding.path
                );
                tracing::warn!(table = info.name(), "{}", warning);
                warnings.push(warning);
            }
        }
    }

    // One `.route()` per path, methods chained in first-seen order
    let routes = plan.by_path().into_iter().filter_map(|(path, group)| {
        let group: Vec<&RouteBinding> = group
            .into_iter()
            .filter(|b| bound.iter().any(|kept| kept.operation == b.operation))
            .collect();
        let (first, rest) = group.split_first()?;
        let first_fn = format_ident!("{}", first.method.routing_fn());
        let first_handler = render::ident(&first.operation);
        let rest = rest.iter().map(|b| {
            let method = format_ident!("{}", b.method.routing_fn());
            let handler = render::ident(&b.operation);
            quote! { .#method(#handler) }
        });
        Some(quote! {
            .route(#path, routing::#first_fn(#first_handler) #(#rest)*)
        })
    });

    let master_imports = if repository.is_master() {
        let master_detail = &types.master_detail;
        let detail_data = &types.detail_data;
        let detail_table = &types.detail_table;
        let selector_doc = doc(
            docs,
            "Query string of `delete_detail`: `?detail=<key>`, defaulting to the first detail set.",
        );
        (
            quote! {
                use serde::Deserialize;
                use #repositories::#repo_module::{#master_detail, #detail_data, #detail_table};
            },
            quote! {
                #selector_doc
                #[derive(Debug, Default, Deserialize)]
                pub struct DetailSelector {
                    #[serde(default)]
                    pub detail: #detail_table,
                }
            },
        )
    } else {
        (TokenStream::new(), TokenStream::new())
    };
    let (master_use, selector) = master_imports;

    let query_import = if repository.is_master() {
        quote! { Query, }
    } else {
        TokenStream::new()
    };

    let repo = &types.repo;
    let data = &types.data;
    let routes_doc = doc(
        docs,
        &format!("Routes under `/{}`, with the repository as state.", plan.resource),
    );

    let body = quote! {
        use std::sync::Arc;

        use axum::extract::{Path, #query_import State};
        use axum::response::Response;
        use axum::{Json, Router, routing};
        #master_use

        use super::{respond, respond_lookup};
        use #models::#data;
        use #repositories::#repo;

        #routes_doc
        pub fn routes(repository: #repo) -> Router {
            Router::new()
                #(#routes)*
                .with_state(Arc::new(repository))
        }

        #(#handlers)*

        #selector
    };

    let path = artifact_path(ctx, ArtifactRole::Controller, info);
    let summary = format!("Controller for table `{}`.", info.name());
    let content = render::render_file(&path.to_string_lossy(), &summary, body)?;
    Ok(GeneratedArtifact::for_table(
        ArtifactRole::Controller,
        info.name(),
        path,
        content,
    ))
}

/// Handler for one binding, or `None` when no repository operation backs it
fn handler(binding: &RouteBinding, types: &HandlerTypes, docs: bool) -> Option<TokenStream> {
    let name = render::ident(&binding.operation);
    let repo = &types.repo;
    let data = &types.data;
    let id_ty = &types.id_ty;
    let state = quote! { State(repository): State<Arc<#repo>> };
    let summary = doc(docs, &format!("`{} {}`", binding.method, binding.path));

    let tokens = match binding.kind {
        OperationKind::FindAll => quote! {
            pub async fn #name(#state) -> Response {
                respond(repository.find_all().await)
            }
        },
        OperationKind::FindById => quote! {
            pub async fn #name(#state, Path(id): Path<#id_ty>) -> Response {
                respond_lookup(repository.find_by_id(id).await)
            }
        },
        OperationKind::Create => quote! {
            pub async fn #name(#state, Json(data): Json<#data>) -> Response {
                respond(repository.create(&data).await)
            }
        },
        OperationKind::Update => quote! {
            pub async fn #name(#state, Path(id): Path<#id_ty>, Json(data): Json<#data>) -> Response {
                respond(repository.update(id, &data).await)
            }
        },
        OperationKind::Delete => quote! {
            pub async fn #name(#state, Path(id): Path<#id_ty>) -> Response {
                respond(repository.delete(id).await)
            }
        },
        OperationKind::FindWithDetails => quote! {
            pub async fn #name(#state, Path(id): Path<#id_ty>) -> Response {
                respond_lookup(repository.find_with_details(id).await)
            }
        },
        OperationKind::SaveMasterDetail => {
            let body = &types.master_detail;
            quote! {
                pub async fn #name(#state, Json(body): Json<#body>) -> Response {
                    respond(repository.save_master_detail(&body.master, &body.details).await)
                }
            }
        }
        OperationKind::UpdateDetail => {
            let detail_data = &types.detail_data;
            quote! {
                pub async fn #name(
                    #state,
                    Path(detail_id): Path<i64>,
                    Json(data): Json<#detail_data>,
                ) -> Response {
                    respond(repository.update_detail(detail_id, &data).await)
                }
            }
        }
        OperationKind::DeleteDetail => quote! {
            pub async fn #name(
                #state,
                Path(detail_id): Path<i64>,
                Query(selector): Query<DetailSelector>,
            ) -> Response {
                respond(repository.delete_detail(detail_id, selector.detail).await)
            }
        },
        OperationKind::Other => return None,
    };

    Some(quote! {
        #summary
        #tokens
    })
}

// ============================================================================
// Tests
// ============================================================================
