//! Route inference
//!
//! A repository's operation names are classified against a fixed,
//! ordered rule table. The first rule whose pattern occurs in the
//! normalized name wins; names are lowercased and stripped of underscores
//! first, so `find_with_details` and `findWithDetails` agree.
//!
//! | # | pattern(s)                                   | method | path                          |
//! |---|----------------------------------------------|--------|-------------------------------|
//! | 1 | findall                                      | GET    | `/{r}`                        |
//! | 2 | findwithdetails                              | GET    | `/{r}/{id}/details`           |
//! | 3 | findbyid                                     | GET    | `/{r}/{id}`                   |
//! | 4 | savemasterdetail                             | POST   | `/{r}/savemasterdetail`       |
//! | 5 | updatedetail, atualizardetalhe               | PUT    | `/{r}/{id}/updatedetail`      |
//! | 6 | deletedetail, excluirdetalhe, deletardetalhe | DELETE | `/{r}/{id}/deletedetail`      |
//! | 7 | update                                       | PUT    | `/{r}/{id}`                   |
//! | 8 | delete                                       | DELETE | `/{r}/{id}`                   |
//! | 9 | create                                       | POST   | `/{r}`                        |
//! | - | anything else                                | POST   | `/{r}`                        |

use serde::Serialize;
use std::collections::HashSet;

// ============================================================================
// OperationKind
// ============================================================================

/// Closed set of repository operations a controller knows how to bind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OperationKind {
    FindAll,
    FindWithDetails,
    FindById,
    SaveMasterDetail,
    UpdateDetail,
    DeleteDetail,
    Update,
    Delete,
    Create,
    /// Matched no rule; bound with the default route
    Other,
}

impl OperationKind {
    /// Classify an operation name by the first matching rule
    pub fn classify(name: &str) -> Self {
        Self::rule_for(name).map(|r| r.kind).unwrap_or(OperationKind::Other)
    }

    fn rule_for(name: &str) -> Option<&'static RouteRule> {
        let normalized = normalize(name);
        ROUTE_RULES
            .iter()
            .find(|rule| rule.patterns.iter().any(|p| normalized.contains(p)))
    }

    /// Lookups answer 404 when nothing is found
    pub fn is_lookup(&self) -> bool {
        matches!(self, OperationKind::FindById | OperationKind::FindWithDetails)
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

// ============================================================================
// Rule table
// ============================================================================

/// HTTP method of a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Name of the axum routing function
    pub fn routing_fn(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of a route below the resource segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteShape {
    /// `/{resource}`
    Collection,
    /// `/{resource}/{action}`
    CollectionAction(&'static str),
    /// `/{resource}/{id}`
    Item,
    /// `/{resource}/{id}/{action}`
    ItemAction(&'static str),
}

impl RouteShape {
    pub fn path(&self, resource: &str) -> String {
        match self {
            RouteShape::Collection => format!("/{}", resource),
            RouteShape::CollectionAction(action) => format!("/{}/{}", resource, action),
            RouteShape::Item => format!("/{}/{{id}}", resource),
            RouteShape::ItemAction(action) => format!("/{}/{{id}}/{}", resource, action),
        }
    }

    pub fn has_id(&self) -> bool {
        matches!(self, RouteShape::Item | RouteShape::ItemAction(_))
    }
}

/// One row of the precedence table
#[derive(Debug, Clone, Copy)]
pub struct RouteRule {
    pub patterns: &'static [&'static str],
    pub kind: OperationKind,
    pub method: HttpMethod,
    pub shape: RouteShape,
}

/// Precedence table; order matters
pub const ROUTE_RULES: &[RouteRule] = &[
    RouteRule {
        patterns: &["findall"],
        kind: OperationKind::FindAll,
        method: HttpMethod::Get,
        shape: RouteShape::Collection,
    },
    RouteRule {
        patterns: &["findwithdetails"],
        kind: OperationKind::FindWithDetails,
        method: HttpMethod::Get,
        shape: RouteShape::ItemAction("details"),
    },
    RouteRule {
        patterns: &["findbyid"],
        kind: OperationKind::FindById,
        method: HttpMethod::Get,
        shape: RouteShape::Item,
    },
    RouteRule {
        patterns: &["savemasterdetail"],
        kind: OperationKind::SaveMasterDetail,
        method: HttpMethod::Post,
        shape: RouteShape::CollectionAction("savemasterdetail"),
    },
    RouteRule {
        patterns: &["updatedetail", "atualizardetalhe"],
        kind: OperationKind::UpdateDetail,
        method: HttpMethod::Put,
        shape: RouteShape::ItemAction("updatedetail"),
    },
    RouteRule {
        patterns: &["deletedetail", "excluirdetalhe", "deletardetalhe"],
        kind: OperationKind::DeleteDetail,
        method: HttpMethod::Delete,
        shape: RouteShape::ItemAction("deletedetail"),
    },
    RouteRule {
        patterns: &["update"],
        kind: OperationKind::Update,
        method: HttpMethod::Put,
        shape: RouteShape::Item,
    },
    RouteRule {
        patterns: &["delete"],
        kind: OperationKind::Delete,
        method: HttpMethod::Delete,
        shape: RouteShape::Item,
    },
    RouteRule {
        patterns: &["create"],
        kind: OperationKind::Create,
        method: HttpMethod::Post,
        shape: RouteShape::Collection,
    },
];

const DEFAULT_METHOD: HttpMethod = HttpMethod::Post;
const DEFAULT_SHAPE: RouteShape = RouteShape::Collection;

// ============================================================================
// ControllerPlan
// ============================================================================

/// An operation bound to a method and path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteBinding {
    /// Repository operation name
    pub operation: String,
    pub kind: OperationKind,
    pub method: HttpMethod,
    pub path: String,
    /// Whether the path carries an `{id}` segment
    pub has_id: bool,
}

/// Route bindings for one controller
#[derive(Debug, Clone, Default, Serialize)]
pub struct ControllerPlan {
    pub resource: String,
    pub bindings: Vec<RouteBinding>,
    /// Bindings dropped because an earlier operation claimed the same pair
    pub dropped: Vec<RouteBinding>,
}

impl ControllerPlan {
    /// Infer bindings for `operations`, in order.
    pub fn infer<S: AsRef<str>>(resource: &str, operations: &[S]) -> Self {
        let mut plan = ControllerPlan {
            resource: resource.to_string(),
            ..Default::default()
        };
        let mut claimed: HashSet<(HttpMethod, String)> = HashSet::new();

        for op in operations {
            let name = op.as_ref();
            let (kind, method, shape) = match OperationKind::rule_for(name) {
                Some(rule) => (rule.kind, rule.method, rule.shape),
                None => (OperationKind::Other, DEFAULT_METHOD, DEFAULT_SHAPE),
            };
            let binding = RouteBinding {
                operation: name.to_string(),
                kind,
                method,
                path: shape.path(resource),
                has_id: shape.has_id(),
            };

            if claimed.insert((binding.method, binding.path.clone())) {
                plan.bindings.push(binding);
            } else {
                tracing::warn!(
                    operation = name,
                    method = %binding.method,
                    path = binding.path.as_str(),
                    "Route already bound; skipping operation"
                );
                plan.dropped.push(binding);
            }
        }

        plan
    }

    /// Bindings grouped by path, in first-seen order
    pub fn by_path(&self) -> Vec<(&str, Vec<&RouteBinding>)> {
        let mut groups: Vec<(&str, Vec<&RouteBinding>)> = Vec::new();
        for binding in &self.bindings {
            match groups.iter_mut().find(|(path, _)| *path == binding.path) {
                Some((_, group)) => group.push(binding),
                None => groups.push((binding.path.as_str(), vec![binding])),
            }
        }
        groups
    }

    /// Distinct (method, path) pairs
    pub fn pairs(&self) -> Vec<(HttpMethod, &str)> {
        self.bindings
            .iter()
            .map(|b| (b.method, b.path.as_str()))
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_basic_crud_yields_five_distinct_pairs() {
        let plan = ControllerPlan::infer(
            "pedido",
            &["findAll", "findById", "update", "delete", "create"],
        );
        assert_eq!(
            plan.pairs(),
            vec![
                (HttpMethod::Get, "/pedido"),
                (HttpMethod::Get, "/pedido/{id}"),
                (HttpMethod::Put, "/pedido/{id}"),
                (HttpMethod::Delete, "/pedido/{id}"),
                (HttpMethod::Post, "/pedido"),
            ]
        );
        assert!(plan.dropped.is_empty());
    }

    #[test]
    fn test_master_detail_routes() {
        let plan = ControllerPlan::infer(
            "pedido",
            &["save_master_detail", "find_with_details", "update_detail", "delete_detail"],
        );
        assert_eq!(
            plan.pairs(),
            vec![
                (HttpMethod::Post, "/pedido/savemasterdetail"),
                (HttpMethod::Get, "/pedido/{id}/details"),
                (HttpMethod::Put, "/pedido/{id}/updatedetail"),
                (HttpMethod::Delete, "/pedido/{id}/deletedetail"),
            ]
        );
    }

    #[test]
    fn test_precedence_beats_substring_overlap() {
        // contains both "update" and "detail"
        assert_eq!(
            OperationKind::classify("updateDetail"),
            OperationKind::UpdateDetail
        );
        assert_eq!(
            OperationKind::classify("deleteDetail"),
            OperationKind::DeleteDetail
        );
        // "findAllWithDetails" hits rule 1 first
        assert_eq!(
            OperationKind::classify("findAllWithDetails"),
            OperationKind::FindAll
        );
    }

    #[test]
    fn test_localized_aliases() {
        assert_eq!(
            OperationKind::classify("atualizarDetalhe"),
            OperationKind::UpdateDetail
        );
        assert_eq!(
            OperationKind::classify("excluirDetalhe"),
            OperationKind::DeleteDetail
        );
        assert_eq!(
            OperationKind::classify("deletarDetalhe"),
            OperationKind::DeleteDetail
        );
    }

    #[test]
    fn test_unmatched_uses_default_route() {
        let plan = ControllerPlan::infer("pedido", &["reprocessar"]);
        assert_eq!(plan.bindings[0].kind, OperationKind::Other);
        assert_eq!(plan.pairs(), vec![(HttpMethod::Post, "/pedido")]);
    }

    #[test]
    fn test_duplicate_pair_dropped() {
        let plan = ControllerPlan::infer("pedido", &["create", "reprocessar"]);
        assert_eq!(plan.bindings.len(), 1);
        assert_eq!(plan.dropped.len(), 1);
        assert_eq!(plan.dropped[0].operation, "reprocessar");
    }

    #[test]
    fn test_group_by_path() {
        let plan = ControllerPlan::infer(
            "pedido",
            &["find_all", "find_by_id", "update", "delete", "create"],
        );
        let groups: Vec<(&str, usize)> = plan
            .by_path()
            .into_iter()
            .map(|(path, group)| (path, group.len()))
            .collect();
        assert_eq!(groups, vec![("/pedido", 2), ("/pedido/{id}", 3)]);
    }

    #[test]
    fn test_lookup_kinds() {
        assert!(OperationKind::FindById.is_lookup());
        assert!(OperationKind::FindWithDetails.is_lookup());
        assert!(!OperationKind::FindAll.is_lookup());
    }
}
