//! Naming convention
//!
//! Pure, stateless identifier transforms shared by every emitter.
//!
//! - `to_pascal("item_pedido")` → `"ItemPedido"`
//! - `to_camel("item_pedido")` → `"itemPedido"`
//! - `to_route_segment("item_pedidos")` → `"itemPedido"`
//!
//! Only the first character of each underscore-separated segment changes
//! case; the rest of the segment is kept as written.

use heck::ToSnakeCase;

/// Split on `_`, capitalize each segment, concatenate. Empty segments vanish.
pub fn to_pascal(identifier: &str) -> String {
    identifier
        .split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// `to_pascal` with the first character lowercased.
pub fn to_camel(identifier: &str) -> String {
    let pascal = to_pascal(identifier);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Strip a simple English plural from the end of a snake_case word.
pub fn singularize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if lower.len() > 3 && lower.ends_with("ies") {
        return format!("{}y", &word[..word.len() - 3]);
    }
    for suffix in ["sses", "xes", "ches", "shes", "zes"] {
        if lower.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
        return word.to_string();
    }
    if lower.len() > 1 && lower.ends_with('s') {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Route segment for a table: camelCase of the singular name.
pub fn to_route_segment(identifier: &str) -> String {
    to_camel(&singularize(identifier))
}

/// Rust module / file stem for an identifier.
pub fn module_name(identifier: &str) -> String {
    identifier.to_snake_case()
}

/// Type name of a generated artifact, e.g. `PedidoRepository`.
pub fn artifact_type_name(table: &str, suffix: &str) -> String {
    format!("{}{}", to_pascal(table), suffix)
}

/// File stem of a generated artifact, e.g. `pedido_repository`.
pub fn artifact_file_stem(table: &str, suffix: &str) -> String {
    module_name(&artifact_type_name(table, suffix))
}

// ============================================================================
// Tests
// ============================================================================
