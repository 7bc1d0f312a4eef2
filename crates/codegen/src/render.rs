//! # Rendering
//!
//! Emitters build `proc_macro2::TokenStream`s with `quote!`. Each stream is
//! validated with `syn::parse2` and formatted with `prettyplease` before it
//! becomes artifact text, so a malformed emission surfaces as an error
//! instead of a broken file.
//!
//! This module also owns the identifier rules for generated code.

use fastback_core::{DataType, EngineError, EngineResult};
use heck::ToSnakeCase;
use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;

/// Banner placed at the top of every generated file
pub const GENERATED_BANNER: &str = "Generated by fastback. Do not edit: every run overwrites this file.";

// ============================================================================
// File rendering
// ============================================================================

/// Validate and pretty-print a token stream as a complete Rust file.
///
/// `summary` becomes the first line of the module docs, followed by the
/// generated-file banner.
pub fn render_file(artifact: &str, summary: &str, body: TokenStream) -> EngineResult<String> {
    let banner = format!(" {}", GENERATED_BANNER);
    let summary = format!(" {}", summary);
    let tokens = quote! {
        #![doc = #summary]
        #![doc = ""]
        #![doc = #banner]

        #body
    };

    let file = syn::parse2::<syn::File>(tokens)
        .map_err(|e| EngineError::render(artifact, e.to_string()))?;
    Ok(prettyplease::unparse(&file))
}

/// Doc attribute, or nothing when docs are disabled
pub fn doc(enabled: bool, text: &str) -> TokenStream {
    if enabled {
        let text = format!(" {}", text);
        quote! { #[doc = #text] }
    } else {
        TokenStream::new()
    }
}

// ============================================================================
// Identifiers
// ============================================================================

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe",
    "unsized", "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be raw identifiers
const NON_RAW: &[&str] = &["self", "Self", "super", "crate", "_"];

/// Replace characters outside `XID_Continue` with `_` and make sure the
/// first one is `XID_Start` or `_`
fn xid_name(name: &str, fallback: &str) -> String {
    let name: String = name
        .chars()
        .map(|c| if c == '_' || unicode_ident::is_xid_continue(c) { c } else { '_' })
        .collect();
    match name.chars().next() {
        None => fallback.to_string(),
        Some(c) if c == '_' || unicode_ident::is_xid_start(c) => name,
        Some(_) => format!("_{}", name),
    }
}

/// Snake-case spelling of a column as a Rust field name, before keyword handling
pub fn field_name(column: &str) -> String {
    xid_name(&column.to_snake_case(), "field")
}

/// Field identifier for a column: snake case, raw when it is a keyword
pub fn field_ident(column: &str) -> Ident {
    let name = field_name(column);
    if NON_RAW.contains(&name.as_str()) {
        Ident::new(&format!("{}_", name), Span::call_site())
    } else if KEYWORDS.contains(&name.as_str()) {
        Ident::new_raw(&name, Span::call_site())
    } else {
        Ident::new(&name, Span::call_site())
    }
}

/// Whether the generated field name differs from the column name
pub fn needs_rename(column: &str) -> bool {
    let ident = field_ident(column).to_string();
    ident.trim_start_matches("r#") != column
}

/// Identifier for a type or module name.
///
/// Characters that cannot appear in an identifier become `_`.
pub fn ident(name: &str) -> Ident {
    let name = xid_name(name, "unnamed");
    if KEYWORDS.contains(&name.as_str()) {
        Ident::new_raw(&name, Span::call_site())
    } else if NON_RAW.contains(&name.as_str()) {
        Ident::new(&format!("{}_", name), Span::call_site())
    } else {
        Ident::new(&name, Span::call_site())
    }
}

/// Rust type tokens for a column type
pub fn rust_type(data_type: DataType) -> EngineResult<syn::Type> {
    syn::parse_str::<syn::Type>(data_type.to_rust_type())
        .map_err(|e| EngineError::codegen(format!("type {}: {}", data_type, e)))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_file_formats_and_adds_banner() {
        let body = quote! { pub struct Pedido { id: Option<i64> } };
        let text = render_file("pedido.rs", "Pedido model.", body).unwrap();
        assert!(text.starts_with("//! Pedido model."));
        assert!(text.contains(GENERATED_BANNER));
        assert!(text.contains("pub struct Pedido {\n    id: Option<i64>,\n}"));
    }

    #[test]
    fn test_render_file_rejects_bad_tokens() {
        let body = quote! { pub struct };
        let err = render_file("broken.rs", "Broken.", body).unwrap_err();
        assert!(err.to_string().contains("broken.rs"));
    }

    #[test]
    fn test_doc_toggle() {
        assert!(doc(false, "hidden").is_empty());
        assert!(!doc(true, "shown").is_empty());
    }

    #[test]
    fn test_field_ident_rules() {
        assert_eq!(field_ident("cliente").to_string(), "cliente");
        assert_eq!(field_ident("DataPedido").to_string(), "data_pedido");
        assert_eq!(field_ident("type").to_string(), "r#type");
        assert_eq!(field_ident("self").to_string(), "self_");
        assert_eq!(field_ident("2fa").to_string(), "_2fa");
        assert_eq!(field_ident("").to_string(), "field");
        assert_eq!(field_ident("área²").to_string(), "área_");
        assert_eq!(field_ident("preço").to_string(), "preço");
    }

    #[test]
    fn test_ident_sanitizes() {
        assert_eq!(ident("Pedido").to_string(), "Pedido");
        assert_eq!(ident("Order-items").to_string(), "Order_items");
        assert_eq!(ident("2024Log").to_string(), "_2024Log");
        assert_eq!(ident("").to_string(), "unnamed");
        assert_eq!(ident("match").to_string(), "r#match");
        assert_eq!(ident("Área²").to_string(), "Área_");
        assert_eq!(ident("·x").to_string(), "_·x");
    }

    #[test]
    fn test_needs_rename() {
        assert!(!needs_rename("cliente"));
        assert!(!needs_rename("type"));
        assert!(needs_rename("DataPedido"));
        assert!(needs_rename("2fa"));
    }

    #[test]
    fn test_rust_type_parses() {
        for dt in [DataType::Int64, DataType::DateTimeUtc, DataType::Bytes, DataType::Json] {
            assert!(rust_type(dt).is_ok());
        }
    }
}
