//! Hover, completion and symbol tests through the workspace.

use archscope::base::Position;
use archscope::ide::{CompletionKind, DefinitionKind, TextChange};
use archscope::syntax::ElementKind;
use rstest::rstest;

use crate::helpers::source_fixtures::*;
use crate::helpers::workspace_helpers::*;

// =============================================================================
// HOVER
// =============================================================================

#[test]
fn test_hover_on_reference_shows_element_details() {
    let ws = workspace_with(&[("/ws/shop.arch", SHOP)]);
    // `Shop.Web` in `Customer -> Shop.Web "browses"`, cursor on Web
    let at = position_of(SHOP, "Shop.Web \"browses\"", 0);
    let at = Position::new(at.line, at.column + 5);
    let hover = ws.hover("/ws/shop.arch", at).unwrap().unwrap();

    assert!(!hover.is_definition);
    assert_eq!(hover.qualified_id.unwrap().to_string(), "Shop.Web");
    assert!(hover.contents.starts_with("**container** `Storefront`"));
    assert!(hover.contents.contains("*Technology:* Rust"));
}

#[test]
fn test_hover_on_qualifier_segment_targets_the_parent() {
    let ws = workspace_with(&[("/ws/shop.arch", SHOP)]);
    let at = position_of(SHOP, "Shop.Web \"browses\"", 0);
    let hover = ws.hover("/ws/shop.arch", at).unwrap().unwrap();
    assert_eq!(hover.qualified_id.unwrap().to_string(), "Shop");
    assert!(hover.contents.contains("Sells things online"));
}

#[test]
fn test_hover_survives_syntax_errors() {
    let text = "system Shop \"Web shop\" {\n  container Web\n";
    let ws = workspace_with(&[("/ws/a.arch", text)]);
    assert!(ws.ensure_parsed("/ws/a.arch").unwrap().is_none());

    // nothing indexed, so the local definition map answers
    let hover = ws.hover("/ws/a.arch", Position::new(1, 13)).unwrap().unwrap();
    assert!(hover.is_definition);
    assert_eq!(hover.contents, "**container** `Web`\n\n`Shop.Web`");
}

// =============================================================================
// COMPLETION
// =============================================================================

#[test]
fn test_completion_mixes_local_index_and_keywords() {
    let ws = workspace_with(&[
        ("/ws/billing.arch", "system Payments"),
        ("/ws/shop.arch", "person Payer\nsystem Shop\nPayer -> P"),
    ]);
    let items = ws.completions("/ws/shop.arch", Position::new(2, 10)).unwrap();
    let labels: Vec<&str> = items.iter().map(|i| &*i.label).collect();
    assert_eq!(labels, ["Payer", "Payments", "person"]);
    assert_eq!(items[2].kind, CompletionKind::Keyword);
    assert!(items[2].insert_text.is_some());
}

#[test]
fn test_member_completion_after_dot() {
    let text = "person U\nU -> Shop.W";
    let ws = workspace_with(&[("/ws/shop.arch", SHOP), ("/ws/other.arch", text)]);
    let items = ws.completions("/ws/other.arch", Position::new(1, 11)).unwrap();
    let labels: Vec<&str> = items.iter().map(|i| &*i.label).collect();
    assert_eq!(labels, ["Web"]);
}

#[test]
fn test_completion_while_typing_uses_fresh_text() {
    let ws = workspace_with(&[("/ws/a.arch", "system Alpha\nsystem Beta\n")]);
    ws.apply_change("/ws/a.arch", 2, TextChange::full("system Alpha\nsystem Beta\nsystem Gamma\nAl"))
        .unwrap();
    let items = ws.completions("/ws/a.arch", Position::new(3, 2)).unwrap();
    assert_eq!(&*items[0].label, "Alpha");
}

// =============================================================================
// SYMBOLS
// =============================================================================

#[rstest]
#[case(None, 8)]
#[case(Some("web"), 3)]
#[case(Some("Other"), 1)]
#[case(Some("shop.web."), 2)]
#[case(Some("zzz"), 0)]
fn test_workspace_symbol_search(#[case] query: Option<&str>, #[case] expected: usize) {
    let ws = workspace_with(&[("/ws/shop.arch", SHOP), ("/ws/other.arch", "system Other")]);
    assert_eq!(ws.workspace_symbols(query).len(), expected);
}

#[test]
fn test_workspace_symbols_carry_location_and_container() {
    let ws = workspace_with(&[("/ws/shop.arch", SHOP)]);
    let symbols = ws.workspace_symbols(Some("Cart"));
    assert_eq!(symbols.len(), 1);
    let cart = &symbols[0];
    assert_eq!(cart.kind, DefinitionKind::Element(ElementKind::Component));
    assert_eq!(&*cart.path, "/ws/shop.arch");
    assert_eq!(cart.container_name().as_deref(), Some("Shop.Web"));
    assert_eq!(cart.span.start, Position::new(7, 22));
}

#[test]
fn test_document_outline() {
    let ws = workspace_with(&[("/ws/shop.arch", SHOP)]);
    let outline = ws.document_symbols("/ws/shop.arch").unwrap();
    let top: Vec<&str> = outline.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(top, ["Customer", "Shop", "Purchase", "UsePostgres"]);

    let shop = &outline[1];
    let children: Vec<&str> = shop.children.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(children, ["Web", "Db", "Events"]);
    assert_eq!(shop.children[0].children.len(), 2);
    assert_eq!(outline[3].kind, DefinitionKind::Decision);
}
