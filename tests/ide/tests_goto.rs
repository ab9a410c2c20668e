//! Go-to-definition tests, single file and across files.

use archscope::base::{Position, Span};
use archscope::ide::{DefinitionKind, Workspace};

use crate::helpers::source_fixtures::*;
use crate::helpers::workspace_helpers::*;

#[test]
fn test_goto_in_same_file() {
    let ws = workspace_with(&[("/ws/shop.arch", SHOP)]);
    let at = position_of(SHOP, "Checkout", 1);
    let result = ws.goto_definition("/ws/shop.arch", at).unwrap();

    assert_eq!(result.targets.len(), 1);
    let target = &result.targets[0];
    assert_eq!(target.qualified_id.as_ref().unwrap().to_string(), "Shop.Web.Checkout");
    assert_eq!(target.span.start, Position::new(8, 22));
}

#[test]
fn test_goto_follows_shadowing() {
    let ws = workspace_with(&[("/ws/a.arch", SHADOWED)]);
    // the `X` in `Y -> X`
    let at = position_of(SHADOWED, "X", 2);
    let result = ws.goto_definition("/ws/a.arch", at).unwrap();
    assert_eq!(result.targets.len(), 1);
    assert_eq!(result.targets[0].qualified_id.as_ref().unwrap().to_string(), "S.C.X");
}

#[test]
fn test_goto_across_files_without_import() {
    let a = "system S";
    let b = "person U\nU -> S";
    let ws = workspace_with(&[("/ws/a.arch", a), ("/ws/b.arch", b)]);

    let result = ws.goto_definition("/ws/b.arch", Position::new(1, 5)).unwrap();
    assert_eq!(result.targets.len(), 1);
    assert_eq!(&*result.targets[0].path, "/ws/a.arch");
    assert_eq!(result.targets[0].span, Span::from_coords(0, 7, 0, 8));
}

#[test]
fn test_goto_through_alias_into_indexed_only_file() {
    let app = "import \"billing.arch\" as Billing\nperson U\nU -> Billing.API";
    let ws = Workspace::new();
    ws.index()
        .index_file("/ws/billing.arch", model("system Core\nsystem API \"Billing API\""));
    ws.open("/ws/app.arch", app, 1);

    let at = position_of(app, "API", 0);
    let result = ws.goto_definition("/ws/app.arch", at).unwrap();
    assert_eq!(result.targets.len(), 1);
    assert_eq!(&*result.targets[0].path, "/ws/billing.arch");
    assert_eq!(result.targets[0].qualified_id.as_ref().unwrap().to_string(), "API");

    // the alias segment itself is not an element
    let on_alias = position_of(app, "Billing.API", 0);
    assert!(ws.goto_definition("/ws/app.arch", on_alias).unwrap().is_empty());
    assert!(!ws.is_open("/ws/billing.arch"));
}

#[test]
fn test_goto_on_declaration_returns_itself() {
    let ws = workspace_with(&[("/ws/shop.arch", SHOP)]);
    let at = position_of(SHOP, "Purchase", 0);
    let result = ws.goto_definition("/ws/shop.arch", at).unwrap();
    assert_eq!(result.targets[0].kind, DefinitionKind::Scenario);
    assert_eq!(&*result.targets[0].name, "Purchase");

    let at = position_of(SHOP, "Events", 0);
    let result = ws.goto_definition("/ws/shop.arch", at).unwrap();
    assert_eq!(result.targets[0].qualified_id.as_ref().unwrap().to_string(), "Shop.Events");
}

#[test]
fn test_goto_on_ambiguous_reference_lists_candidates() {
    let ws = workspace_with(&[("/ws/a.arch", AMBIGUOUS)]);
    let at = position_of(AMBIGUOUS, "Svc", 2);
    let result = ws.goto_definition("/ws/a.arch", at).unwrap();
    assert_eq!(result.targets.len(), 2);
    assert_ne!(result.targets[0].span, result.targets[1].span);
}

#[test]
fn test_goto_outside_identifiers_is_empty() {
    let ws = workspace_with(&[("/ws/a.arch", "person U\nsystem S\nU -> S")]);
    assert!(ws.goto_definition("/ws/a.arch", Position::new(2, 2)).unwrap().is_empty());
    assert!(ws.goto_definition("/ws/a.arch", Position::new(9, 0)).unwrap().is_empty());
    assert!(ws.goto_definition("/ws/missing.arch", Position::new(0, 0)).is_err());
}
