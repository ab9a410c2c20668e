//! Semantic index tests: replace-on-edit consistency and cross-file lookup.

use std::sync::Arc;
use std::thread;

use archscope::hir::SemanticIndex;
use archscope::syntax::ElementKind;

use crate::helpers::source_fixtures::*;
use crate::helpers::workspace_helpers::*;

#[test]
fn test_reindexing_identical_content_is_idempotent() {
    let index = SemanticIndex::new();
    index.index_file("/ws/shop.arch", model(SHOP));
    let once = index.all_elements();

    index.index_file("/ws/shop.arch", model(SHOP));
    assert_eq!(index.all_elements(), once);
    assert_eq!(index.len(), once.len());
    assert_eq!(index.get_by_type(ElementKind::Component).len(), 2);
    assert_eq!(index.get_by_architecture("Shop").len(), once.len());
}

#[test]
fn test_reindexing_new_content_drops_every_old_entry() {
    let index = index_with(&[("/ws/other.arch", "system Keep")]);
    index.index_file("/ws/shop.arch", model(SHOP));
    index.index_file("/ws/shop.arch", model("system Shop { queue Events }"));

    let paths: Vec<String> = index
        .elements_in_file("/ws/shop.arch")
        .iter()
        .map(|e| e.qualified_id.to_string())
        .collect();
    assert_eq!(paths, ["Shop", "Shop.Events"]);
    assert!(index.get_element("Customer").is_none());
    assert!(index.get_by_type(ElementKind::DataStore).is_empty());
    assert!(index.get_by_architecture("Shop").is_empty());
    assert_eq!(index.get_by_type(ElementKind::Queue).len(), 1);
    assert!(index.get_element("Keep").is_some());
    assert_eq!(index.len(), 3);
}

#[test]
fn test_alias_qualified_lookup_crosses_files() {
    let index = index_with(&[
        ("/ws/app.arch", "import \"billing.arch\" as Billing\nperson U\nU -> Billing.API"),
        ("/ws/billing.arch", "system Core { container API }\nsystem API"),
    ]);

    let api = index.resolve_qualified_id("Billing.API", "/ws/app.arch").unwrap();
    assert_eq!(&*api.path, "/ws/billing.arch");
    assert_eq!(api.qualified_id.to_string(), "API");

    let nested = index.resolve_qualified_id("Billing.Core.API", "/ws/app.arch").unwrap();
    assert_eq!(nested.qualified_id.to_string(), "Core.API");
    assert!(index.resolve_qualified_id("Nope.API", "/ws/app.arch").is_none());
}

#[test]
fn test_lookup_queries() {
    let index = index_with(&[("/ws/shop.arch", SHOP)]);

    let web = index.get_element("Shop.Web").unwrap();
    assert_eq!(web.kind, ElementKind::Container);
    assert_eq!(web.label.as_ref(), "Storefront");
    assert_eq!(web.technology.as_deref(), Some("Rust"));

    let children: Vec<String> = index
        .get_qualified_elements("Shop.Web")
        .iter()
        .map(|e| e.id.to_string())
        .collect();
    assert_eq!(children, ["Cart", "Checkout"]);

    let by_prefix: Vec<String> = index
        .get_by_prefix("c")
        .iter()
        .map(|e| e.id.to_string())
        .collect();
    assert_eq!(by_prefix, ["Customer", "Cart", "Checkout"]);
}

#[test]
fn test_readers_never_see_half_replaced_files() {
    let index = Arc::new(SemanticIndex::new());
    let first = model("system A\nsystem B\nsystem C");
    let second = model("system X\nsystem Y\nsystem Z");
    index.index_file("/ws/a.arch", Arc::clone(&first));

    let writer = {
        let index = Arc::clone(&index);
        thread::spawn(move || {
            for i in 0..200 {
                let m = if i % 2 == 0 { &second } else { &first };
                index.index_file("/ws/a.arch", Arc::clone(m));
            }
        })
    };
    for _ in 0..200 {
        let ids: Vec<String> = index
            .elements_in_file("/ws/a.arch")
            .iter()
            .map(|e| e.id.to_string())
            .collect();
        assert!(ids == ["A", "B", "C"] || ids == ["X", "Y", "Z"], "{ids:?}");
    }
    writer.join().unwrap();
}
