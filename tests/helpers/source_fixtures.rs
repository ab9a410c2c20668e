//! Source snippets reused across tests.

/// `X` nested in `S.C`, plus a top-level `X`; the relation inside `C`
/// refers to the short name.
pub const SHADOWED: &str = r#"
system X
system S {
    container C {
        component X
        component Y
        Y -> X
    }
}
"#;

/// Two top-level elements named `Svc`.
pub const AMBIGUOUS: &str = r#"
person P
system Svc
system Svc
P -> Svc
"#;

pub const CYCLE: &str = r#"
system A
system B
A -> B "calls"
B -> A "calls back"
"#;

pub const DUPLICATE_SIBLINGS: &str = r#"
person U
system Shop {
    container API
    container API
}
U -> Shop
"#;

/// A small but complete model exercising every element kind.
pub const SHOP: &str = r#"
architecture "Shop" {
    person Customer "Customer"
    system Shop "Web shop" {
        description "Sells things online"
        container Web "Storefront" {
            technology "Rust"
            component Cart
            component Checkout
            Cart -> Checkout
        }
        datastore Db "Orders"
        queue Events
        Web -> Db "writes"
        Web -> Events "publishes"
    }
    Customer -> Shop.Web "browses"
    scenario Purchase "Customer buys" {
        Customer -> Shop.Web
        Shop.Web -> Shop.Db
    }
    adr UsePostgres "Use Postgres" {
        status "accepted"
    }
}
"#;
