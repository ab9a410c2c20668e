//! Element declarations.

use std::fmt;
use std::sync::Arc;

use super::model::{Name, Relation};
use crate::base::Span;

/// The kind of a declared element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ElementKind {
    System,
    Container,
    Component,
    DataStore,
    Queue,
    Person,
}

impl ElementKind {
    pub const ALL: [ElementKind; 6] = [
        ElementKind::System,
        ElementKind::Container,
        ElementKind::Component,
        ElementKind::DataStore,
        ElementKind::Queue,
        ElementKind::Person,
    ];

    /// The keyword that introduces this kind in source.
    pub fn keyword(self) -> &'static str {
        match self {
            ElementKind::System => "system",
            ElementKind::Container => "container",
            ElementKind::Component => "component",
            ElementKind::DataStore => "datastore",
            ElementKind::Queue => "queue",
            ElementKind::Person => "person",
        }
    }

    /// Parse a keyword or type tag (`"datastore"`, `"data-store"`, case-insensitive).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let lower = keyword.to_ascii_lowercase();
        match lower.as_str() {
            "system" => Some(ElementKind::System),
            "container" => Some(ElementKind::Container),
            "component" => Some(ElementKind::Component),
            "datastore" | "data-store" | "database" => Some(ElementKind::DataStore),
            "queue" => Some(ElementKind::Queue),
            "person" => Some(ElementKind::Person),
            _ => None,
        }
    }

    /// Human-readable name.
    pub fn display(self) -> &'static str {
        match self {
            ElementKind::System => "system",
            ElementKind::Container => "container",
            ElementKind::Component => "component",
            ElementKind::DataStore => "data store",
            ElementKind::Queue => "queue",
            ElementKind::Person => "person",
        }
    }

    /// Whether elements of this kind own a body with nested elements.
    pub fn is_scope(self) -> bool {
        matches!(self, ElementKind::System | ElementKind::Container)
    }

    /// Passive kinds receive relations but are not expected to initiate them.
    pub fn is_passive(self) -> bool {
        matches!(self, ElementKind::DataStore | ElementKind::Queue)
    }

    /// Whether an element of this kind may be declared under `parent`
    /// (`None` is the model root).
    ///
    /// system → container → component, with data stores and queues at system
    /// or container level. Root tolerates everything but components.
    pub fn allowed_in(self, parent: Option<ElementKind>) -> bool {
        match parent {
            None => !matches!(self, ElementKind::Component | ElementKind::Container),
            Some(ElementKind::System) => matches!(
                self,
                ElementKind::Container | ElementKind::DataStore | ElementKind::Queue
            ),
            Some(ElementKind::Container) => matches!(
                self,
                ElementKind::Component | ElementKind::DataStore | ElementKind::Queue
            ),
            Some(_) => false,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

/// A `key: "value"` pair from a `metadata { ... }` block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataEntry {
    pub key: Name,
    pub value: Arc<str>,
    pub span: Span,
}

/// The attributes every element kind shares.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Decl {
    /// Local identifier, unique among direct siblings.
    pub name: Name,
    pub name_span: Span,
    pub label: Option<Arc<str>>,
    pub description: Option<Arc<str>>,
    pub technology: Option<Arc<str>>,
    /// Metadata in declaration order.
    pub metadata: Vec<MetadataEntry>,
    /// Relations declared inside this element's body.
    pub relations: Vec<Relation>,
    /// The whole declaration, keyword to closing brace.
    pub span: Span,
}

impl Decl {
    pub fn new(name: impl Into<Name>, name_span: Span) -> Self {
        Self {
            name: name.into(),
            name_span,
            span: name_span,
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<Arc<str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<Name>, value: impl Into<Arc<str>>) -> Self {
        self.metadata.push(MetadataEntry {
            key: key.into(),
            value: value.into(),
            span: self.name_span,
        });
        self
    }

    /// First metadata value for `key`.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_ref())
    }
}

/// The capability shared by every element variant: named, nestable,
/// describable.
pub trait Declared {
    fn decl(&self) -> &Decl;

    fn kind(&self) -> ElementKind;

    /// Nested elements, in declaration order.
    fn children(&self) -> &[Element] {
        &[]
    }

    fn name(&self) -> &Name {
        &self.decl().name
    }

    /// The human label, falling back to the identifier.
    fn label(&self) -> &str {
        self.decl()
            .label
            .as_deref()
            .unwrap_or_else(|| self.decl().name.as_str())
    }

    fn description(&self) -> Option<&str> {
        self.decl().description.as_deref()
    }

    fn technology(&self) -> Option<&str> {
        self.decl().technology.as_deref()
    }

    fn relations(&self) -> &[Relation] {
        &self.decl().relations
    }
}

macro_rules! leaf_element {
    ($(#[$meta:meta])* $ty:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $ty {
            pub decl: Decl,
        }

        impl Declared for $ty {
            fn decl(&self) -> &Decl {
                &self.decl
            }

            fn kind(&self) -> ElementKind {
                ElementKind::$kind
            }
        }
    };
}

macro_rules! scope_element {
    ($(#[$meta:meta])* $ty:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $ty {
            pub decl: Decl,
            pub children: Vec<Element>,
        }

        impl Declared for $ty {
            fn decl(&self) -> &Decl {
                &self.decl
            }

            fn kind(&self) -> ElementKind {
                ElementKind::$kind
            }

            fn children(&self) -> &[Element] {
                &self.children
            }
        }
    };
}

scope_element!(
    /// A software system; owns containers, data stores and queues.
    System => System
);
scope_element!(
    /// A deployable unit inside a system; owns components, data stores and queues.
    Container => Container
);
leaf_element!(Component => Component);
leaf_element!(DataStore => DataStore);
leaf_element!(Queue => Queue);
leaf_element!(
    /// A human actor.
    Person => Person
);

/// Any declared architectural unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Element {
    System(System),
    Container(Container),
    Component(Component),
    DataStore(DataStore),
    Queue(Queue),
    Person(Person),
}

impl Element {
    /// Build an element of `kind`. Children are dropped for leaf kinds.
    pub fn new(kind: ElementKind, decl: Decl, children: Vec<Element>) -> Self {
        match kind {
            ElementKind::System => Element::System(System { decl, children }),
            ElementKind::Container => Element::Container(Container { decl, children }),
            ElementKind::Component => Element::Component(Component { decl }),
            ElementKind::DataStore => Element::DataStore(DataStore { decl }),
            ElementKind::Queue => Element::Queue(Queue { decl }),
            ElementKind::Person => Element::Person(Person { decl }),
        }
    }

    fn inner(&self) -> &dyn Declared {
        match self {
            Element::System(e) => e,
            Element::Container(e) => e,
            Element::Component(e) => e,
            Element::DataStore(e) => e,
            Element::Queue(e) => e,
            Element::Person(e) => e,
        }
    }

    /// Direct child with the given local identifier (first in declaration order).
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children().iter().find(|child| child.name() == name)
    }
}

impl Declared for Element {
    fn decl(&self) -> &Decl {
        self.inner().decl()
    }

    fn kind(&self) -> ElementKind {
        self.inner().kind()
    }

    fn children(&self) -> &[Element] {
        match self {
            Element::System(e) => &e.children,
            Element::Container(e) => &e.children,
            _ => &[],
        }
    }
}
