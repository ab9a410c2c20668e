//! Identifiers for resolved elements.

use std::fmt;

use crate::base::FileId;
use crate::syntax::Name;

/// Path of local identifiers from the model root to one element,
/// e.g. `Shop.Web.Cart`.
///
/// Never empty, and no segment is empty.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedId {
    segments: Vec<Name>,
}

impl QualifiedId {
    /// Build from segments. Returns `None` for an empty path or an empty segment.
    pub fn new(segments: Vec<Name>) -> Option<Self> {
        if segments.is_empty() || segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        Some(Self { segments })
    }

    /// A top-level element.
    pub fn root(name: impl Into<Name>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    /// Parse a dotted path.
    pub fn parse(text: &str) -> Option<Self> {
        Self::new(text.split('.').map(Name::from).collect())
    }

    pub fn child(&self, name: impl Into<Name>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.segments.split_last()?;
        Self::new(init.to_vec())
    }

    pub fn segments(&self) -> &[Name] {
        &self.segments
    }

    /// The element's local identifier.
    pub fn name(&self) -> &Name {
        // segments is never empty
        &self.segments[self.segments.len() - 1]
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn is_top_level(&self) -> bool {
        self.segments.len() == 1
    }

    /// Strict ancestor test: `Shop` is an ancestor of `Shop.Web`, not of itself.
    pub fn is_ancestor_of(&self, other: &QualifiedId) -> bool {
        other.segments.len() > self.segments.len() && other.segments.starts_with(&self.segments)
    }

    /// `self` equals `other` or contains it.
    pub fn contains(&self, other: &QualifiedId) -> bool {
        other.segments.starts_with(&self.segments)
    }
}

impl fmt::Display for QualifiedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl fmt::Debug for QualifiedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QualifiedId({self})")
    }
}

/// A resolved element: which file declares it, and where in that file's tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Target {
    pub file: FileId,
    pub qid: QualifiedId,
}

impl Target {
    pub fn new(file: FileId, qid: QualifiedId) -> Self {
        Self { file, qid }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.qid, self.file)
    }
}
