//! Semantic graph contract consumed by the compiler.
//!
//! The front-end (YAML today, anything tree-shaped tomorrow) hands the
//! compiler a [`SemanticNode`] tree: kinds, tags, scalar values, ordered
//! children and anchor names. The compiler never sees raw text; this module
//! is the whole input contract.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The node kinds a front-end may produce.
///
/// Mappings flatten their pairs into `children` as `[k1, v1, k2, v2, ...]`;
/// alias nodes carry the referenced anchor name in `value`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemanticKind {
    /// A leaf value; `value` holds its text.
    Scalar,
    /// An ordered list of child nodes.
    Sequence,
    /// Key/value pairs, flattened in order into `children`.
    Mapping,
    /// A reference to a previously anchored node; name in `value`.
    Alias,
    /// One document of a stream; exactly one meaningful child.
    Document,
    /// The top-level stream; children are documents.
    Stream,
}

impl fmt::Display for SemanticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => write!(f, "scalar"),
            Self::Sequence => write!(f, "sequence"),
            Self::Mapping => write!(f, "mapping"),
            Self::Alias => write!(f, "alias"),
            Self::Document => write!(f, "document"),
            Self::Stream => write!(f, "stream"),
        }
    }
}

/// One node of the semantic graph.
///
/// Exactly one of `value` (scalars, aliases) or `children` (containers) is
/// meaningful. An anchor definition wraps any kind by setting `anchor`.
///
/// # Examples
///
/// ```
/// use yawl::semantic::SemanticNode;
///
/// // !wc -c  → a tagged scalar
/// let node = SemanticNode::scalar("-c").with_tag("wc");
/// assert_eq!(node.tag.as_deref(), Some("wc"));
///
/// // &loop [ ... ]  → an anchored sequence
/// let node = SemanticNode::sequence(vec![]).with_anchor("loop");
/// assert!(node.is_anchor_definition());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticNode {
    pub kind: SemanticKind,
    /// Application tag (`!name`), with the `!` handle already stripped.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tag: Option<String>,
    /// Scalar text, or the referenced anchor name for aliases.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub value: Option<String>,
    /// Ordered children for container kinds.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<SemanticNode>,
    /// Anchor name when this node is an anchor definition site.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub anchor: Option<String>,
}

impl Default for SemanticKind {
    fn default() -> Self {
        SemanticKind::Scalar
    }
}

impl SemanticNode {
    /// A scalar leaf carrying `value`.
    pub fn scalar(value: impl Into<String>) -> Self {
        Self {
            kind: SemanticKind::Scalar,
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// An empty scalar (the identity wire once compiled).
    #[must_use]
    pub fn empty_scalar() -> Self {
        Self {
            kind: SemanticKind::Scalar,
            value: Some(String::new()),
            ..Default::default()
        }
    }

    /// An ordered sequence node.
    pub fn sequence(children: Vec<SemanticNode>) -> Self {
        Self {
            kind: SemanticKind::Sequence,
            children,
            ..Default::default()
        }
    }

    /// A mapping node; `pairs` flatten in order as `[k, v, k, v, ...]`.
    pub fn mapping(pairs: Vec<(SemanticNode, SemanticNode)>) -> Self {
        let mut children = Vec::with_capacity(pairs.len() * 2);
        for (k, v) in pairs {
            children.push(k);
            children.push(v);
        }
        Self {
            kind: SemanticKind::Mapping,
            children,
            ..Default::default()
        }
    }

    /// An alias referencing the anchor `name`.
    pub fn alias(name: impl Into<String>) -> Self {
        Self {
            kind: SemanticKind::Alias,
            value: Some(name.into()),
            ..Default::default()
        }
    }

    /// A document wrapping one root node.
    pub fn document(root: SemanticNode) -> Self {
        Self {
            kind: SemanticKind::Document,
            children: vec![root],
            ..Default::default()
        }
    }

    /// A stream of documents.
    pub fn stream(documents: Vec<SemanticNode>) -> Self {
        Self {
            kind: SemanticKind::Stream,
            children: documents,
            ..Default::default()
        }
    }

    /// Attach an application tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Mark this node as an anchor definition named `name`.
    #[must_use]
    pub fn with_anchor(mut self, name: impl Into<String>) -> Self {
        self.anchor = Some(name.into());
        self
    }

    /// True when this node defines an anchor.
    #[must_use]
    pub fn is_anchor_definition(&self) -> bool {
        self.anchor.is_some()
    }

    /// Scalar text, treating a missing value as empty.
    #[must_use]
    pub fn scalar_text(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    /// Mapping pairs view over the flattened children.
    ///
    /// A trailing key without a value is paired with nothing and skipped.
    pub fn pairs(&self) -> impl Iterator<Item = (&SemanticNode, &SemanticNode)> {
        self.children.chunks_exact(2).map(|kv| (&kv[0], &kv[1]))
    }
}
