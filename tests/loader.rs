//! YAML loader: anchors keep their names, aliases stay first-class.

use yawl::loader::load_str;
use yawl::semantic::{SemanticKind, SemanticNode};

fn single_doc(text: &str) -> SemanticNode {
    let stream = load_str(text).expect("load");
    assert_eq!(stream.kind, SemanticKind::Stream);
    let mut docs = stream.children;
    assert_eq!(docs.len(), 1, "expected one document");
    let doc = docs.remove(0);
    assert_eq!(doc.kind, SemanticKind::Document);
    doc.children.into_iter().next().expect("document root")
}

#[test]
fn plain_scalar_loads_with_value() {
    let root = single_doc("hello");
    assert_eq!(root.kind, SemanticKind::Scalar);
    assert_eq!(root.scalar_text(), "hello");
    assert_eq!(root.tag, None);
}

#[test]
fn tagged_scalars_keep_local_tags() {
    let root = single_doc("[!echo hello, !wc -c]");
    assert_eq!(root.kind, SemanticKind::Sequence);
    assert_eq!(root.children.len(), 2);
    assert_eq!(root.children[0].tag.as_deref(), Some("echo"));
    assert_eq!(root.children[0].scalar_text(), "hello");
    assert_eq!(root.children[1].tag.as_deref(), Some("wc"));
    assert_eq!(root.children[1].scalar_text(), "-c");
}

#[test]
fn anchors_and_aliases_resolve_to_textual_names() {
    let root = single_doc("&loop [go, *loop]");
    assert_eq!(root.anchor.as_deref(), Some("loop"));
    assert_eq!(root.children.len(), 2);
    let alias = &root.children[1];
    assert_eq!(alias.kind, SemanticKind::Alias);
    assert_eq!(alias.value.as_deref(), Some("loop"));
}

#[test]
fn multiple_anchors_keep_their_own_names() {
    let root = single_doc("[&first a, &second b, *first, *second]");
    assert_eq!(root.children[0].anchor.as_deref(), Some("first"));
    assert_eq!(root.children[1].anchor.as_deref(), Some("second"));
    assert_eq!(root.children[2].value.as_deref(), Some("first"));
    assert_eq!(root.children[3].value.as_deref(), Some("second"));
}

#[test]
fn stream_splits_into_documents() {
    let stream = load_str("a\n---\nb\n").expect("load");
    assert_eq!(stream.children.len(), 2);
}

#[test]
fn null_scalar_becomes_the_empty_scalar() {
    let root = single_doc("~");
    assert_eq!(root.kind, SemanticKind::Scalar);
    assert_eq!(root.scalar_text(), "");
}

#[test]
fn mapping_pairs_flatten_in_order() {
    let root = single_doc("!cmd-a x: 1\n!cmd-b y: 2\n");
    assert_eq!(root.kind, SemanticKind::Mapping);
    let pairs: Vec<_> = root.pairs().collect();
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0].0.tag.as_deref(), Some("cmd-a"));
    assert_eq!(pairs[1].0.tag.as_deref(), Some("cmd-b"));
}

#[test]
fn core_schema_tags_are_ignored() {
    let root = single_doc("!!str 42");
    assert_eq!(root.tag, None);
    assert_eq!(root.scalar_text(), "42");
}

#[test]
fn unbalanced_yaml_is_a_load_error() {
    assert!(load_str("[a, b").is_err());
}
