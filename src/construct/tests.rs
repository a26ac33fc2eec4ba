use super::*;
use crate::algebra::AlgebraBox;
use crate::semantic::SemanticNode;

fn seq(children: Vec<SemanticNode>) -> SemanticNode {
    SemanticNode::sequence(children)
}

fn tagged(tag: &str, value: &str) -> SemanticNode {
    SemanticNode::scalar(value).with_tag(tag)
}

#[test]
fn scalar_literal_compiles_to_data() {
    let d = compile(&SemanticNode::scalar("hello")).unwrap();
    assert_eq!(d, Diagram::data("hello"));
}

#[test]
fn empty_scalar_compiles_to_identity_wire() {
    let d = compile(&SemanticNode::empty_scalar()).unwrap();
    assert_eq!(d, Diagram::id(1));
}

#[test]
fn tagged_scalar_compiles_to_program_with_value_arg() {
    let d = compile(&tagged("echo", "hello")).unwrap();
    assert_eq!(d, Diagram::program("echo", ["hello"]));

    let bare = compile(&tagged("ls", "")).unwrap();
    assert_eq!(bare, Diagram::program("ls", Vec::<String>::new()));
}

#[test]
fn matching_arities_pipe_without_extra_boxes() {
    // !echo hello then !wc -c: both 1→1, must be a bare Then.
    let d = compile(&seq(vec![tagged("echo", "hello"), tagged("wc", "-c")])).unwrap();
    let expected = Diagram::program("echo", ["hello"])
        .then(Diagram::program("wc", ["-c"]))
        .unwrap();
    assert_eq!(d, expected);
}

#[test]
fn data_pipes_into_program() {
    let d = compile(&seq(vec![
        SemanticNode::scalar("3"),
        tagged("wc", "-c"),
    ]))
    .unwrap();
    let expected = Diagram::data("3").then(Diagram::program("wc", ["-c"])).unwrap();
    assert_eq!(d, expected);
}

#[test]
fn single_item_sequence_degenerates_to_the_item() {
    let d = compile(&seq(vec![SemanticNode::scalar("x")])).unwrap();
    assert_eq!(d, Diagram::data("x"));
}

#[test]
fn two_constants_tensor() {
    let d = compile(&seq(vec![
        SemanticNode::scalar("a"),
        SemanticNode::scalar("b"),
    ]))
    .unwrap();
    assert_eq!(d, Diagram::data("a").tensor(Diagram::data("b")));
    assert_eq!((d.inputs(), d.outputs()), (0, 2));
}

#[test]
fn two_constants_then_program_reduce_through_merge() {
    let d = compile(&seq(vec![
        SemanticNode::scalar("a"),
        SemanticNode::scalar("b"),
        tagged("cat", ""),
    ]))
    .unwrap();
    let expected = Diagram::data("a")
        .tensor(Diagram::data("b"))
        .then(Diagram::merge(2))
        .unwrap()
        .then(Diagram::program("cat", Vec::<String>::new()))
        .unwrap();
    assert_eq!(d, expected);
}

#[test]
fn tap_fires_when_single_input_stages_cannot_pipe() {
    // res: 1→2 (program fanned out), layer: 1→1: no pipe relation, both
    // want the same input.
    let fanout = Diagram::program("tee-ish", Vec::<String>::new())
        .then(Diagram::copy(2))
        .unwrap();
    let layer = Diagram::program("wc", ["-c"]);
    let tapped = combine(fanout.clone(), layer.clone()).unwrap();
    let expected = Diagram::copy(2)
        .then(fanout.tensor(layer))
        .unwrap()
        .then(Diagram::merge(3))
        .unwrap();
    assert_eq!(tapped, expected);
    assert_eq!((tapped.inputs(), tapped.outputs()), (1, 1));
}

#[test]
fn broadcast_inserts_copy_for_single_output() {
    let res = Diagram::data("x");
    let layer = Diagram::merge(3);
    let d = combine(res.clone(), layer.clone()).unwrap();
    let expected = res.then(Diagram::copy(3)).unwrap().then(layer).unwrap();
    assert_eq!(d, expected);
}

#[test]
fn excess_outputs_are_discarded_before_piping() {
    // res: 0→3, layer: 2→1: keep two, discard one.
    let res = Diagram::data("a")
        .tensor(Diagram::data("b"))
        .tensor(Diagram::data("c"));
    let layer = Diagram::merge(2);
    let d = combine(res.clone(), layer.clone()).unwrap();
    let trim = Diagram::id(2).tensor(Diagram::discard(1));
    let expected = res.then(trim).unwrap().then(layer).unwrap();
    assert_eq!(d, expected);
}

#[test]
fn alias_node_compiles_to_alias_box() {
    let d = compile(&SemanticNode::alias("loop")).unwrap();
    assert_eq!(d, Diagram::alias("loop"));
}

#[test]
fn alias_without_name_is_malformed() {
    let mut node = SemanticNode::alias("x");
    node.value = None;
    let err = compile(&node).unwrap_err();
    assert!(matches!(err, ConstructError::MalformedNode { .. }));
}

#[test]
fn anchored_node_wraps_inner_diagram() {
    let node = SemanticNode::scalar("hi").with_anchor("greet");
    let d = compile(&node).unwrap();
    match d {
        Diagram::Leaf(AlgebraBox::Anchor { name, inner }) => {
            assert_eq!(name, "greet");
            assert_eq!(*inner, Diagram::data("hi"));
        }
        other => panic!("expected anchor, got {other}"),
    }
}

#[test]
fn tagged_sequence_extracts_literal_args() {
    let node = seq(vec![
        SemanticNode::scalar("-l"),
        tagged("ignored", "x"),
        SemanticNode::scalar("/tmp"),
    ])
    .with_tag("ls");
    let d = compile(&node).unwrap();
    assert_eq!(d, Diagram::program("ls", ["-l", "/tmp"]));
}

#[test]
fn root_mapping_gets_fan_treatment() {
    // { !cmd a: x, !cmd b: y } at the root: copy input to both pairs,
    // merge both outputs.
    let node = SemanticNode::mapping(vec![
        (tagged("cmd-a", ""), SemanticNode::scalar("x")),
        (tagged("cmd-b", ""), SemanticNode::scalar("y")),
    ]);
    let d = compile(&node).unwrap();
    assert_eq!((d.inputs(), d.outputs()), (1, 1));
    // Front copy and back merge are present.
    let shown = d.to_string();
    assert!(shown.contains("copy(2)"), "missing fan-out in {shown}");
    assert!(shown.contains("merge(2)"), "missing fan-in in {shown}");
}

#[test]
fn nested_untagged_mapping_stays_a_raw_tensor() {
    let mapping = SemanticNode::mapping(vec![
        (tagged("cmd-a", ""), SemanticNode::scalar("x")),
        (tagged("cmd-b", ""), SemanticNode::scalar("y")),
    ]);
    let node = seq(vec![SemanticNode::scalar("seed"), mapping]);
    let d = compile(&node).unwrap();
    // The sequence fold sees the raw 2→2 tensor, not a fanned 1→1 box.
    assert!(d.to_string().contains("⊗"));
}

#[test]
fn stream_compiles_one_diagram_per_document() {
    let stream = SemanticNode::stream(vec![
        SemanticNode::document(SemanticNode::scalar("a")),
        SemanticNode::document(SemanticNode::scalar("b")),
    ]);
    let docs = compile_stream(&stream).unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0], Diagram::data("a"));
    assert_eq!(docs[1], Diagram::data("b"));
}

#[test]
fn then_arity_mismatch_is_reported() {
    let err = Diagram::data("x")
        .tensor(Diagram::data("y"))
        .then(Diagram::program("cat", Vec::<String>::new()))
        .unwrap_err();
    assert!(matches!(
        err,
        AlgebraError::ArityMismatch {
            outputs: 2,
            inputs: 1
        }
    ));
}
