//! Algebra laws: arity accounting and composition checks.

use proptest::prelude::*;
use yawl::algebra::{AlgebraError, Diagram};
use yawl::construct::combine;

#[test]
fn box_arities() {
    assert_eq!((Diagram::data("x").inputs(), Diagram::data("x").outputs()), (0, 1));
    let p = Diagram::program("cat", Vec::<String>::new());
    assert_eq!((p.inputs(), p.outputs()), (1, 1));
    assert_eq!((Diagram::copy(4).inputs(), Diagram::copy(4).outputs()), (1, 4));
    assert_eq!((Diagram::merge(4).inputs(), Diagram::merge(4).outputs()), (4, 1));
    assert_eq!(
        (Diagram::discard(2).inputs(), Diagram::discard(2).outputs()),
        (2, 0)
    );
    assert_eq!((Diagram::alias("x").inputs(), Diagram::alias("x").outputs()), (1, 1));
}

#[test]
fn anchor_inherits_inner_arities() {
    let inner = Diagram::data("a").tensor(Diagram::data("b"));
    let anchored = Diagram::anchor("pair", inner);
    assert_eq!((anchored.inputs(), anchored.outputs()), (0, 2));
}

#[test]
fn tensor_arities_add() {
    let d = Diagram::copy(2).tensor(Diagram::merge(3));
    assert_eq!((d.inputs(), d.outputs()), (4, 3));
}

#[test]
fn then_rejects_mismatched_arities() {
    let err = Diagram::copy(2)
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

#[test]
fn diagrams_round_trip_through_json() {
    let d = Diagram::data("3")
        .then(Diagram::anchor("loop", Diagram::alias("loop")))
        .unwrap();
    let json = serde_json::to_string(&d).unwrap();
    let back: Diagram = serde_json::from_str(&json).unwrap();
    assert_eq!(back, d);
}

proptest! {
    // Pipe arity law: stages whose arities already match compose to a bare
    // Then chain — the heuristic inserts no copy/merge/discard boxes.
    #[test]
    fn matching_arities_always_pipe_plainly(k in 1usize..6, stages in 1usize..6) {
        let mut composed = Diagram::id(k);
        for _ in 0..stages {
            composed = combine(composed, Diagram::id(k)).unwrap();
        }
        prop_assert_eq!(composed.inputs(), k);
        prop_assert_eq!(composed.outputs(), k);
        let shown = composed.to_string();
        prop_assert!(!shown.contains("copy"));
        prop_assert!(!shown.contains("merge"));
        prop_assert!(!shown.contains("discard"));
    }

    // Reconciliation totality: whatever the arities, adjacent stages always
    // combine into a diagram with the accumulator's input arity preserved.
    #[test]
    fn combine_is_total_over_small_arities(ri in 0usize..4, ro in 0usize..4, li in 0usize..4, lo in 0usize..4) {
        let res = stage(ri, ro);
        let layer = stage(li, lo);
        let combined = combine(res.clone(), layer).unwrap();
        // Tensor attachment widens the inputs; every other rule keeps them.
        prop_assert!(combined.inputs() >= res.inputs());
    }
}

/// An opaque stage with the requested arities, built from primitive boxes.
fn stage(inputs: usize, outputs: usize) -> Diagram {
    let spread = match outputs {
        0 => Diagram::discard(1),
        1 => Diagram::id(1),
        n => Diagram::copy(n),
    };
    match inputs {
        0 => Diagram::data("seed").then(spread).expect("data feeds spread"),
        1 => spread,
        n => Diagram::merge(n).then(spread).expect("merge feeds spread"),
    }
}
