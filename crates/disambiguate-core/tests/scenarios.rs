use disambiguate_core::element::ElementTable;
use disambiguate_core::fst::EPSILON;
use disambiguate_core::powerset::SubsetArena;
use disambiguate_core::{
    disambiguate, disambiguate_default, DisambiguateError, DisambiguateOptions, Fst, Precondition,
};

const A: u32 = 10;
const B: u32 = 11;

#[test]
fn parallel_accepting_states_collapse() {
    // states {0,1,2}: 0 --a--> 1(F), 0 --a--> 2(F)
    let fst = Fst::acceptor(3, vec![0], &[1, 2], &[0, 0], &[A, A], &[1, 2]).unwrap();
    assert_eq!(fst.count_accepting_paths(&[A]), 2);

    let out = disambiguate_default(&fst).unwrap();
    assert_eq!(out.count_accepting_paths(&[A]), 1);
    assert_eq!(out.num_states, 2);
    assert_eq!(out.stop.len(), 1);
    assert!(!out.accepts(&[]));
    assert!(!out.accepts(&[A, A]));
}

#[test]
fn divergent_continuations_stay_apart() {
    // 0 --a--> 1, 0 --a--> 2(F), 1 --b--> 3(F)
    let fst = Fst::acceptor(4, vec![0], &[2, 3], &[0, 0, 1], &[A, A, B], &[1, 2, 3]).unwrap();
    let opts = DisambiguateOptions {
        state_labels: true,
        ..DisambiguateOptions::default()
    };
    let result = disambiguate(&fst, &opts).unwrap();

    assert_eq!(result.fsa.count_accepting_paths(&[A]), 1);
    assert_eq!(result.fsa.count_accepting_paths(&[A, B]), 1);
    assert_eq!(result.fsa.num_states, 4);
    assert_eq!(
        result.state_labels.unwrap(),
        vec!["0:{0}", "1:{1}", "2:{2}", "3:{3}"]
    );
}

#[test]
fn epsilon_arc_is_rejected_before_building() {
    let fst = Fst::acceptor(3, vec![0], &[2], &[0, 1], &[A, EPSILON], &[1, 2]).unwrap();
    let err = disambiguate(&fst, &DisambiguateOptions::default()).err();
    assert_eq!(
        err,
        Some(DisambiguateError::PreconditionViolation(
            Precondition::Epsilon { state: 1 }
        ))
    );
}

#[test]
fn weighted_input_is_rejected() {
    let fst = Fst::new(2, vec![0], &[1], &[0.0], &[0], &[A], &[A], &[1.5], &[1]).unwrap();
    assert!(matches!(
        disambiguate_default(&fst),
        Err(DisambiguateError::PreconditionViolation(
            Precondition::WeightedArc { state: 0, .. }
        ))
    ));
}

#[test]
fn identical_subsets_resolve_to_one_state() {
    let mut subsets = SubsetArena::new();
    let mut elements = ElementTable::new();

    let first = subsets.intern(vec![2, 5, 7]);
    let second = subsets.intern(vec![2, 5, 7]);
    assert_eq!(first, second);

    let (id1, new1) = elements.get_or_create(5, first);
    let (id2, new2) = elements.get_or_create(5, second);
    assert_eq!(id1, id2);
    assert!(new1);
    assert!(!new2);
}

#[test]
fn self_loops_on_ambiguous_cycle() {
    // Two interleaved a-cycles through 0 and 1, both final: every a^n is
    // accepted many ways.
    let fst = Fst::acceptor(
        2,
        vec![0],
        &[0, 1],
        &[0, 0, 1, 1],
        &[A, A, A, A],
        &[0, 1, 0, 1],
    )
    .unwrap();
    assert_eq!(fst.count_accepting_paths(&[A, A, A]), 8);

    let out = disambiguate_default(&fst).unwrap();
    for n in 0..10 {
        assert_eq!(out.count_accepting_paths(&vec![A; n]), 1);
    }
}

#[test]
fn exponentially_ambiguous_input_counts_saturate() {
    // Two parallel a-loops on one final state: a^n has 2^n paths
    let fst = Fst::acceptor(1, vec![0], &[0], &[0, 0], &[A, A], &[0, 0]).unwrap();
    let word = vec![A; 64];
    assert_eq!(fst.count_accepting_paths(&word), u64::MAX);

    let out = disambiguate_default(&fst).unwrap();
    assert_eq!(out.count_accepting_paths(&word), 1);
}
