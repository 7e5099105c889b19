//! End-to-end scenario tests against the public crate surface, covering
//! the literal scenarios used to seed this suite (S1-S8) and the
//! cross-component equivalence property between the two store engines.

use rdf_triplestore::{IndexingStrategy, Literal, Node, Pattern, RdfStore, RoaringStore, StoreConfig, Triple};

fn iri(s: &str) -> Node {
    Node::iri(s).unwrap()
}

fn triple(s: &str, p: &str, o: &str) -> Triple {
    Triple::new(iri(s), iri(p), iri(o))
}

#[test]
fn s1_single_triple_add_contains_find() {
    let mut store = RdfStore::new();
    let t = triple("http://ex/x", "http://ex/R", "http://ex/y");
    store.add(t.clone());

    assert_eq!(store.size(), 1);
    assert!(store.contains(&t));
    assert!(!store.contains(&triple("http://ex/x", "http://ex/R", "http://ex/z")));

    let found: Vec<_> = store.find(&Pattern::new(Node::Any, Node::Any, iri("http://ex/y"))).collect();
    assert_eq!(found, vec![t]);
}

#[test]
fn s2_grid_pattern_matching() {
    let mut store = RdfStore::new();
    for s in ["a", "b"] {
        for o in ["a", "b", "c"] {
            store.add(Triple::new(iri(&format!("http://ex/{s}")), iri("http://ex/A"), iri(&format!("http://ex/{o}"))));
        }
    }
    for o in ["a", "b", "c"] {
        store.add(Triple::new(iri("http://ex/c"), iri("http://ex/B"), iri(&format!("http://ex/{o}"))));
    }

    assert_eq!(store.find(&Pattern::new(Node::Any, iri("http://ex/A"), Node::Any)).count(), 6);
    assert_eq!(store.find(&Pattern::new(Node::Any, iri("http://ex/B"), Node::Any)).count(), 3);
    assert_eq!(
        store
            .find(&Pattern::new(iri("http://ex/c"), iri("http://ex/B"), Node::Any))
            .count(),
        3
    );
    assert_eq!(store.find(&Pattern::new(Node::Any, Node::Any, iri("http://ex/a"))).count(), 3);
}

#[test]
fn s3_numeric_value_equality_across_lexical_forms() {
    let mut store = RdfStore::new();
    let t = Triple::new(
        iri("http://ex/x"),
        iri("http://ex/R"),
        Node::literal(Literal::with_datatype("0.1", "http://www.w3.org/2001/XMLSchema#double")),
    );
    store.add(t);

    let matching = Pattern::new(
        iri("http://ex/x"),
        iri("http://ex/R"),
        Node::literal(Literal::with_datatype("0.10", "http://www.w3.org/2001/XMLSchema#double")),
    );
    assert!(store.contains(&matching));

    let non_matching = Pattern::new(
        iri("http://ex/x"),
        iri("http://ex/R"),
        Node::literal(Literal::with_datatype("0.11", "http://www.w3.org/2001/XMLSchema#double")),
    );
    assert!(!store.contains(&non_matching));
}

#[test]
fn s5_indexed_set_survives_interleaved_add_remove() {
    use rdf_triplestore::IndexedSet;

    let mut set: IndexedSet<u32> = IndexedSet::new();
    for i in 0..100u32 {
        set.add_and_get_index(i);
    }
    for i in (0..100u32).step_by(10) {
        set.remove_and_get_index(&i);
    }
    for i in 1000..1010u32 {
        set.add_and_get_index(i);
    }
    assert_eq!(set.len(), 100);
    for (idx, key) in set.iter() {
        assert_eq!(set.index_of(key), Some(idx));
    }
}

#[test]
fn s6_manual_mode_precondition_then_agreement_with_classic_store() {
    let mut classic = RdfStore::new();
    let mut config = StoreConfig::default();
    config.indexing_strategy = IndexingStrategy::Manual;
    let mut roaring = RoaringStore::with_config(config);

    for i in 0..1_000 {
        let t = Triple::new(
            iri(&format!("http://ex/s{}", i % 50)),
            iri("http://ex/p"),
            iri(&format!("http://ex/o{i}")),
        );
        classic.add(t.clone());
        roaring.add(t);
    }

    let probe = Pattern::new(iri("http://ex/s7"), Node::Any, Node::Any);
    assert!(matches!(
        roaring.contains(&probe),
        Err(rdf_triplestore::GraphError::PreconditionViolation(_))
    ));

    roaring.rebuild_index();
    let roaring_result = roaring.contains(&probe).unwrap();
    let classic_result = classic.contains(&probe);
    assert_eq!(roaring_result, classic_result);
    assert!(roaring_result);

    for s_idx in 0..50 {
        let pattern = Pattern::new(iri(&format!("http://ex/s{s_idx}")), iri("http://ex/p"), Node::Any);
        let mut classic_matches: Vec<_> = classic.find(&pattern).collect();
        let mut roaring_matches: Vec<_> = roaring.find(&pattern).unwrap().collect::<Result<Vec<_>, _>>().unwrap();
        classic_matches.sort_by_key(|t| t.to_string());
        roaring_matches.sort_by_key(|t| t.to_string());
        assert_eq!(classic_matches, roaring_matches);
    }
}

#[test]
fn s8_large_graph_equivalence_random_sample() {
    let mut classic = RdfStore::new();
    let mut roaring = RoaringStore::new();

    let predicates = ["http://ex/knows", "http://ex/likes", "http://ex/follows"];
    for i in 0..500 {
        let t = Triple::new(
            iri(&format!("http://ex/person{}", i % 40)),
            iri(predicates[i % predicates.len()]),
            iri(&format!("http://ex/person{}", (i + 7) % 40)),
        );
        classic.add(t.clone());
        roaring.add(t);
    }
    roaring.rebuild_index();

    let patterns = [
        Pattern::new(iri("http://ex/person3"), Node::Any, Node::Any),
        Pattern::new(Node::Any, iri("http://ex/knows"), Node::Any),
        Pattern::new(Node::Any, Node::Any, iri("http://ex/person10")),
        Pattern::new(iri("http://ex/person3"), iri("http://ex/likes"), Node::Any),
        Pattern::new(Node::Any, iri("http://ex/follows"), iri("http://ex/person5")),
        Pattern::new(Node::Any, Node::Any, Node::Any),
    ];
    for pattern in patterns {
        let mut classic_matches: Vec<_> = classic.find(&pattern).collect();
        let mut roaring_matches: Vec<_> = roaring.find(&pattern).unwrap().collect::<Result<Vec<_>, _>>().unwrap();
        classic_matches.sort_by_key(|t| t.to_string());
        roaring_matches.sort_by_key(|t| t.to_string());
        assert_eq!(classic_matches, roaring_matches, "mismatch for pattern {pattern}");
    }
}
