//! Classic triple store (C5).
//!
//! Three [`NodeMap`]s of [`Bunch`]es, one per triple position. `add`/
//! `remove` keep all three in lockstep; a triple lives in the S-bunch
//! keyed by its subject, the P-bunch keyed by its predicate, and the
//! O-bunch keyed by its object simultaneously. Query dispatch picks
//! whichever of those bunches is cheapest for a given pattern (see
//! [`crate::rdf::pattern::classify`]).

use tracing::trace;

use crate::config::StoreConfig;
use crate::error::invariant;

use super::bunch::{Bunch, IndexedPosition};
use super::node_map::NodeMap;
use super::pattern::{self, PatternTag};
use super::triple::{Pattern, Triple};

/// An in-memory RDF triple store indexed on all three positions.
///
/// Mirror consistency across `by_s`/`by_p`/`by_o` is an invariant: every
/// live triple appears in exactly one bunch per map. Divergence between
/// the three maps is a bug in this type, not a caller error, so it panics
/// rather than surfacing a `Result` (see `crate::error`).
#[derive(Clone)]
pub struct RdfStore {
    by_s: NodeMap<Bunch>,
    by_p: NodeMap<Bunch>,
    by_o: NodeMap<Bunch>,
    size: usize,
    config: StoreConfig,
}

impl RdfStore {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            by_s: NodeMap::new(),
            by_p: NodeMap::new(),
            by_o: NodeMap::new(),
            size: 0,
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Inserts `t`. No-op (idempotent) if already present.
    pub fn add(&mut self, t: Triple) {
        trace!(triple = %t, "store.add");
        let threshold = self.config.t_bunch_subject;
        let s_bunch = self
            .by_s
            .compute_if_absent(t.subject.clone(), || Bunch::new(IndexedPosition::Subject));
        if !s_bunch.try_add(t.clone(), threshold) {
            // Already present: by_p/by_o must already hold it too.
            return;
        }

        let po_threshold = self.config.t_bunch_po;
        let p_bunch = self
            .by_p
            .compute_if_absent(t.predicate.clone(), || Bunch::new(IndexedPosition::Predicate));
        invariant!(
            p_bunch.try_add(t.clone(), po_threshold),
            "mirror consistency violated: {t} present in by_s but already in by_p"
        );

        let o_bunch = self
            .by_o
            .compute_if_absent(t.object.clone(), || Bunch::new(IndexedPosition::Object));
        invariant!(
            o_bunch.try_add(t.clone(), po_threshold),
            "mirror consistency violated: {t} present in by_s but already in by_o"
        );

        self.size += 1;
    }

    /// Removes `t`. No-op if absent.
    pub fn remove(&mut self, t: &Triple) {
        trace!(triple = %t, "store.remove");
        let Some(s_bunch) = self.by_s.get_mut(&t.subject) else {
            return;
        };
        if !s_bunch.try_remove(t) {
            return;
        }
        if s_bunch.is_empty() {
            self.by_s.remove(&t.subject);
        }

        let p_bunch = self.by_p.get_mut(&t.predicate);
        invariant!(
            p_bunch.is_some(),
            "mirror consistency violated: {t} removed from by_s but absent from by_p"
        );
        let p_bunch = p_bunch.unwrap();
        invariant!(
            p_bunch.try_remove(t),
            "mirror consistency violated: {t} absent from by_p bunch contents"
        );
        if p_bunch.is_empty() {
            self.by_p.remove(&t.predicate);
        }

        let o_bunch = self.by_o.get_mut(&t.object);
        invariant!(
            o_bunch.is_some(),
            "mirror consistency violated: {t} removed from by_s but absent from by_o"
        );
        let o_bunch = o_bunch.unwrap();
        invariant!(
            o_bunch.try_remove(t),
            "mirror consistency violated: {t} absent from by_o bunch contents"
        );
        if o_bunch.is_empty() {
            self.by_o.remove(&t.object);
        }

        self.size -= 1;
    }

    pub fn contains(&self, pattern: &Pattern) -> bool {
        match pattern::classify(pattern) {
            PatternTag::SubPreObj | PatternTag::SubPreAny | PatternTag::SubAnyObj => {
                bunch_matches(self.by_s.get(&pattern.subject), pattern)
            }
            PatternTag::SubAnyAny => self.by_s.contains_key(&pattern.subject),
            PatternTag::AnyPreAny => self.by_p.contains_key(&pattern.predicate),
            PatternTag::AnyAnyObj => self.by_o.contains_key(&pattern.object),
            PatternTag::AnyPreObj => {
                let o_bunch = self.by_o.get(&pattern.object);
                let p_bunch = self.by_p.get(&pattern.predicate);
                match (o_bunch, p_bunch) {
                    (Some(ob), Some(pb)) if ob.len() > self.config.t_secondary => {
                        if pb.len() <= ob.len() {
                            bunch_matches(Some(pb), pattern)
                        } else {
                            bunch_matches(Some(ob), pattern)
                        }
                    }
                    (Some(ob), _) => bunch_matches(Some(ob), pattern),
                    (None, _) => false,
                }
            }
            PatternTag::AnyAnyAny => self.size > 0,
        }
    }

    /// Lazy, finite, non-restartable iterator over triples matching
    /// `pattern`. Order within a bunch is insertion order for array
    /// bunches, implementation-defined once hashed; order across bunches
    /// is implementation-defined.
    pub fn find(&self, pattern: &Pattern) -> Box<dyn Iterator<Item = Triple> + '_> {
        match pattern::classify(pattern) {
            PatternTag::SubPreObj | PatternTag::SubPreAny | PatternTag::SubAnyObj => {
                filtered_bunch_iter(self.by_s.get(&pattern.subject), pattern.clone())
            }
            PatternTag::SubAnyAny => bunch_iter(self.by_s.get(&pattern.subject)),
            PatternTag::AnyPreAny => bunch_iter(self.by_p.get(&pattern.predicate)),
            PatternTag::AnyAnyObj => bunch_iter(self.by_o.get(&pattern.object)),
            PatternTag::AnyPreObj => {
                let o_bunch = self.by_o.get(&pattern.object);
                let p_bunch = self.by_p.get(&pattern.predicate);
                match (o_bunch, p_bunch) {
                    (Some(ob), Some(pb)) if ob.len() > self.config.t_secondary => {
                        if pb.len() <= ob.len() {
                            filtered_bunch_iter(Some(pb), pattern.clone())
                        } else {
                            filtered_bunch_iter(Some(ob), pattern.clone())
                        }
                    }
                    (Some(ob), _) => filtered_bunch_iter(Some(ob), pattern.clone()),
                    (None, _) => Box::new(std::iter::empty()),
                }
            }
            PatternTag::AnyAnyAny => Box::new(self.by_s.values().flat_map(|b| b.iter().cloned())),
        }
    }

    /// Same contract as [`Self::find`]; named separately to match the
    /// external interface's `stream` vs `find` distinction (both are lazy
    /// finite sequences here — this store has no separate async/parallel
    /// streaming path).
    pub fn stream(&self, pattern: &Pattern) -> Box<dyn Iterator<Item = Triple> + '_> {
        self.find(pattern)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn clear(&mut self) {
        self.by_s.clear();
        self.by_p.clear();
        self.by_o.clear();
        self.size = 0;
    }

    /// Deep copy: independent of `self` thereafter. Node payloads
    /// (`Arc<str>`) are shared, not physically duplicated.
    pub fn copy(&self) -> Self {
        self.clone()
    }
}

impl Default for RdfStore {
    fn default() -> Self {
        Self::new()
    }
}

fn bunch_iter(bunch: Option<&Bunch>) -> Box<dyn Iterator<Item = Triple> + '_> {
    match bunch {
        Some(b) => Box::new(b.iter().cloned()),
        None => Box::new(std::iter::empty()),
    }
}

/// Whether `bunch` holds a triple matching `pattern` under value equality
/// (see [`pattern::matches`]), not the bunch's own term-equality duplicate
/// test — those are different predicates for different purposes (C4's
/// dedup identity vs. C5/C6 query matching).
fn bunch_matches(bunch: Option<&Bunch>, pattern: &Pattern) -> bool {
    match bunch {
        Some(b) => b.any_match(|t| pattern::matches(pattern, t)),
        None => false,
    }
}

/// Triples in `bunch` matching `pattern` under value equality, cloned from
/// the stored triples themselves (not `pattern`) so a differently-formed
/// but value-equal literal is reported in its originally stored lexical
/// form.
fn filtered_bunch_iter(bunch: Option<&Bunch>, pattern: Pattern) -> Box<dyn Iterator<Item = Triple> + '_> {
    match bunch {
        Some(b) => Box::new(b.iter().filter(move |t| pattern::matches(&pattern, t)).cloned()),
        None => Box::new(std::iter::empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::node::{Literal, Node};

    fn iri(s: &str) -> Node {
        Node::iri(s).unwrap()
    }

    fn triple(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(iri(s), iri(p), iri(o))
    }

    #[test]
    fn s1_single_triple() {
        let mut store = RdfStore::new();
        let t = triple("http://ex/x", "http://ex/R", "http://ex/y");
        store.add(t.clone());
        assert_eq!(store.size(), 1);
        assert!(store.contains(&t));
        assert!(!store.contains(&triple("http://ex/x", "http://ex/R", "http://ex/z")));

        let pattern = Pattern::new(Node::Any, Node::Any, iri("http://ex/y"));
        let found: Vec<_> = store.find(&pattern).collect();
        assert_eq!(found, vec![t]);
    }

    #[test]
    fn add_is_idempotent() {
        let mut store = RdfStore::new();
        let t = triple("http://ex/x", "http://ex/R", "http://ex/y");
        store.add(t.clone());
        store.add(t.clone());
        assert_eq!(store.size(), 1);
        assert!(store.contains(&t));
    }

    #[test]
    fn remove_is_noop_when_absent() {
        let mut store = RdfStore::new();
        store.remove(&triple("http://ex/x", "http://ex/R", "http://ex/y"));
        assert_eq!(store.size(), 0);
    }

    #[test]
    fn deletion_inverse() {
        let mut store = RdfStore::new();
        let a = triple("http://ex/a", "http://ex/R", "http://ex/b");
        let b = triple("http://ex/a", "http://ex/R", "http://ex/c");
        store.add(a.clone());
        store.add(b.clone());
        store.remove(&a);
        assert_eq!(store.size(), 1);
        assert!(!store.contains(&a));
        assert!(store.contains(&b));
    }

    #[test]
    fn s2_grid_pattern_matching() {
        let mut store = RdfStore::new();
        for s in ["a", "b"] {
            for o in ["a", "b", "c"] {
                store.add(Triple::new(
                    iri(&format!("http://ex/{s}")),
                    iri("http://ex/A"),
                    iri(&format!("http://ex/{o}")),
                ));
            }
        }
        for o in ["a", "b", "c"] {
            store.add(Triple::new(
                iri("http://ex/c"),
                iri("http://ex/B"),
                iri(&format!("http://ex/{o}")),
            ));
        }
        assert_eq!(store.size(), 9);

        let a_triples: Vec<_> = store
            .find(&Pattern::new(Node::Any, iri("http://ex/A"), Node::Any))
            .collect();
        assert_eq!(a_triples.len(), 6);

        let b_triples: Vec<_> = store
            .find(&Pattern::new(Node::Any, iri("http://ex/B"), Node::Any))
            .collect();
        assert_eq!(b_triples.len(), 3);

        let c_b_triples: Vec<_> = store
            .find(&Pattern::new(iri("http://ex/c"), iri("http://ex/B"), Node::Any))
            .collect();
        assert_eq!(c_b_triples.len(), 3);

        let a_objects: Vec<_> = store
            .find(&Pattern::new(Node::Any, Node::Any, iri("http://ex/a")))
            .collect();
        assert_eq!(a_objects.len(), 3);
    }

    #[test]
    fn s3_numeric_value_equality() {
        let mut store = RdfStore::new();
        let t = Triple::new(
            iri("http://ex/x"),
            iri("http://ex/R"),
            Node::literal(Literal::with_datatype(
                "0.1",
                "http://www.w3.org/2001/XMLSchema#double",
            )),
        );
        store.add(t);
        let p1 = Pattern::new(
            iri("http://ex/x"),
            iri("http://ex/R"),
            Node::literal(Literal::with_datatype(
                "0.10",
                "http://www.w3.org/2001/XMLSchema#double",
            )),
        );
        assert!(store.contains(&p1));
        let p2 = Pattern::new(
            iri("http://ex/x"),
            iri("http://ex/R"),
            Node::literal(Literal::with_datatype(
                "0.11",
                "http://www.w3.org/2001/XMLSchema#double",
            )),
        );
        assert!(!store.contains(&p2));
    }

    #[test]
    fn clear_empties_all_maps() {
        let mut store = RdfStore::new();
        store.add(triple("http://ex/a", "http://ex/p", "http://ex/b"));
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.size(), 0);
        assert!(!store.contains(&Pattern::new(Node::Any, Node::Any, Node::Any)));
    }

    #[test]
    fn any_pre_obj_secondary_threshold_picks_smaller_bunch() {
        let mut config = StoreConfig::default();
        config.t_secondary = 2;
        let mut store = RdfStore::with_config(config);
        for i in 0..5 {
            store.add(Triple::new(
                iri(&format!("http://ex/s{i}")),
                iri("http://ex/p"),
                iri("http://ex/common"),
            ));
        }
        store.add(triple("http://ex/special", "http://ex/rare", "http://ex/common"));
        let found: Vec<_> = store
            .find(&Pattern::new(Node::Any, iri("http://ex/rare"), iri("http://ex/common")))
            .collect();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn copy_is_independent() {
        let mut store = RdfStore::new();
        store.add(triple("http://ex/a", "http://ex/p", "http://ex/b"));
        let mut copy = store.copy();
        copy.add(triple("http://ex/c", "http://ex/p", "http://ex/d"));
        assert_eq!(store.size(), 1);
        assert_eq!(copy.size(), 2);
    }
}
