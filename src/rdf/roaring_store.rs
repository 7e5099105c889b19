//! Roaring triple store (C6).
//!
//! Trades memory for sub-linear pattern matching on large graphs: triples
//! live once in an [`IndexedSet`], and three [`NodeMap`]s of
//! [`RoaringBitmap`] posting lists (keyed by subject, predicate, object)
//! hold the set's dense integer indices rather than the triples
//! themselves. Two-position patterns resolve to a bitmap intersection
//! instead of a bunch scan.

use std::collections::VecDeque;
use std::time::Instant;

use roaring::RoaringBitmap;
use tracing::{info, trace, warn};

use crate::config::{IndexingStrategy, StoreConfig};
use crate::error::GraphError;

use super::indexed_set::{IndexOutcome, IndexedSet};
use super::node::Node;
use super::node_map::NodeMap;
use super::pattern::{self, PatternTag};
use super::triple::{Pattern, Triple};

/// The three node→bitmap posting-list maps. Absent entirely until the
/// first query that needs it (`Automatic`) or until an explicit
/// [`RoaringStore::rebuild_index`] (`Manual`).
struct RoaringIndex {
    by_s: NodeMap<RoaringBitmap>,
    by_p: NodeMap<RoaringBitmap>,
    by_o: NodeMap<RoaringBitmap>,
}

impl RoaringIndex {
    fn empty() -> Self {
        Self {
            by_s: NodeMap::new(),
            by_p: NodeMap::new(),
            by_o: NodeMap::new(),
        }
    }
}

impl Clone for RoaringIndex {
    fn clone(&self) -> Self {
        Self {
            by_s: self.by_s.clone(),
            by_p: self.by_p.clone(),
            by_o: self.by_o.clone(),
        }
    }
}

/// Bitmap-backed triple store for large graphs (`IndexingStrategy` in
/// [`crate::config`]).
pub struct RoaringStore {
    triples: IndexedSet<Triple>,
    index: Option<RoaringIndex>,
    config: StoreConfig,
}

impl Clone for RoaringStore {
    fn clone(&self) -> Self {
        Self {
            triples: self.triples.clone(),
            index: self.index.clone(),
            config: self.config.clone(),
        }
    }
}

impl RoaringStore {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            triples: IndexedSet::new(),
            index: None,
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn size(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Whether the bitmap index currently exists (always true after a
    /// query in `Automatic` mode; only true after an explicit
    /// [`Self::rebuild_index`] in `Manual` mode).
    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }

    pub fn add(&mut self, t: Triple) {
        let outcome = self.triples.add_and_get_index(t.clone());
        let IndexOutcome::Inserted(i) = outcome else {
            return;
        };
        trace!(triple = %t, index = i, "roaring_store.add");
        if let Some(idx) = &mut self.index {
            let i = i as u32;
            idx.by_s.compute_if_absent(t.subject, RoaringBitmap::new).insert(i);
            idx.by_p.compute_if_absent(t.predicate, RoaringBitmap::new).insert(i);
            idx.by_o.compute_if_absent(t.object, RoaringBitmap::new).insert(i);
        }
    }

    pub fn remove(&mut self, t: &Triple) {
        let Some(i) = self.triples.remove_and_get_index(t) else {
            return;
        };
        trace!(triple = %t, index = i, "roaring_store.remove");
        if let Some(idx) = &mut self.index {
            let i = i as u32;
            remove_from_bitmap_map(&mut idx.by_s, &t.subject, i);
            remove_from_bitmap_map(&mut idx.by_p, &t.predicate, i);
            remove_from_bitmap_map(&mut idx.by_o, &t.object, i);
        }
    }

    pub fn clear(&mut self) {
        self.triples = IndexedSet::new();
        self.index = None;
    }

    /// Builds (or rebuilds) the full bitmap index from the current triple
    /// set, fanning the three positions out across `rayon` tasks that join
    /// before this returns (§5: the indexed set is read-only for the
    /// duration, the three maps are disjoint writes).
    pub fn rebuild_index(&mut self) {
        let start = Instant::now();
        let entries: Vec<(usize, &Triple)> = self.triples.iter().collect();
        let count = entries.len();

        let (by_s, (by_p, by_o)) = rayon::join(
            || build_bitmap_map(&entries, |t| t.subject.clone()),
            || {
                rayon::join(
                    || build_bitmap_map(&entries, |t| t.predicate.clone()),
                    || build_bitmap_map(&entries, |t| t.object.clone()),
                )
            },
        );
        self.index = Some(RoaringIndex { by_s, by_p, by_o });
        info!(
            triples = count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "roaring_store.rebuild_index complete"
        );
    }

    /// Ensures a bitmap index is available, building it lazily under
    /// `Automatic` strategy. Under `Manual` strategy, fails with
    /// `PreconditionViolation` if [`Self::rebuild_index`] has not been
    /// called yet.
    fn ensure_index(&mut self) -> Result<&RoaringIndex, GraphError> {
        if self.index.is_none() {
            match self.config.indexing_strategy {
                IndexingStrategy::Automatic => self.rebuild_index(),
                IndexingStrategy::Manual => {
                    return Err(GraphError::PreconditionViolation(
                        "bitmap index not built; call rebuild_index() in Manual mode".to_string(),
                    ));
                }
            }
        }
        Ok(self.index.as_ref().unwrap())
    }

    pub fn contains(&mut self, pattern: &Pattern) -> Result<bool, GraphError> {
        match pattern::classify(pattern) {
            PatternTag::SubPreObj => Ok(triples_contain_value_eq(&self.triples, pattern)),
            PatternTag::AnyAnyAny => Ok(!self.triples.is_empty()),
            PatternTag::SubAnyAny => Ok(self.ensure_index()?.by_s.contains_key(&pattern.subject)),
            PatternTag::AnyPreAny => Ok(self.ensure_index()?.by_p.contains_key(&pattern.predicate)),
            PatternTag::AnyAnyObj => Ok(self.ensure_index()?.by_o.contains_key(&pattern.object)),
            PatternTag::SubPreAny => {
                let idx = self.ensure_index()?;
                Ok(bitmaps_intersect(
                    idx.by_s.get(&pattern.subject),
                    idx.by_p.get(&pattern.predicate),
                ))
            }
            PatternTag::SubAnyObj => {
                let idx = self.ensure_index()?;
                Ok(bitmaps_intersect(
                    idx.by_s.get(&pattern.subject),
                    idx.by_o.get(&pattern.object),
                ))
            }
            PatternTag::AnyPreObj => {
                let idx = self.ensure_index()?;
                Ok(bitmaps_intersect(
                    idx.by_p.get(&pattern.predicate),
                    idx.by_o.get(&pattern.object),
                ))
            }
        }
    }

    /// Lazy, finite, non-restartable iterator over matching triples. Each
    /// item is fallible: a mid-iteration structural change to the backing
    /// indexed set (detected via its generation counter) surfaces
    /// `GraphError::ConcurrentModification` once, then the iterator ends.
    pub fn find(&mut self, pattern: &Pattern) -> Result<BitmapTripleIter<'_>, GraphError> {
        let generation = self.triples.generation();
        match pattern::classify(pattern) {
            PatternTag::SubPreObj => {
                let matched = match self.triples.index_of(pattern) {
                    Some(idx) => self.triples.get_key_at(idx).cloned().into_iter().collect(),
                    None => self
                        .triples
                        .iter()
                        .filter(|(_, t)| pattern::matches(pattern, t))
                        .map(|(_, t)| t.clone())
                        .collect(),
                };
                Ok(BitmapTripleIter::materialized(matched))
            }
            PatternTag::AnyAnyAny => {
                let all: Vec<Triple> = self.triples.iter().map(|(_, t)| t.clone()).collect();
                Ok(BitmapTripleIter::materialized(all))
            }
            PatternTag::SubAnyAny => {
                let idx = self.ensure_index()?;
                let bitmap = idx.by_s.get(&pattern.subject).cloned().unwrap_or_default();
                Ok(BitmapTripleIter::over_bitmap(bitmap, &self.triples, generation))
            }
            PatternTag::AnyPreAny => {
                let idx = self.ensure_index()?;
                let bitmap = idx.by_p.get(&pattern.predicate).cloned().unwrap_or_default();
                Ok(BitmapTripleIter::over_bitmap(bitmap, &self.triples, generation))
            }
            PatternTag::AnyAnyObj => {
                let idx = self.ensure_index()?;
                let bitmap = idx.by_o.get(&pattern.object).cloned().unwrap_or_default();
                Ok(BitmapTripleIter::over_bitmap(bitmap, &self.triples, generation))
            }
            PatternTag::SubPreAny => {
                let idx = self.ensure_index()?;
                let bitmap = intersect(idx.by_s.get(&pattern.subject), idx.by_p.get(&pattern.predicate));
                Ok(BitmapTripleIter::over_bitmap(bitmap, &self.triples, generation))
            }
            PatternTag::SubAnyObj => {
                let idx = self.ensure_index()?;
                let bitmap = intersect(idx.by_s.get(&pattern.subject), idx.by_o.get(&pattern.object));
                Ok(BitmapTripleIter::over_bitmap(bitmap, &self.triples, generation))
            }
            PatternTag::AnyPreObj => {
                let idx = self.ensure_index()?;
                let bitmap = intersect(idx.by_p.get(&pattern.predicate), idx.by_o.get(&pattern.object));
                Ok(BitmapTripleIter::over_bitmap(bitmap, &self.triples, generation))
            }
        }
    }

    pub fn stream(&mut self, pattern: &Pattern) -> Result<BitmapTripleIter<'_>, GraphError> {
        self.find(pattern)
    }

    /// Deep copy, independent thereafter. Node payloads are `Arc`-backed
    /// and shared cheaply rather than physically duplicated.
    pub fn copy(&self) -> Self {
        self.clone()
    }
}

impl Default for RoaringStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `triples` holds a member matching `pattern` under value
/// equality. `IndexedSet::contains` is an O(1) *term*-equality lookup and
/// covers the common case — any pattern whose literal positions already
/// use the same lexical form as the stored triple. It only misses when a
/// numeric literal is queried in a different, value-equal lexical form
/// (e.g. `"0.10"` against a stored `"0.1"`), which is why this falls back
/// to a full scan rather than trusting a `false` from the fast path.
fn triples_contain_value_eq(triples: &IndexedSet<Triple>, pattern: &Triple) -> bool {
    triples.contains(pattern) || triples.iter().any(|(_, t)| pattern::matches(pattern, t))
}

fn remove_from_bitmap_map(map: &mut NodeMap<RoaringBitmap>, node: &Node, i: u32) {
    if let Some(bitmap) = map.get_mut(node) {
        bitmap.remove(i);
        if bitmap.is_empty() {
            map.remove(node);
        }
    }
}

fn build_bitmap_map(
    entries: &[(usize, &Triple)],
    key_fn: impl Fn(&Triple) -> Node,
) -> NodeMap<RoaringBitmap> {
    let mut map = NodeMap::new();
    for (i, t) in entries {
        map.compute_if_absent(key_fn(t), RoaringBitmap::new).insert(*i as u32);
    }
    map
}

/// Bitmap-intersects test: true if the two posting lists share any
/// member, without materialising the intersection.
fn bitmaps_intersect(a: Option<&RoaringBitmap>, b: Option<&RoaringBitmap>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => !a.is_disjoint(b),
        _ => false,
    }
}

fn intersect(a: Option<&RoaringBitmap>, b: Option<&RoaringBitmap>) -> RoaringBitmap {
    match (a, b) {
        (Some(a), Some(b)) => {
            let mut out = a.clone();
            out &= b;
            out
        }
        _ => RoaringBitmap::new(),
    }
}

/// Batches output (256 ids at a time) to amortise dispatch, resolving each
/// batch of indices against the backing [`IndexedSet`] and checking its
/// generation counter at every refill so a structural mutation mid-iteration
/// surfaces as [`GraphError::ConcurrentModification`] instead of yielding
/// stale data.
pub struct BitmapTripleIter<'a> {
    inner: IterSource<'a>,
}

enum IterSource<'a> {
    Materialized(std::vec::IntoIter<Triple>),
    Bitmap {
        ids: roaring::bitmap::IntoIter,
        triples: &'a IndexedSet<Triple>,
        expected_generation: u64,
        batch: VecDeque<u32>,
        poisoned: bool,
    },
}

const BATCH_SIZE: usize = 256;

impl<'a> BitmapTripleIter<'a> {
    fn materialized(items: Vec<Triple>) -> Self {
        Self {
            inner: IterSource::Materialized(items.into_iter()),
        }
    }

    fn over_bitmap(bitmap: RoaringBitmap, triples: &'a IndexedSet<Triple>, generation: u64) -> Self {
        Self {
            inner: IterSource::Bitmap {
                ids: bitmap.into_iter(),
                triples,
                expected_generation: generation,
                batch: VecDeque::with_capacity(BATCH_SIZE),
                poisoned: false,
            },
        }
    }
}

impl<'a> Iterator for BitmapTripleIter<'a> {
    type Item = Result<Triple, GraphError>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            IterSource::Materialized(it) => it.next().map(Ok),
            IterSource::Bitmap {
                ids,
                triples,
                expected_generation,
                batch,
                poisoned,
            } => {
                if *poisoned {
                    return None;
                }
                if batch.is_empty() {
                    if triples.generation() != *expected_generation {
                        *poisoned = true;
                        warn!("concurrent modification detected during bitmap iteration");
                        return Some(Err(GraphError::ConcurrentModification));
                    }
                    for _ in 0..BATCH_SIZE {
                        match ids.next() {
                            Some(id) => batch.push_back(id),
                            None => break,
                        }
                    }
                    if batch.is_empty() {
                        return None;
                    }
                }
                let id = batch.pop_front().unwrap();
                match triples.get_key_at(id as usize) {
                    Some(t) => Some(Ok(t.clone())),
                    None => {
                        *poisoned = true;
                        warn!("concurrent modification detected during bitmap iteration");
                        Some(Err(GraphError::ConcurrentModification))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::node::Node;

    fn iri(s: &str) -> Node {
        Node::iri(s).unwrap()
    }

    fn triple(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(iri(s), iri(p), iri(o))
    }

    #[test]
    fn automatic_mode_builds_index_lazily() {
        let mut store = RoaringStore::new();
        store.add(triple("http://ex/a", "http://ex/p", "http://ex/b"));
        assert!(!store.has_index());
        let found = store.contains(&Pattern::new(iri("http://ex/a"), Node::Any, Node::Any));
        assert_eq!(found, Ok(true));
        assert!(store.has_index());
    }

    #[test]
    fn manual_mode_requires_explicit_rebuild() {
        let mut config = StoreConfig::default();
        config.indexing_strategy = IndexingStrategy::Manual;
        let mut store = RoaringStore::with_config(config);
        store.add(triple("http://ex/a", "http://ex/p", "http://ex/b"));

        let err = store.contains(&Pattern::new(iri("http://ex/a"), Node::Any, Node::Any));
        assert!(matches!(err, Err(GraphError::PreconditionViolation(_))));

        store.rebuild_index();
        let found = store.contains(&Pattern::new(iri("http://ex/a"), Node::Any, Node::Any));
        assert_eq!(found, Ok(true));
    }

    #[test]
    fn two_position_pattern_uses_bitmap_intersection() {
        let mut store = RoaringStore::new();
        store.add(triple("http://ex/a", "http://ex/p", "http://ex/x"));
        store.add(triple("http://ex/a", "http://ex/q", "http://ex/y"));
        store.rebuild_index();

        let results: Vec<_> = store
            .find(&Pattern::new(iri("http://ex/a"), iri("http://ex/p"), Node::Any))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].object, iri("http://ex/x"));
    }

    #[test]
    fn bitmap_iteration_batches_across_more_than_one_page() {
        let mut store = RoaringStore::new();
        for i in 0..600 {
            store.add(triple("http://ex/shared", "http://ex/p", &format!("http://ex/o{i}")));
        }
        store.rebuild_index();

        let results: Vec<_> = store
            .find(&Pattern::new(iri("http://ex/shared"), Node::Any, Node::Any))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(results.len(), 600);
    }

    /// A true concurrent mutation during live iteration is a borrow-checker
    /// error in safe Rust (the iterator holds `&IndexedSet`, `remove` needs
    /// `&mut`) — the scenario §4.3 describes can only arise from a stale
    /// generation snapshot, which is what this exercises directly.
    #[test]
    fn generation_mismatch_is_detected_as_concurrent_modification() {
        let mut triples = IndexedSet::new();
        triples.add_and_get_index(triple("http://ex/a", "http://ex/p", "http://ex/b"));
        let stale_generation = triples.generation();

        let mut bitmap = RoaringBitmap::new();
        bitmap.insert(0);
        triples.add_and_get_index(triple("http://ex/c", "http://ex/p", "http://ex/d"));

        let mut iter = BitmapTripleIter::over_bitmap(bitmap, &triples, stale_generation);
        assert_eq!(iter.next(), Some(Err(GraphError::ConcurrentModification)));
        assert_eq!(iter.next(), None, "iteration stops after surfacing the error");
    }

    #[test]
    fn remove_drops_empty_bitmap_entries() {
        let mut store = RoaringStore::new();
        let t = triple("http://ex/a", "http://ex/p", "http://ex/b");
        store.add(t.clone());
        store.rebuild_index();
        store.remove(&t);
        assert_eq!(store.contains(&Pattern::new(iri("http://ex/a"), Node::Any, Node::Any)), Ok(false));
    }

    #[test]
    fn s3_numeric_value_equality() {
        use crate::rdf::node::Literal;

        let mut store = RoaringStore::new();
        let t = Triple::new(
            iri("http://ex/x"),
            iri("http://ex/R"),
            Node::literal(Literal::with_datatype("0.1", "http://www.w3.org/2001/XMLSchema#double")),
        );
        store.add(t);

        let p1 = Pattern::new(
            iri("http://ex/x"),
            iri("http://ex/R"),
            Node::literal(Literal::with_datatype("0.10", "http://www.w3.org/2001/XMLSchema#double")),
        );
        assert_eq!(store.contains(&p1), Ok(true));
        let found: Vec<_> = store.find(&p1).unwrap().collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(found.len(), 1);

        let p2 = Pattern::new(
            iri("http://ex/x"),
            iri("http://ex/R"),
            Node::literal(Literal::with_datatype("0.11", "http://www.w3.org/2001/XMLSchema#double")),
        );
        assert_eq!(store.contains(&p2), Ok(false));
    }

    #[test]
    fn copy_is_independent() {
        let mut store = RoaringStore::new();
        store.add(triple("http://ex/a", "http://ex/p", "http://ex/b"));
        store.rebuild_index();
        let mut copy = store.copy();
        copy.add(triple("http://ex/c", "http://ex/p", "http://ex/d"));
        assert_eq!(store.size(), 1);
        assert_eq!(copy.size(), 2);
    }
}
