//! `Graph` trait: the public surface shared by [`RdfStore`] (C5) and
//! [`RoaringStore`] (C6) (§6 "Graph API").
//!
//! The two stores' inherent APIs are not signature-identical — C6's
//! `Automatic` indexing strategy may need to build its bitmap index on the
//! first query, so its query methods take `&mut self` and are fallible
//! (`PreconditionViolation` in `Manual` mode), while C5's bunch-based
//! lookups never fail and never need mutation. This trait normalises both
//! to the stricter shape (`&mut self`, fallible) so callers can write code
//! generic over either store; each inherent API remains the more ergonomic
//! choice for callers who only ever use one store concretely.

use super::roaring_store::RoaringStore;
use super::store::RdfStore;
use super::triple::{Pattern, Triple};
use crate::error::GraphError;

/// Common triple-store surface. See module docs for why `contains`/`find`
/// are `&mut self` and fallible even though `RdfStore`'s own inherent
/// methods are neither.
pub trait Graph {
    /// Idempotent. No return.
    fn add(&mut self, triple: Triple);

    /// No-op if `triple` is absent.
    fn delete(&mut self, triple: &Triple);

    /// Pattern positions may be [`super::node::Node::Any`].
    fn contains(&mut self, pattern: &Pattern) -> Result<bool, GraphError>;

    /// Total distinct triple count.
    fn size(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Removes all triples.
    fn clear(&mut self);

    /// Lazy, finite, non-restartable. Each item is fallible: C6's bitmap
    /// iterator surfaces [`GraphError::ConcurrentModification`] if the
    /// backing indexed set changes shape mid-iteration (never happens for
    /// C5, which always yields `Ok`).
    fn find(
        &mut self,
        pattern: &Pattern,
    ) -> Result<Box<dyn Iterator<Item = Result<Triple, GraphError>> + '_>, GraphError>;

    /// Same contract as [`Self::find`] — kept as a distinct name to match
    /// §6's `find`/`stream` split in the distilled interface table.
    fn stream(
        &mut self,
        pattern: &Pattern,
    ) -> Result<Box<dyn Iterator<Item = Result<Triple, GraphError>> + '_>, GraphError> {
        self.find(pattern)
    }

    /// Deep copy; independent thereafter.
    fn copy(&self) -> Self
    where
        Self: Sized;
}

impl Graph for RdfStore {
    fn add(&mut self, triple: Triple) {
        RdfStore::add(self, triple)
    }

    fn delete(&mut self, triple: &Triple) {
        RdfStore::remove(self, triple)
    }

    fn contains(&mut self, pattern: &Pattern) -> Result<bool, GraphError> {
        Ok(RdfStore::contains(self, pattern))
    }

    fn size(&self) -> usize {
        RdfStore::size(self)
    }

    fn clear(&mut self) {
        RdfStore::clear(self)
    }

    fn find(
        &mut self,
        pattern: &Pattern,
    ) -> Result<Box<dyn Iterator<Item = Result<Triple, GraphError>> + '_>, GraphError> {
        Ok(Box::new(RdfStore::find(self, pattern).map(Ok)))
    }

    fn copy(&self) -> Self {
        RdfStore::copy(self)
    }
}

impl Graph for RoaringStore {
    fn add(&mut self, triple: Triple) {
        RoaringStore::add(self, triple)
    }

    fn delete(&mut self, triple: &Triple) {
        RoaringStore::remove(self, triple)
    }

    fn contains(&mut self, pattern: &Pattern) -> Result<bool, GraphError> {
        RoaringStore::contains(self, pattern)
    }

    fn size(&self) -> usize {
        RoaringStore::size(self)
    }

    fn clear(&mut self) {
        RoaringStore::clear(self)
    }

    fn find(
        &mut self,
        pattern: &Pattern,
    ) -> Result<Box<dyn Iterator<Item = Result<Triple, GraphError>> + '_>, GraphError> {
        let iter = RoaringStore::find(self, pattern)?;
        Ok(Box::new(iter))
    }

    fn copy(&self) -> Self {
        RoaringStore::copy(self)
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

    fn exercise(mut g: impl Graph) {
        let t = triple("http://ex/a", "http://ex/p", "http://ex/b");
        g.add(t.clone());
        assert_eq!(g.size(), 1);
        assert_eq!(g.contains(&t), Ok(true));
        let found: Vec<_> = g
            .find(&Pattern::new(Node::Any, Node::Any, Node::Any))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(found, vec![t.clone()]);
        g.delete(&t);
        assert!(g.is_empty());
    }

    #[test]
    fn c5_c6_satisfy_the_same_graph_contract() {
        exercise(RdfStore::new());
        exercise(RoaringStore::new());
    }
}
