//! Store configuration (C10).

use serde::{Deserialize, Serialize};

/// How [`crate::rdf::roaring_store::RoaringStore`] builds its bitmap index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexingStrategy {
    /// Build the bitmap index lazily, on the first pattern query that needs
    /// it. Simplest for interactive use.
    Automatic,
    /// The caller must invoke `rebuild_index()` explicitly; queries against
    /// a missing index fail with `GraphError::PreconditionViolation`. Lets
    /// a bulk loader insert millions of triples without paying per-insert
    /// indexing cost.
    Manual,
}

impl Default for IndexingStrategy {
    fn default() -> Self {
        IndexingStrategy::Automatic
    }
}

/// Tunable thresholds shared by the classic (C5) and roaring (C6) stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Array-to-hashed-bunch migration threshold for subject-indexed bunches.
    pub t_bunch_subject: usize,
    /// Array-to-hashed-bunch migration threshold for predicate- and
    /// object-indexed bunches.
    pub t_bunch_po: usize,
    /// Above this many triples in the larger of two candidate bunches, an
    /// `AnyPreObj` lookup iterates the *smaller* bunch and probes the other
    /// instead of scanning the larger one outright. Empirically tuned in
    /// the system this crate is descended from; not hard-coded without a
    /// benchmark of your own workload (see `DESIGN.md`, Open Questions).
    pub t_secondary: usize,
    /// Indexing strategy for the roaring store. Unused by the classic store.
    pub indexing_strategy: IndexingStrategy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            t_bunch_subject: 16,
            t_bunch_po: 32,
            t_secondary: 400,
            indexing_strategy: IndexingStrategy::Automatic,
        }
    }
}
