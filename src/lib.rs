//! An in-memory RDF triple store.
//!
//! Two interchangeable engines share one term/triple model:
//!
//! - [`rdf::RdfStore`] — a classic three-way mirrored index (subject,
//!   predicate, object), good for small-to-medium graphs and fast on
//!   single-position lookups.
//! - [`rdf::RoaringStore`] — a [`roaring`] bitmap posting-list index for
//!   larger graphs, with automatic or manually-triggered index builds.
//!
//! Both implement the [`rdf::Graph`] trait, so application code can be
//! written against one interface and swapped between engines as a graph's
//! scale changes. [`rdf::codec`] streams either engine's contents to and
//! from a compact, dictionary-compressed binary wire format, and
//! [`rdf::GraphBuilder`] adapts a parser's event stream into `Graph::add`
//! calls.
//!
//! # Example
//!
//! ```rust
//! use rdf_triplestore::rdf::{Graph, Node, RdfStore, Triple};
//!
//! let mut store = RdfStore::new();
//! let alice = Node::iri("http://example.org/alice").unwrap();
//! let knows = Node::iri("http://xmlns.com/foaf/0.1/knows").unwrap();
//! let bob = Node::iri("http://example.org/bob").unwrap();
//!
//! store.add(Triple::new(alice.clone(), knows.clone(), bob));
//!
//! let pattern = Triple::new(alice, knows, Node::Any);
//! assert!(store.contains(&pattern));
//! ```

pub mod config;
pub mod error;
pub mod rdf;

pub use config::{IndexingStrategy, StoreConfig};
pub use error::{CodecError, GraphError};
pub use rdf::{
    classify, matches, BitmapTripleIter, Bunch, DecodedRow, Graph, GraphBuilder, IndexedPosition,
    IndexedSet, IndexingKey, Literal, Node, NodeError, NodeMap, Pattern, PatternTag, Quad,
    RdfStore, RoaringStore, StreamReader, StreamWriter, Triple,
};

/// Crate version, as declared in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
