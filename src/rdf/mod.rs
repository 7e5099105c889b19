//! In-memory RDF triple store engine.
//!
//! The data model (C1: [`node::Node`]/[`node::Literal`], C2: [`bunch::Bunch`])
//! is shared by two index strategies built on top of it: a classic
//! three-way mirrored index ([`store::RdfStore`], C5) and a roaring-bitmap
//! posting-list index for larger graphs ([`roaring_store::RoaringStore`],
//! C6), unified behind the [`graph::Graph`] trait. [`codec`] (C8) streams
//! either one to/from a compact binary wire format, and [`builder`] (C12)
//! adapts a parser's `start/finish/prefix/base/triple/quad` event sequence
//! into `Graph::add` calls.

pub mod bunch;
pub mod builder;
pub mod codec;
pub mod graph;
pub mod indexed_set;
pub mod node;
pub mod node_map;
pub mod pattern;
pub mod roaring_store;
pub mod store;
pub mod triple;

pub use bunch::{Bunch, IndexedPosition};
pub use builder::{GraphBuilder, Quad};
pub use codec::{DecodedRow, StreamReader, StreamWriter};
pub use graph::Graph;
pub use indexed_set::{IndexOutcome, IndexedSet};
pub use node::{IndexingKey, Literal, Node, NodeError};
pub use node_map::NodeMap;
pub use pattern::{classify, matches, PatternTag};
pub use roaring_store::{BitmapTripleIter, RoaringStore};
pub use store::RdfStore;
pub use triple::{Pattern, Triple};
