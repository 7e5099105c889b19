//! Streaming event ingestion (C12).
//!
//! The glue a Turtle/RDF-XML parser (not part of this crate) would drive:
//! `start()`/`finish()` bracket a parse session, inside which `prefix`,
//! `base`, `triple`, and `quad` calls populate a [`Graph`]. Calls outside
//! a `start..finish` window are a protocol error, not a panic — an
//! external parser is exactly the kind of untrusted caller §7 expects to
//! surface `GraphError`s to rather than abort on.

use super::graph::Graph;
use super::node::Node;
use super::triple::Triple;
use crate::error::GraphError;

/// A triple plus an optional named graph. This crate has no notion of
/// named graphs in its stores (quads are out of scope per §1's
/// non-goals), so [`GraphBuilder::quad`] stores only `quad.triple` and
/// discards `quad.graph` — kept on the type so a caller's parser-event
/// stream (which does carry graph IRIs) can be handed to this builder
/// without a separate quad-stripping step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quad {
    pub graph: Option<Node>,
    pub triple: Triple,
}

impl Quad {
    pub fn new(triple: Triple, graph: Option<Node>) -> Self {
        Self { graph, triple }
    }
}

/// Feeds `start/finish/prefix/base/triple/quad` parser events into a
/// [`Graph`]. `Prefix`/`Base` declarations are recorded but not resolved
/// (prefix maps are an opaque external collaborator per §1) — callers
/// that need compact-IRI expansion do it before calling `triple`/`quad`.
pub struct GraphBuilder<G: Graph> {
    target: G,
    depth: u32,
    prefixes: Vec<(String, String)>,
    base: Option<String>,
}

impl<G: Graph> GraphBuilder<G> {
    pub fn new(target: G) -> Self {
        Self {
            target,
            depth: 0,
            prefixes: Vec::new(),
            base: None,
        }
    }

    /// Opens a (possibly nested) ingestion window.
    pub fn start(&mut self) {
        self.depth += 1;
    }

    /// Closes one ingestion window. Fails if there is no matching `start`.
    pub fn finish(&mut self) -> Result<(), GraphError> {
        if self.depth == 0 {
            return Err(GraphError::ProtocolViolation(
                "finish() called without a matching start()".to_string(),
            ));
        }
        self.depth -= 1;
        Ok(())
    }

    pub fn prefix(&mut self, name: impl Into<String>, iri: impl Into<String>) -> Result<(), GraphError> {
        self.ensure_open()?;
        self.prefixes.push((name.into(), iri.into()));
        Ok(())
    }

    pub fn base(&mut self, iri: impl Into<String>) -> Result<(), GraphError> {
        self.ensure_open()?;
        self.base = Some(iri.into());
        Ok(())
    }

    pub fn triple(&mut self, t: Triple) -> Result<(), GraphError> {
        self.ensure_open()?;
        self.target.add(t);
        Ok(())
    }

    pub fn quad(&mut self, q: Quad) -> Result<(), GraphError> {
        self.ensure_open()?;
        self.target.add(q.triple);
        Ok(())
    }

    pub fn prefixes(&self) -> &[(String, String)] {
        &self.prefixes
    }

    pub fn base_iri(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// Unwraps the builder, handing back the populated store.
    pub fn into_inner(self) -> G {
        self.target
    }

    pub fn inner(&self) -> &G {
        &self.target
    }

    fn ensure_open(&self) -> Result<(), GraphError> {
        if self.depth == 0 {
            Err(GraphError::ProtocolViolation(
                "triple/quad/prefix/base event outside any start()..finish() window".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}
