//! RDF term model (C1).
//!
//! A [`Node`] is the unit of data stored at each position of a [`Triple`]. It
//! is also reused, with the `Any` variant, as a pattern wildcard so that
//! [`crate::rdf::pattern`] can classify a `(s, p, o)` triple of `Node`s
//! directly without a parallel "pattern" type.
//!
//! IRI and blank-node syntax is validated through `oxrdf`, mirroring the
//! wrapper style the rest of this crate's lineage uses around that crate,
//! but the term set itself (`Variable`, `Any`) and the value-vs-term
//! equality split are specific to this store.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use oxrdf::{BlankNode as OxBlankNode, NamedNode as OxNamedNode};
use thiserror::Error;

/// Errors constructing [`Node`]s.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    #[error("invalid IRI: {0}")]
    InvalidIri(String),
    #[error("invalid blank node label: {0}")]
    InvalidBlankNode(String),
}

/// An RDF literal value: a lexical form plus either a language tag or a
/// datatype IRI (never both, per RDF 1.1 — a language-tagged literal's
/// implicit datatype is `rdf:langString`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    lexical: Arc<str>,
    language: Option<Arc<str>>,
    datatype: Option<Arc<str>>,
}

const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

/// xsd numeric datatypes whose lexical forms this crate canonicalises for
/// value-equality purposes. Not exhaustive of the XSD type hierarchy, but
/// covers the datatypes that show up in practice.
const NUMERIC_DATATYPES: &[&str] = &[
    "http://www.w3.org/2001/XMLSchema#double",
    "http://www.w3.org/2001/XMLSchema#float",
    "http://www.w3.org/2001/XMLSchema#decimal",
    "http://www.w3.org/2001/XMLSchema#integer",
    "http://www.w3.org/2001/XMLSchema#int",
    "http://www.w3.org/2001/XMLSchema#long",
    "http://www.w3.org/2001/XMLSchema#short",
    "http://www.w3.org/2001/XMLSchema#byte",
    "http://www.w3.org/2001/XMLSchema#nonNegativeInteger",
    "http://www.w3.org/2001/XMLSchema#positiveInteger",
    "http://www.w3.org/2001/XMLSchema#nonPositiveInteger",
    "http://www.w3.org/2001/XMLSchema#negativeInteger",
    "http://www.w3.org/2001/XMLSchema#unsignedLong",
    "http://www.w3.org/2001/XMLSchema#unsignedInt",
];

impl Literal {
    /// A simple (untyped, no language) string literal — implicitly `xsd:string`.
    pub fn simple(value: impl Into<Arc<str>>) -> Self {
        Self {
            lexical: value.into(),
            language: None,
            datatype: None,
        }
    }

    /// A language-tagged literal.
    pub fn with_language(value: impl Into<Arc<str>>, language: impl Into<Arc<str>>) -> Self {
        Self {
            lexical: value.into(),
            language: Some(language.into()),
            datatype: None,
        }
    }

    /// A typed literal with an explicit datatype IRI.
    pub fn with_datatype(value: impl Into<Arc<str>>, datatype: impl Into<Arc<str>>) -> Self {
        Self {
            lexical: value.into(),
            language: None,
            datatype: Some(datatype.into()),
        }
    }

    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Effective datatype: `rdf:langString` for language-tagged literals,
    /// `xsd:string` for simple literals, else the explicit datatype.
    pub fn datatype(&self) -> &str {
        if self.language.is_some() {
            RDF_LANG_STRING
        } else {
            self.datatype.as_deref().unwrap_or(XSD_STRING)
        }
    }

    /// The explicit datatype IRI this literal was constructed with, if
    /// any — `None` for both simple and language-tagged literals. Distinct
    /// from [`Self::datatype`], which fills in the RDF-1.1 implicit
    /// defaults (`xsd:string`, `rdf:langString`); the codec (C8) needs the
    /// un-defaulted form to round-trip a simple literal as simple rather
    /// than as an explicitly `xsd:string`-typed one.
    pub fn explicit_datatype(&self) -> Option<&str> {
        self.datatype.as_deref()
    }

    fn is_numeric(&self) -> bool {
        self.language.is_none() && NUMERIC_DATATYPES.contains(&self.datatype())
    }

    /// Canonical numeric value for value-equality/indexing, if this literal
    /// has a recognised numeric datatype and a parseable lexical form.
    fn canonical_numeric(&self) -> Option<f64> {
        if self.is_numeric() {
            self.lexical.trim().parse::<f64>().ok()
        } else {
            None
        }
    }

    /// Value-equality: same datatype and canonicalised lexical form match.
    /// For non-numeric literals this reduces to exact term equality.
    pub fn value_eq(&self, other: &Literal) -> bool {
        if self.datatype() != other.datatype() {
            return false;
        }
        match (self.canonical_numeric(), other.canonical_numeric()) {
            (Some(a), Some(b)) => a == b,
            _ => self.lexical == other.lexical && self.language == other.language,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(lang) = &self.language {
            write!(f, "\"{}\"@{}", self.lexical, lang)
        } else if let Some(dt) = &self.datatype {
            write!(f, "\"{}\"^^<{}>", self.lexical, dt)
        } else {
            write!(f, "\"{}\"", self.lexical)
        }
    }
}

/// A canonical key used to bucket nodes that may be value-equal into the
/// same hash bucket (C1 "indexing value"). Kept distinct from [`Node`]
/// itself so hashing and term equality never get accidentally fused (see
/// DESIGN.md).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexingKey {
    Iri(Arc<str>),
    Blank(Arc<str>),
    Variable(Arc<str>),
    Any,
    Literal {
        lexical: Arc<str>,
        language: Option<Arc<str>>,
        datatype: Arc<str>,
    },
    /// Numeric literals index on `(datatype, bit pattern of canonical f64)`
    /// rather than lexical form, so `"0.1"` and `"0.10"` land in the same
    /// bucket.
    NumericLiteral { datatype: Arc<str>, bits: u64 },
}

/// An RDF term: IRI, blank node, literal, query variable, or the `Any`
/// wildcard used in patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Iri(Arc<str>),
    Blank(Arc<str>),
    Literal(Literal),
    Variable(Arc<str>),
    /// Wildcard: matches anything. Only meaningful inside a pattern, never
    /// stored as part of a triple actually inserted into a store.
    Any,
}

impl Node {
    pub fn iri(value: &str) -> Result<Self, NodeError> {
        OxNamedNode::new(value)
            .map(|n| Node::Iri(Arc::from(n.into_string())))
            .map_err(|e| NodeError::InvalidIri(e.to_string()))
    }

    /// Build an IRI node without re-validating syntax. Callers must ensure
    /// `value` is already a valid IRI (e.g. it came out of a trusted
    /// dictionary that validated on the way in).
    pub fn iri_unchecked(value: impl Into<Arc<str>>) -> Self {
        Node::Iri(value.into())
    }

    pub fn blank(label: &str) -> Result<Self, NodeError> {
        OxBlankNode::new(label)
            .map(|n| Node::Blank(Arc::from(n.as_str())))
            .map_err(|e| NodeError::InvalidBlankNode(e.to_string()))
    }

    pub fn blank_unchecked(label: impl Into<Arc<str>>) -> Self {
        Node::Blank(label.into())
    }

    pub fn variable(name: impl Into<Arc<str>>) -> Self {
        Node::Variable(name.into())
    }

    pub fn literal(lit: Literal) -> Self {
        Node::Literal(lit)
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Node::Any)
    }

    /// Term equality: same variant, all fields equal exactly (lexical
    /// strings compared as-is, no canonicalisation). This is the `PartialEq`
    /// this type derives from field equality — exposed under its own name
    /// to contrast explicitly with [`Node::value_eq`].
    pub fn term_eq(&self, other: &Node) -> bool {
        self == other
    }

    /// Value equality: identical to term equality except for literals with
    /// a recognised numeric datatype, where lexical forms are compared
    /// after canonicalisation (see [`Literal::value_eq`]).
    pub fn value_eq(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Literal(a), Node::Literal(b)) => a.value_eq(b),
            _ => self == other,
        }
    }

    /// The hashable grouping key used by node-keyed maps (C4) and by this
    /// type's own [`Hash`] impl.
    pub fn indexing_value(&self) -> IndexingKey {
        match self {
            Node::Iri(s) => IndexingKey::Iri(s.clone()),
            Node::Blank(s) => IndexingKey::Blank(s.clone()),
            Node::Variable(s) => IndexingKey::Variable(s.clone()),
            Node::Any => IndexingKey::Any,
            Node::Literal(lit) => match lit.canonical_numeric() {
                Some(n) => IndexingKey::NumericLiteral {
                    datatype: Arc::from(lit.datatype()),
                    bits: canonical_f64_bits(n),
                },
                None => IndexingKey::Literal {
                    lexical: lit.lexical.clone(),
                    language: lit.language.clone(),
                    datatype: Arc::from(lit.datatype()),
                },
            },
        }
    }
}

/// Normalises `-0.0` to `0.0` before taking the bit pattern so that the two
/// hash to the same bucket (they are numerically `==`).
fn canonical_f64_bits(n: f64) -> u64 {
    if n == 0.0 {
        0.0f64.to_bits()
    } else {
        n.to_bits()
    }
}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.indexing_value().hash(state)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Iri(s) => write!(f, "<{}>", s),
            Node::Blank(s) => write!(f, "_:{}", s),
            Node::Literal(lit) => write!(f, "{}", lit),
            Node::Variable(s) => write!(f, "?{}", s),
            Node::Any => write!(f, "*"),
        }
    }
}
