//! Wire schema (§4.5): the `serde`-derived shapes that get `bincode`-encoded
//! into each length-delimited frame. All strings are referenced by
//! dictionary index rather than embedded inline.

use serde::{Deserialize, Serialize};

/// A single positional term, dictionary-index-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireTerm {
    Iri {
        iri_dict_index: usize,
    },
    Blank {
        label_dict_index: usize,
    },
    Literal {
        lex_dict_index: usize,
        lang_dict_index: Option<usize>,
        datatype_dict_index: Option<usize>,
        /// A compact-IRI reference into an external prefix table. This
        /// crate never resolves prefixes (§1 non-goals), so it always
        /// writes `None` and treats any value it reads back as opaque.
        prefixed_name_ref: Option<usize>,
    },
    Variable {
        name_dict_index: usize,
    },
    /// An absent binding in a SPARQL result row.
    Undefined,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTriple {
    pub subject: WireTerm,
    pub predicate: WireTerm,
    pub object: WireTerm,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireQuad {
    pub graph: Option<WireTerm>,
    pub subject: WireTerm,
    pub predicate: WireTerm,
    pub object: WireTerm,
}

/// One SPARQL result row: each binding is `Some(term)` or `Undefined` for
/// an unbound variable. `strings` carries any dictionary entries newly
/// interned while encoding this row, embedded directly rather than as a
/// preceding frame (unlike [`StreamRow::StringDictBatch`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTuple {
    pub row: Vec<WireTerm>,
    pub strings: Option<Vec<String>>,
}

/// Result-set header: the ordered list of variable names, emitted once
/// before any [`DataTuple`] rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarTuple {
    pub vars: Vec<WireTerm>,
    pub strings: Option<Vec<String>>,
}

/// The one type ever handed to `bincode` per frame — every row on the
/// wire, whatever its logical kind, is a `StreamRow`. `VarTuple`/
/// `DataTuple` are folded in as variants (`Vars`/`Data`) rather than kept
/// as separately-framed top-level types, since `bincode` frames are not
/// self-describing across distinct Rust types: one stream can only
/// multiplex several logical row kinds if they are all variants of a
/// single enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamRow {
    Prefix {
        name_dict_index: usize,
        iri_dict_index: usize,
    },
    Base {
        iri_dict_index: usize,
    },
    Triple(WireTriple),
    Quad(WireQuad),
    /// New dictionary entries, flushed just ahead of the row that first
    /// references them.
    StringDictBatch {
        strings: Vec<String>,
    },
    Vars(VarTuple),
    Data(DataTuple),
}
