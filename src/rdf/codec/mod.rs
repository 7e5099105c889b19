//! Streaming binary codec (C8): a length-delimited, dictionary-compressed
//! wire format for triples, quads, prefix/base declarations, and SPARQL
//! result rows. See `SPEC_FULL.md` §4.5.

mod dictionary;
mod stream;
mod wire;

pub use dictionary::{StringDictionaryReader, StringDictionaryWriter};
pub use stream::{DecodedRow, StreamReader, StreamWriter};
pub use wire::{DataTuple, StreamRow, VarTuple, WireQuad, WireTerm, WireTriple};
