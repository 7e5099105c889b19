//! Length-delimited framing (§4.5 "Framing") over `std::io::Read`/`Write`.
//!
//! Each frame is a 4-byte little-endian length prefix followed by that
//! many bytes of `bincode`-encoded [`StreamRow`] — the same length-prefix
//! shape the teacher's own WAL uses for its on-disk records, reused here
//! for the wire. EOF exactly at a length-prefix boundary ends the stream
//! cleanly; EOF partway through a declared frame is
//! [`CodecError::UnexpectedEndOfStream`].

use std::io::{self, Read, Write};

use crate::error::CodecError;
use crate::rdf::builder::Quad;
use crate::rdf::node::{Literal, Node};
use crate::rdf::triple::Triple;

use super::dictionary::{StringDictionaryReader, StringDictionaryWriter};
use super::wire::{DataTuple, StreamRow, VarTuple, WireQuad, WireTerm, WireTriple};

fn node_to_wire(dict: &mut StringDictionaryWriter, node: &Node) -> Result<WireTerm, CodecError> {
    match node {
        Node::Iri(s) => Ok(WireTerm::Iri {
            iri_dict_index: dict.get_or_insert(s).index(),
        }),
        Node::Blank(s) => Ok(WireTerm::Blank {
            label_dict_index: dict.get_or_insert(s).index(),
        }),
        Node::Literal(lit) => {
            let lex_dict_index = dict.get_or_insert(lit.lexical()).index();
            let lang_dict_index = lit.language().map(|l| dict.get_or_insert(l).index());
            let datatype_dict_index = lit.explicit_datatype().map(|d| dict.get_or_insert(d).index());
            Ok(WireTerm::Literal {
                lex_dict_index,
                lang_dict_index,
                datatype_dict_index,
                prefixed_name_ref: None,
            })
        }
        Node::Variable(s) => Ok(WireTerm::Variable {
            name_dict_index: dict.get_or_insert(s).index(),
        }),
        Node::Any => Err(CodecError::MalformedInput(
            "cannot encode the Any wildcard as a concrete wire term".to_string(),
        )),
    }
}

fn binding_to_wire(dict: &mut StringDictionaryWriter, binding: Option<&Node>) -> Result<WireTerm, CodecError> {
    match binding {
        Some(n) => node_to_wire(dict, n),
        None => Ok(WireTerm::Undefined),
    }
}

fn wire_to_node(dict: &StringDictionaryReader, term: &WireTerm) -> Result<Node, CodecError> {
    match term {
        WireTerm::Iri { iri_dict_index } => Ok(Node::iri(dict.get(*iri_dict_index)?)?),
        WireTerm::Blank { label_dict_index } => Ok(Node::blank(dict.get(*label_dict_index)?)?),
        WireTerm::Literal {
            lex_dict_index,
            lang_dict_index,
            datatype_dict_index,
            ..
        } => {
            let lex = dict.get(*lex_dict_index)?.to_string();
            let lit = if let Some(idx) = lang_dict_index {
                Literal::with_language(lex, dict.get(*idx)?)
            } else if let Some(idx) = datatype_dict_index {
                Literal::with_datatype(lex, dict.get(*idx)?)
            } else {
                Literal::simple(lex)
            };
            Ok(Node::literal(lit))
        }
        WireTerm::Variable { name_dict_index } => Ok(Node::variable(dict.get(*name_dict_index)?.to_string())),
        WireTerm::Undefined => Err(CodecError::MalformedInput(
            "Undefined term is only valid inside a result-row binding".to_string(),
        )),
    }
}

fn wire_to_binding(dict: &StringDictionaryReader, term: &WireTerm) -> Result<Option<Node>, CodecError> {
    match term {
        WireTerm::Undefined => Ok(None),
        other => wire_to_node(dict, other).map(Some),
    }
}

/// One decoded row, with all dictionary references already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedRow {
    Prefix { name: String, iri: String },
    Base { iri: String },
    Triple(Triple),
    Quad(Quad),
    Vars(Vec<String>),
    Data(Vec<Option<Node>>),
}

/// Writes a sequence of [`DecodedRow`]-shaped events as length-delimited
/// [`StreamRow`] frames, interning strings into a private
/// [`StringDictionaryWriter`] and flushing new entries just ahead of the
/// row that first references them.
pub struct StreamWriter<W: Write> {
    inner: W,
    dict: StringDictionaryWriter,
}

impl<W: Write> StreamWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            dict: StringDictionaryWriter::new(),
        }
    }

    fn write_frame(&mut self, row: &StreamRow) -> Result<(), CodecError> {
        let bytes = bincode::serialize(row)?;
        self.inner.write_all(&(bytes.len() as u32).to_le_bytes())?;
        self.inner.write_all(&bytes)?;
        Ok(())
    }

    fn flush_pending_dict(&mut self) -> Result<(), CodecError> {
        if self.dict.has_pending() {
            let batch = self.dict.flush()?;
            self.write_frame(&StreamRow::StringDictBatch { strings: batch })?;
        }
        Ok(())
    }

    pub fn write_prefix(&mut self, name: &str, iri: &str) -> Result<(), CodecError> {
        let name_dict_index = self.dict.get_or_insert(name).index();
        let iri_dict_index = self.dict.get_or_insert(iri).index();
        self.flush_pending_dict()?;
        self.write_frame(&StreamRow::Prefix {
            name_dict_index,
            iri_dict_index,
        })
    }

    pub fn write_base(&mut self, iri: &str) -> Result<(), CodecError> {
        let iri_dict_index = self.dict.get_or_insert(iri).index();
        self.flush_pending_dict()?;
        self.write_frame(&StreamRow::Base { iri_dict_index })
    }

    pub fn write_triple(&mut self, t: &Triple) -> Result<(), CodecError> {
        let subject = node_to_wire(&mut self.dict, &t.subject)?;
        let predicate = node_to_wire(&mut self.dict, &t.predicate)?;
        let object = node_to_wire(&mut self.dict, &t.object)?;
        self.flush_pending_dict()?;
        self.write_frame(&StreamRow::Triple(WireTriple {
            subject,
            predicate,
            object,
        }))
    }

    pub fn write_quad(&mut self, q: &Quad) -> Result<(), CodecError> {
        let graph = q.graph.as_ref().map(|g| node_to_wire(&mut self.dict, g)).transpose()?;
        let subject = node_to_wire(&mut self.dict, &q.triple.subject)?;
        let predicate = node_to_wire(&mut self.dict, &q.triple.predicate)?;
        let object = node_to_wire(&mut self.dict, &q.triple.object)?;
        self.flush_pending_dict()?;
        self.write_frame(&StreamRow::Quad(WireQuad {
            graph,
            subject,
            predicate,
            object,
        }))
    }

    /// Writes the result-set header. Must precede any [`Self::write_data_row`]
    /// calls (not enforced at the type level — see `DESIGN.md`).
    pub fn write_vars(&mut self, vars: &[String]) -> Result<(), CodecError> {
        let wire_vars = vars
            .iter()
            .map(|v| {
                Ok(WireTerm::Variable {
                    name_dict_index: self.dict.get_or_insert(v).index(),
                })
            })
            .collect::<Result<Vec<_>, CodecError>>()?;
        let strings = if self.dict.has_pending() { Some(self.dict.flush()?) } else { None };
        self.write_frame(&StreamRow::Vars(VarTuple { vars: wire_vars, strings }))
    }

    pub fn write_data_row(&mut self, row: &[Option<Node>]) -> Result<(), CodecError> {
        let wire_row = row
            .iter()
            .map(|b| binding_to_wire(&mut self.dict, b.as_ref()))
            .collect::<Result<Vec<_>, CodecError>>()?;
        let strings = if self.dict.has_pending() { Some(self.dict.flush()?) } else { None };
        self.write_frame(&StreamRow::Data(DataTuple { row: wire_row, strings }))
    }

    /// Flushes the underlying writer and hands it back.
    pub fn finish(mut self) -> Result<W, CodecError> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Reads length-delimited [`StreamRow`] frames, transparently ingesting
/// `StringDictBatch` frames into a private [`StringDictionaryReader`] and
/// surfacing everything else as a resolved [`DecodedRow`].
pub struct StreamReader<R: Read> {
    inner: R,
    dict: StringDictionaryReader,
}

impl<R: Read> StreamReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            dict: StringDictionaryReader::new(),
        }
    }

    fn read_frame_bytes(&mut self) -> Result<Option<Vec<u8>>, CodecError> {
        let mut len_bytes = [0u8; 4];
        match self.inner.read_exact(&mut len_bytes) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }
        let len = u32::from_le_bytes(len_bytes) as usize;
        let mut buf = vec![0u8; len];
        match self.inner.read_exact(&mut buf) {
            Ok(()) => Ok(Some(buf)),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(CodecError::UnexpectedEndOfStream),
            Err(e) => Err(e.into()),
        }
    }

    /// Pulls the next logical row, transparently consuming any
    /// `StringDictBatch` frames along the way. `Ok(None)` is clean
    /// end-of-stream at a row boundary.
    pub fn read_row(&mut self) -> Result<Option<DecodedRow>, CodecError> {
        loop {
            let Some(bytes) = self.read_frame_bytes()? else {
                return Ok(None);
            };
            let row: StreamRow = bincode::deserialize(&bytes)?;
            if let Some(strings) = self.absorb_embedded_strings(&row) {
                self.dict.ingest_batch(strings);
            }
            match row {
                StreamRow::StringDictBatch { strings } => {
                    self.dict.ingest_batch(strings);
                    continue;
                }
                StreamRow::Prefix {
                    name_dict_index,
                    iri_dict_index,
                } => {
                    return Ok(Some(DecodedRow::Prefix {
                        name: self.dict.get(name_dict_index)?.to_string(),
                        iri: self.dict.get(iri_dict_index)?.to_string(),
                    }))
                }
                StreamRow::Base { iri_dict_index } => {
                    return Ok(Some(DecodedRow::Base {
                        iri: self.dict.get(iri_dict_index)?.to_string(),
                    }))
                }
                StreamRow::Triple(wt) => {
                    let subject = wire_to_node(&self.dict, &wt.subject)?;
                    let predicate = wire_to_node(&self.dict, &wt.predicate)?;
                    let object = wire_to_node(&self.dict, &wt.object)?;
                    return Ok(Some(DecodedRow::Triple(Triple::new(subject, predicate, object))));
                }
                StreamRow::Quad(wq) => {
                    let graph = wq.graph.as_ref().map(|g| wire_to_node(&self.dict, g)).transpose()?;
                    let subject = wire_to_node(&self.dict, &wq.subject)?;
                    let predicate = wire_to_node(&self.dict, &wq.predicate)?;
                    let object = wire_to_node(&self.dict, &wq.object)?;
                    return Ok(Some(DecodedRow::Quad(Quad::new(
                        Triple::new(subject, predicate, object),
                        graph,
                    ))));
                }
                StreamRow::Vars(vt) => {
                    let names = vt
                        .vars
                        .iter()
                        .map(|w| match w {
                            WireTerm::Variable { name_dict_index } => {
                                self.dict.get(*name_dict_index).map(|s| s.to_string())
                            }
                            _ => Err(CodecError::MalformedInput(
                                "VarTuple entry was not a Variable term".to_string(),
                            )),
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    return Ok(Some(DecodedRow::Vars(names)));
                }
                StreamRow::Data(dt) => {
                    let row = dt
                        .row
                        .iter()
                        .map(|w| wire_to_binding(&self.dict, w))
                        .collect::<Result<Vec<_>, _>>()?;
                    return Ok(Some(DecodedRow::Data(row)));
                }
            }
        }
    }

    /// `Vars`/`Data` carry their new dictionary entries embedded rather
    /// than as a preceding `StringDictBatch` frame (§4.5) — ingest those
    /// before resolving the row's own term references.
    fn absorb_embedded_strings(&self, row: &StreamRow) -> Option<Vec<String>> {
        match row {
            StreamRow::Vars(VarTuple { strings, .. }) | StreamRow::Data(DataTuple { strings, .. }) => strings.clone(),
            _ => None,
        }
    }
}
