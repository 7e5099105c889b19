//! Per-stream string dictionary (§4.5 "String dictionary protocol").
//!
//! An ordered, append-only sequence of unique strings with a reverse
//! lookup map. The writer side queues new entries as they're interned and
//! hands them back in one batch on [`StringDictionaryWriter::flush`]; the
//! reader side only ever grows (`ingest_batch`), matching the "index space
//! grows strictly append-only" invariant in §4.5.

use rustc_hash::FxHashMap;

use crate::error::CodecError;
use crate::rdf::indexed_set::IndexOutcome;

/// Writer half. One instance per outgoing stream — dictionaries are never
/// shared across streams (§5).
#[derive(Debug, Default)]
pub struct StringDictionaryWriter {
    strings: Vec<String>,
    lookup: FxHashMap<String, usize>,
    flushed_up_to: usize,
}

impl StringDictionaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `s`, returning its index either way. New insertions are
    /// queued for the next [`Self::flush`].
    pub fn get_or_insert(&mut self, s: &str) -> IndexOutcome {
        if let Some(&idx) = self.lookup.get(s) {
            return IndexOutcome::Existing(idx);
        }
        let idx = self.strings.len();
        self.strings.push(s.to_string());
        self.lookup.insert(s.to_string(), idx);
        IndexOutcome::Inserted(idx)
    }

    pub fn has_pending(&self) -> bool {
        self.flushed_up_to < self.strings.len()
    }

    /// Emits every string added since the last flush and advances the
    /// flush pointer. Fails with `PreconditionViolation` if nothing is
    /// queued — callers should check [`Self::has_pending`] first.
    pub fn flush(&mut self) -> Result<Vec<String>, CodecError> {
        if !self.has_pending() {
            return Err(CodecError::PreconditionViolation(
                "flush() called with no queued dictionary strings".to_string(),
            ));
        }
        let batch = self.strings[self.flushed_up_to..].to_vec();
        self.flushed_up_to = self.strings.len();
        Ok(batch)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Reader half. Strictly append-only: [`Self::ingest_batch`] is the only
/// mutator.
#[derive(Debug, Default)]
pub struct StringDictionaryReader {
    strings: Vec<String>,
}

impl StringDictionaryReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest_batch(&mut self, batch: Vec<String>) {
        self.strings.extend(batch);
    }

    /// Resolves `idx`. A reference to an index beyond what's been ingested
    /// so far is a wire protocol error, not a panic — the producer is
    /// assumed untrusted.
    pub fn get(&self, idx: usize) -> Result<&str, CodecError> {
        self.strings
            .get(idx)
            .map(String::as_str)
            .ok_or_else(|| CodecError::MalformedInput(format!("dictionary index {idx} out of range")))
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_strings_get_one_index() {
        let mut dict = StringDictionaryWriter::new();
        let a = dict.get_or_insert("http://example.org/");
        let b = dict.get_or_insert("http://example.org/");
        assert_eq!(a.index(), b.index());
        assert!(a.is_new());
        assert!(!b.is_new());
    }

    #[test]
    fn flush_empties_the_pending_queue() {
        let mut dict = StringDictionaryWriter::new();
        dict.get_or_insert("a");
        dict.get_or_insert("b");
        let batch = dict.flush().unwrap();
        assert_eq!(batch, vec!["a".to_string(), "b".to_string()]);
        assert!(!dict.has_pending());
        assert!(dict.flush().is_err());
    }

    #[test]
    fn flush_after_more_inserts_only_emits_the_new_ones() {
        let mut dict = StringDictionaryWriter::new();
        dict.get_or_insert("a");
        dict.flush().unwrap();
        dict.get_or_insert("b");
        assert_eq!(dict.flush().unwrap(), vec!["b".to_string()]);
    }

    #[test]
    fn reader_rejects_out_of_range_index() {
        let mut reader = StringDictionaryReader::new();
        reader.ingest_batch(vec!["a".to_string()]);
        assert!(reader.get(0).is_ok());
        assert!(matches!(reader.get(1), Err(CodecError::MalformedInput(_))));
    }
}
