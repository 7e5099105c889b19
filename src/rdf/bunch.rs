//! Triple bunch (C2).
//!
//! A bunch holds every triple that shares one node at a fixed position (the
//! position the owning [`super::node_map::NodeMap`] is keyed on). It starts
//! as a flat array and migrates, once, to a hashed representation when it
//! outgrows its threshold — migration never runs in reverse (bunch growth
//! hysteresis, see `DESIGN.md`).
//!
//! The three position-specialised bunches the system this crate is adapted
//! from used to hand-roll (subject-bunch, predicate-bunch, object-bunch)
//! differed only in which two of the three triple positions they compare
//! for duplicate detection — the third is already pinned equal by bucket
//! membership. [`IndexedPosition`] parameterises that once instead of
//! repeating the container three times.

use rustc_hash::FxHashSet;

use super::triple::Triple;

/// Which position of contained triples this bunch is indexed on. Determines
/// which *other two* positions `compare` checks for duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexedPosition {
    Subject,
    Predicate,
    Object,
}

impl IndexedPosition {
    /// True iff `a` and `b` agree on the two positions this bunch does not
    /// index on. Within a single bunch the indexed position is already
    /// pinned equal across every member, so this is the bunch's full
    /// duplicate test.
    fn compare(self, a: &Triple, b: &Triple) -> bool {
        match self {
            IndexedPosition::Subject => a.predicate == b.predicate && a.object == b.object,
            IndexedPosition::Predicate => a.subject == b.subject && a.object == b.object,
            IndexedPosition::Object => a.subject == b.subject && a.predicate == b.predicate,
        }
    }
}

enum Repr {
    Array(Vec<Triple>),
    Hashed(FxHashSet<Triple>),
}

/// A set of triples sharing a fixed node at `position`.
pub struct Bunch {
    position: IndexedPosition,
    repr: Repr,
}

impl Bunch {
    pub fn new(position: IndexedPosition) -> Self {
        Self {
            position,
            repr: Repr::Array(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Array(v) => v.len(),
            Repr::Hashed(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, t: &Triple) -> bool {
        match &self.repr {
            Repr::Array(v) => v.iter().any(|x| self.position.compare(x, t)),
            Repr::Hashed(s) => s.contains(t),
        }
    }

    pub fn any_match(&self, pred: impl Fn(&Triple) -> bool) -> bool {
        match &self.repr {
            Repr::Array(v) => v.iter().any(|x| pred(x)),
            Repr::Hashed(s) => s.iter().any(|x| pred(x)),
        }
    }

    /// Inserts `t` if no triple already in the bunch agrees with it on the
    /// two non-indexed positions. Returns `true` if `t` was newly inserted.
    /// Migrates array → hashed first if this insert would cross
    /// `threshold`.
    pub fn try_add(&mut self, t: Triple, threshold: usize) -> bool {
        if self.contains(&t) {
            return false;
        }
        if let Repr::Array(v) = &self.repr {
            if v.len() >= threshold {
                self.migrate_to_hashed();
            }
        }
        self.add_unchecked(t);
        true
    }

    /// Inserts `t` without checking for a duplicate first. Caller must
    /// already know `t` is not a duplicate under this bunch's `compare`.
    pub fn add_unchecked(&mut self, t: Triple) {
        match &mut self.repr {
            Repr::Array(v) => v.push(t),
            Repr::Hashed(s) => {
                s.insert(t);
            }
        }
    }

    /// Removes a triple agreeing with `t` on the non-indexed positions, if
    /// present. Returns `true` if something was removed.
    pub fn try_remove(&mut self, t: &Triple) -> bool {
        match &mut self.repr {
            Repr::Array(v) => {
                if let Some(pos) = v.iter().position(|x| self.position.compare(x, t)) {
                    v.remove(pos);
                    true
                } else {
                    false
                }
            }
            Repr::Hashed(s) => s.remove(t),
        }
    }

    /// Removes `t`, which the caller guarantees is present.
    pub fn remove_unchecked(&mut self, t: &Triple) {
        let removed = self.try_remove(t);
        debug_assert!(removed, "remove_unchecked called with an absent triple");
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = &Triple> + '_> {
        match &self.repr {
            Repr::Array(v) => Box::new(v.iter()),
            Repr::Hashed(s) => Box::new(s.iter()),
        }
    }

    fn migrate_to_hashed(&mut self) {
        if let Repr::Array(v) = &mut self.repr {
            let set: FxHashSet<Triple> = v.drain(..).collect();
            self.repr = Repr::Hashed(set);
        }
    }
}

impl Clone for Bunch {
    fn clone(&self) -> Self {
        Self {
            position: self.position,
            repr: match &self.repr {
                Repr::Array(v) => Repr::Array(v.clone()),
                Repr::Hashed(s) => Repr::Hashed(s.clone()),
            },
        }
    }
}
