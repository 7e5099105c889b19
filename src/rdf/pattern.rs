//! Pattern classifier (C7).
//!
//! Maps a [`Pattern`] to one of the eight SPARQL-style access-pattern tags
//! so C5/C6 can dispatch to the cheapest available index.

use super::triple::Pattern;

/// Which positions of a pattern are bound (not [`super::node::Node::Any`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternTag {
    SubPreObj,
    SubPreAny,
    SubAnyObj,
    SubAnyAny,
    AnyPreObj,
    AnyPreAny,
    AnyAnyObj,
    AnyAnyAny,
}

/// Classifies `pattern` into a [`PatternTag`].
///
/// The match is over three booleans ("is this position bound?") and is
/// exhaustive by construction — there is no failure case here, unlike the
/// source this crate is adapted from, where an unmatched case indicated a
/// programming error. In Rust the type system already rules that out (see
/// `DESIGN.md`).
pub fn classify(pattern: &Pattern) -> PatternTag {
    let s = !pattern.subject.is_any();
    let p = !pattern.predicate.is_any();
    let o = !pattern.object.is_any();
    match (s, p, o) {
        (true, true, true) => PatternTag::SubPreObj,
        (true, true, false) => PatternTag::SubPreAny,
        (true, false, true) => PatternTag::SubAnyObj,
        (true, false, false) => PatternTag::SubAnyAny,
        (false, true, true) => PatternTag::AnyPreObj,
        (false, true, false) => PatternTag::AnyPreAny,
        (false, false, true) => PatternTag::AnyAnyObj,
        (false, false, false) => PatternTag::AnyAnyAny,
    }
}

/// Whether `triple` matches `pattern` position-by-position, using value
/// equality (not term equality) on each bound position — so a pattern for
/// `"0.10"^^xsd:double` matches a stored `"0.1"^^xsd:double`, per §3's
/// value-equality contract. Term equality is reserved for insertion/removal
/// identity (see `bunch.rs`/`indexed_set.rs`), never for pattern matching.
pub fn matches(pattern: &Pattern, triple: &Pattern) -> bool {
    (pattern.subject.is_any() || pattern.subject.value_eq(&triple.subject))
        && (pattern.predicate.is_any() || pattern.predicate.value_eq(&triple.predicate))
        && (pattern.object.is_any() || pattern.object.value_eq(&triple.object))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::node::Node;

    fn n(s: &str) -> Node {
        Node::iri(s).unwrap()
    }

    #[test]
    fn classifies_all_eight_tags() {
        let any = Node::Any;
        let a = n("http://example.org/a");
        let b = n("http://example.org/b");
        let c = n("http://example.org/c");

        assert_eq!(classify(&Pattern::new(a.clone(), b.clone(), c.clone())), PatternTag::SubPreObj);
        assert_eq!(classify(&Pattern::new(a.clone(), b.clone(), any.clone())), PatternTag::SubPreAny);
        assert_eq!(classify(&Pattern::new(a.clone(), any.clone(), c.clone())), PatternTag::SubAnyObj);
        assert_eq!(classify(&Pattern::new(a.clone(), any.clone(), any.clone())), PatternTag::SubAnyAny);
        assert_eq!(classify(&Pattern::new(any.clone(), b.clone(), c.clone())), PatternTag::AnyPreObj);
        assert_eq!(classify(&Pattern::new(any.clone(), b.clone(), any.clone())), PatternTag::AnyPreAny);
        assert_eq!(classify(&Pattern::new(any.clone(), any.clone(), c.clone())), PatternTag::AnyAnyObj);
        assert_eq!(classify(&Pattern::new(any.clone(), any.clone(), any.clone())), PatternTag::AnyAnyAny);
    }

    #[test]
    fn matches_respects_wildcards() {
        let any = Node::Any;
        let t = Pattern::new(n("http://example.org/a"), n("http://example.org/p"), n("http://example.org/b"));
        let p = Pattern::new(any.clone(), n("http://example.org/p"), any);
        assert!(matches(&p, &t));
    }

    #[test]
    fn matches_uses_value_equality_on_literal_positions() {
        use crate::rdf::node::Literal;

        let s = n("http://example.org/a");
        let p = n("http://example.org/p");
        let stored = Node::literal(Literal::with_datatype("0.1", "http://www.w3.org/2001/XMLSchema#double"));
        let queried = Node::literal(Literal::with_datatype("0.10", "http://www.w3.org/2001/XMLSchema#double"));

        let t = Pattern::new(s.clone(), p.clone(), stored);
        let pat = Pattern::new(s, p, queried);
        assert!(matches(&pat, &t));
    }
}
