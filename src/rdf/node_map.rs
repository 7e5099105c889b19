//! Node→bunch map (C4).
//!
//! A thin, purpose-named wrapper around an `FxHashMap<Node, V>`. It is
//! "just" a hash map, but [`Node`]'s `Hash` impl already hashes the
//! *indexing value* while its `Eq` impl checks *term* equality — so the map
//! naturally buckets value-equal nodes together and then disambiguates by
//! term equality within the bucket, exactly as §3/§4.7 specify. The wrapper
//! exists to give the contract named, documented operations rather than
//! leaving callers to rediscover `entry()`/`get_mut()` idioms at each call
//! site.

use rustc_hash::FxHashMap;

use super::node::Node;

pub struct NodeMap<V> {
    inner: FxHashMap<Node, V>,
}

impl<V> NodeMap<V> {
    pub fn new() -> Self {
        Self {
            inner: FxHashMap::default(),
        }
    }

    pub fn get(&self, node: &Node) -> Option<&V> {
        self.inner.get(node)
    }

    pub fn get_mut(&mut self, node: &Node) -> Option<&mut V> {
        self.inner.get_mut(node)
    }

    pub fn contains_key(&self, node: &Node) -> bool {
        self.inner.contains_key(node)
    }

    pub fn compute_if_absent(&mut self, node: Node, factory: impl FnOnce() -> V) -> &mut V {
        self.inner.entry(node).or_insert_with(factory)
    }

    pub fn put(&mut self, node: Node, value: V) -> Option<V> {
        self.inner.insert(node, value)
    }

    pub fn remove(&mut self, node: &Node) -> Option<V> {
        self.inner.remove(node)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.inner.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Node, &V)> {
        self.inner.iter()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

impl<V> Default for NodeMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> Clone for NodeMap<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::node::Literal;

    #[test]
    fn value_equal_numeric_literals_share_a_bucket_but_remain_distinct_keys() {
        let mut map: NodeMap<u32> = NodeMap::new();
        let a = Node::literal(Literal::with_datatype("0.1", "http://www.w3.org/2001/XMLSchema#double"));
        let b = Node::literal(Literal::with_datatype("0.10", "http://www.w3.org/2001/XMLSchema#double"));
        map.put(a.clone(), 1);
        map.put(b.clone(), 2);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&a), Some(&1));
        assert_eq!(map.get(&b), Some(&2));
    }

    #[test]
    fn compute_if_absent_only_calls_factory_once() {
        let mut map: NodeMap<Vec<u32>> = NodeMap::new();
        let n = Node::iri("http://example.org/a").unwrap();
        map.compute_if_absent(n.clone(), Vec::new).push(1);
        map.compute_if_absent(n.clone(), || panic!("should not run twice")).push(2);
        assert_eq!(map.get(&n), Some(&vec![1, 2]));
    }
}
