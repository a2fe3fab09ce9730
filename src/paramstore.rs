//! Persistent weight-balanced dictionary for graphics object parameters.
//!
//! Keyed by `(property_id, optional sub-name)` per spec.md §3 "Graphics
//! object" / §4.6. Modelled as a scapegoat-style weight-balanced binary
//! search tree: nodes are reference-counted, writes path-copy only the
//! nodes on the search path (mirroring [`crate::memory::bank::Bank`]'s
//! `Rc`/`Rc::make_mut` discipline), and a subtree whose children violate
//! the `alpha`-weight balance is rebuilt from its own sorted contents in
//! place of walking back up to find a single "scapegoat" ancestor — this
//! crate's own simplification of the structure `examples/original_source`
//! confirms by name (`test/scapegoat_unittest.cc`), not a byte-for-byte
//! port of its internals.

use std::rc::Rc;

use crate::consts::SCAPEGOAT_ALPHA;

/// A parameter key: the fixed property id plus an optional per-slot or
/// per-name discriminator (used by properties addressed per adjustment
/// slot, per button index, etc).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParamKey {
    pub property: i32,
    pub slot: Option<i32>,
}

impl ParamKey {
    /// A key with no sub-slot.
    pub const fn simple(property: i32) -> Self {
        Self { property, slot: None }
    }

    /// A key addressed at a specific sub-slot (e.g. adjustment index).
    pub const fn slotted(property: i32, slot: i32) -> Self {
        Self { property, slot: Some(slot) }
    }
}

#[derive(Debug, Clone)]
enum Node<V> {
    Leaf,
    Branch {
        key: ParamKey,
        value: V,
        left: Rc<Node<V>>,
        right: Rc<Node<V>>,
        size: usize,
    },
}

impl<V: Clone> Node<V> {
    fn size(node: &Rc<Node<V>>) -> usize {
        match node.as_ref() {
            Node::Leaf => 0,
            Node::Branch { size, .. } => *size,
        }
    }

    fn balanced(left: &Rc<Node<V>>, right: &Rc<Node<V>>) -> bool {
        let total = (Self::size(left) + Self::size(right) + 1) as f64;
        Self::size(left) as f64 <= SCAPEGOAT_ALPHA * total && Self::size(right) as f64 <= SCAPEGOAT_ALPHA * total
    }

    fn collect(node: &Rc<Node<V>>, out: &mut Vec<(ParamKey, V)>) {
        if let Node::Branch { key, value, left, right, .. } = node.as_ref() {
            Self::collect(left, out);
            out.push((key.clone(), value.clone()));
            Self::collect(right, out);
        }
    }

    /// Build a perfectly balanced tree from an already key-sorted slice.
    fn build_balanced(items: &[(ParamKey, V)]) -> Rc<Node<V>> {
        if items.is_empty() {
            return Rc::new(Node::Leaf);
        }
        let mid = items.len() / 2;
        let left = Self::build_balanced(&items[..mid]);
        let right = Self::build_balanced(&items[mid + 1..]);
        let (key, value) = items[mid].clone();
        Rc::new(Node::Branch { key, value, left, right, size: items.len() })
    }

    fn rebuild(node: &Rc<Node<V>>) -> Rc<Node<V>> {
        let mut items = Vec::with_capacity(Self::size(node));
        Self::collect(node, &mut items);
        Self::build_balanced(&items)
    }

    fn insert(node: &Rc<Node<V>>, key: ParamKey, value: V) -> Rc<Node<V>> {
        match node.as_ref() {
            Node::Leaf => Rc::new(Node::Branch {
                key,
                value,
                left: Rc::new(Node::Leaf),
                right: Rc::new(Node::Leaf),
                size: 1,
            }),
            Node::Branch { key: k, value: v, left, right, size } => {
                let rebuilt = match key.cmp(k) {
                    std::cmp::Ordering::Equal => {
                        return Rc::new(Node::Branch {
                            key: key.clone(),
                            value,
                            left: left.clone(),
                            right: right.clone(),
                            size: *size,
                        })
                    }
                    std::cmp::Ordering::Less => {
                        let left = Self::insert(left, key, value);
                        Rc::new(Node::Branch {
                            key: k.clone(),
                            value: v.clone(),
                            left,
                            right: right.clone(),
                            size: size + 1,
                        })
                    }
                    std::cmp::Ordering::Greater => {
                        let right = Self::insert(right, key, value);
                        Rc::new(Node::Branch {
                            key: k.clone(),
                            value: v.clone(),
                            left: left.clone(),
                            right,
                            size: size + 1,
                        })
                    }
                };
                if let Node::Branch { left, right, .. } = rebuilt.as_ref() {
                    if !Self::balanced(left, right) {
                        return Self::rebuild(&rebuilt);
                    }
                }
                rebuilt
            }
        }
    }

    fn get<'a>(node: &'a Rc<Node<V>>, key: &ParamKey) -> Option<&'a V> {
        match node.as_ref() {
            Node::Leaf => None,
            Node::Branch { key: k, value, left, right, .. } => match key.cmp(k) {
                std::cmp::Ordering::Equal => Some(value),
                std::cmp::Ordering::Less => Self::get(left, key),
                std::cmp::Ordering::Greater => Self::get(right, key),
            },
        }
    }

    /// Remove `key`; returns the new subtree root. A missing key is a no-op.
    fn remove(node: &Rc<Node<V>>, key: &ParamKey) -> Rc<Node<V>> {
        match node.as_ref() {
            Node::Leaf => node.clone(),
            Node::Branch { key: k, value, left, right, size } => {
                let rebuilt = match key.cmp(k) {
                    std::cmp::Ordering::Less => {
                        let left = Self::remove(left, key);
                        Rc::new(Node::Branch {
                            key: k.clone(),
                            value: value.clone(),
                            left,
                            right: right.clone(),
                            size: size - 1,
                        })
                    }
                    std::cmp::Ordering::Greater => {
                        let right = Self::remove(right, key);
                        Rc::new(Node::Branch {
                            key: k.clone(),
                            value: value.clone(),
                            left: left.clone(),
                            right,
                            size: size - 1,
                        })
                    }
                    std::cmp::Ordering::Equal => {
                        if matches!(left.as_ref(), Node::Leaf) {
                            return right.clone();
                        }
                        if matches!(right.as_ref(), Node::Leaf) {
                            return left.clone();
                        }
                        // Splice in the right subtree's minimum as the new root.
                        let mut successor_items = Vec::new();
                        Self::collect(right, &mut successor_items);
                        let (succ_key, succ_value) = successor_items.remove(0);
                        let new_right = Self::build_balanced(&successor_items);
                        Rc::new(Node::Branch {
                            key: succ_key,
                            value: succ_value,
                            left: left.clone(),
                            right: new_right,
                            size: size - 1,
                        })
                    }
                };
                if let Node::Branch { left, right, .. } = rebuilt.as_ref() {
                    if !Self::balanced(left, right) {
                        return Self::rebuild(&rebuilt);
                    }
                }
                rebuilt
            }
        }
    }
}

/// A persistent, O(1)-to-clone parameter dictionary.
#[derive(Debug, Clone)]
pub struct ParamStore<V: Clone> {
    root: Rc<Node<V>>,
}

impl<V: Clone> Default for ParamStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> ParamStore<V> {
    /// An empty store.
    pub fn new() -> Self {
        Self { root: Rc::new(Node::Leaf) }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        Node::size(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up `key`.
    pub fn get(&self, key: &ParamKey) -> Option<&V> {
        Node::get(&self.root, key)
    }

    pub fn contains(&self, key: &ParamKey) -> bool {
        self.get(key).is_some()
    }

    /// Insert or overwrite `key`'s value; path-copies only the nodes on
    /// the search path and rebuilds the nearest imbalanced subtree in
    /// place, if any.
    pub fn set(&mut self, key: ParamKey, value: V) {
        self.root = Node::insert(&self.root, key, value);
    }

    /// Remove `key`; a missing key is a no-op.
    pub fn remove(&mut self, key: &ParamKey) {
        self.root = Node::remove(&self.root, key);
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (ParamKey, V)> {
        let mut out = Vec::with_capacity(self.len());
        Node::collect(&self.root, &mut out);
        out.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_has_nothing() {
        let store: ParamStore<i32> = ParamStore::new();
        assert!(store.is_empty());
        assert!(!store.contains(&ParamKey::simple(1)));
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut store = ParamStore::new();
        store.set(ParamKey::simple(3), "visible");
        store.set(ParamKey::slotted(7, 2), "offset");
        assert_eq!(store.get(&ParamKey::simple(3)), Some(&"visible"));
        assert_eq!(store.get(&ParamKey::slotted(7, 2)), Some(&"offset"));
        assert_eq!(store.get(&ParamKey::slotted(7, 3)), None);
    }

    #[test]
    fn overwrite_replaces_value_without_growing() {
        let mut store = ParamStore::new();
        store.set(ParamKey::simple(1), 10);
        store.set(ParamKey::simple(1), 20);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&ParamKey::simple(1)), Some(&20));
    }

    #[test]
    fn remove_drops_the_entry() {
        let mut store = ParamStore::new();
        store.set(ParamKey::simple(1), 1);
        store.set(ParamKey::simple(2), 2);
        store.remove(&ParamKey::simple(1));
        assert!(!store.contains(&ParamKey::simple(1)));
        assert!(store.contains(&ParamKey::simple(2)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_missing_key_is_a_no_op() {
        let mut store: ParamStore<i32> = ParamStore::new();
        store.set(ParamKey::simple(1), 1);
        store.remove(&ParamKey::simple(99));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn clone_is_independent_after_mutation() {
        let mut a = ParamStore::new();
        for i in 0..50 {
            a.set(ParamKey::simple(i), i);
        }
        let b = a.clone();
        for i in 0..50 {
            a.set(ParamKey::simple(i), i * 2);
        }
        for i in 0..50 {
            assert_eq!(b.get(&ParamKey::simple(i)), Some(&i));
            assert_eq!(a.get(&ParamKey::simple(i)), Some(&(i * 2)));
        }
    }

    #[test]
    fn sequential_snapshots_each_retain_their_own_value() {
        let mut store = ParamStore::new();
        store.set(ParamKey::simple(1), "a");
        let snap1 = store.clone();
        store.set(ParamKey::simple(1), "b");
        let snap2 = store.clone();
        store.set(ParamKey::simple(1), "c");

        assert_eq!(snap1.get(&ParamKey::simple(1)), Some(&"a"));
        assert_eq!(snap2.get(&ParamKey::simple(1)), Some(&"b"));
        assert_eq!(store.get(&ParamKey::simple(1)), Some(&"c"));
    }

    #[test]
    fn large_insertion_stays_balanced_enough_to_find_everything() {
        let mut store = ParamStore::new();
        for i in 0..1000 {
            store.set(ParamKey::simple(i), i);
        }
        for i in 0..1000 {
            assert_eq!(store.get(&ParamKey::simple(i)), Some(&i));
        }
        assert_eq!(store.len(), 1000);
    }

    #[quickcheck_macros::quickcheck]
    fn persistence_holds(keys: Vec<i32>, extra: Vec<i32>) -> bool {
        let mut a = ParamStore::new();
        for k in &keys {
            a.set(ParamKey::simple(*k), *k);
        }
        let before: Vec<_> = a.iter().collect();
        let mut b = a.clone();
        for k in &extra {
            b.set(ParamKey::simple(*k), k.wrapping_add(1));
        }
        let after: Vec<_> = a.iter().collect();
        before == after
    }
}
