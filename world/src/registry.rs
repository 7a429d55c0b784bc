//! Insertion-ordered association store used for rosters and keyed counters.

use std::borrow::Borrow;

/// Ordered collection of key to value bindings with linear lookup.
///
/// Keys only need equality, so room handles and string identifiers share the
/// same store. Iteration follows insertion order and rebinding an existing key
/// replaces its value in place.
#[derive(Clone, Debug)]
pub struct NodeRegistry<K, V> {
    bindings: Vec<(K, V)>,
}

impl<K, V> Default for NodeRegistry<K, V> {
    fn default() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }
}

impl<K: PartialEq, V> NodeRegistry<K, V> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a value to a key, returning the value it replaced.
    pub fn bind(&mut self, key: K, value: V) -> Option<V> {
        match self.position(&key) {
            Some(index) => Some(std::mem::replace(&mut self.bindings[index].1, value)),
            None => {
                self.bindings.push((key, value));
                None
            }
        }
    }

    /// Looks up the value bound to a key.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.position(key).map(|index| &self.bindings[index].1)
    }

    /// Looks up the value bound to a key for mutation.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.position(key).map(|index| &mut self.bindings[index].1)
    }

    /// Reports whether a key is bound.
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.position(key).is_some()
    }

    /// Removes the binding of a key, preserving the order of the rest.
    pub fn unbind<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.position(key)
            .map(|index| self.bindings.remove(index).1)
    }

    /// Iterator over the bindings in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.bindings.iter().map(|(key, value)| (key, value))
    }

    fn position<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.bindings
            .iter()
            .position(|(bound, _)| bound.borrow() == key)
    }
}

impl<K: PartialEq> NodeRegistry<K, u32> {
    /// Adds `delta` to the counter bound to `key`, binding it when absent.
    ///
    /// Returns the updated counter value.
    pub fn increment(&mut self, key: K, delta: u32) -> u32 {
        match self.position(&key) {
            Some(index) => {
                let slot = &mut self.bindings[index].1;
                *slot = slot.saturating_add(delta);
                *slot
            }
            None => {
                self.bindings.push((key, delta));
                delta
            }
        }
    }

    /// Subtracts `amount` from every counter, stopping at zero.
    pub fn decay(&mut self, amount: u32) {
        for (_, value) in &mut self.bindings {
            *value = value.saturating_sub(amount);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NodeRegistry;

    #[test]
    fn rebinding_replaces_in_place() {
        let mut registry = NodeRegistry::new();
        assert_eq!(registry.bind("pickaxe".to_owned(), 1), None);
        assert_eq!(registry.bind("lantern".to_owned(), 2), None);
        assert_eq!(registry.bind("pickaxe".to_owned(), 5), Some(1));

        let entries: Vec<_> = registry
            .entries()
            .map(|(key, value)| (key.as_str(), *value))
            .collect();
        assert_eq!(entries, vec![("pickaxe", 5), ("lantern", 2)]);
    }

    #[test]
    fn increment_binds_absent_keys() {
        let mut registry: NodeRegistry<String, u32> = NodeRegistry::new();
        assert_eq!(registry.increment("miner_greed".to_owned(), 1), 1);
        assert_eq!(registry.increment("miner_greed".to_owned(), 2), 3);
        assert_eq!(registry.get("miner_greed"), Some(&3));
        assert_eq!(registry.entries().count(), 1);
    }

    #[test]
    fn unbind_preserves_remaining_order() {
        let mut registry = NodeRegistry::new();
        for (key, value) in [(1_u32, 'a'), (2, 'b'), (3, 'c')] {
            let _ = registry.bind(key, value);
        }
        assert_eq!(registry.unbind(&2), Some('b'));
        assert_eq!(registry.unbind(&2), None);
        let keys: Vec<u32> = registry.entries().map(|(key, _)| *key).collect();
        assert_eq!(keys, vec![1, 3]);
    }

    #[test]
    fn decay_saturates_at_zero() {
        let mut registry: NodeRegistry<&str, u32> = NodeRegistry::new();
        let _ = registry.bind("pickaxe", 100);
        let _ = registry.bind("dynamite", 10);
        registry.decay(16);
        assert_eq!(registry.get("pickaxe"), Some(&84));
        assert_eq!(registry.get("dynamite"), Some(&0));
    }
}
