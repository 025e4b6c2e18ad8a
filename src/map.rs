// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A persistent map for dynamically typed keys.
//!
//! An immutable map from [`Value`] keys to [`Value`] values, backed by a
//! [hash array mapped trie][1]. Every [`store`][GenericMap::store] returns
//! a new map sharing almost all of its structure with its predecessor; old
//! maps stay valid and unchanged forever, which makes snapshots free and
//! concurrent readers safe by construction.
//!
//! Operations are O(log<sub>32</sub> n), near O(1) for practical sizes.
//!
//! [1]: https://en.wikipedia.org/wiki/Hash_array_mapped_trie

use std::fmt::{Debug, Error, Formatter};

use archery::{SharedPointer, SharedPointerKind};

use crate::hash::hash;
use crate::nodes::hamt::RootTable;
use crate::shared_ptr::DefaultSharedPtr;
use crate::value::Value;

/// Construct a map from a sequence of key/value pairs. Both sides take
/// anything with an `Into<Value>` conversion.
///
/// # Examples
///
/// ```
/// # #[macro_use] extern crate dynhamt;
/// # use dynhamt::Value;
/// # fn main() {
/// let map = dynmap! {
///     "hello" => "world",
///     "bar" => "baz"
/// };
/// assert_eq!(2, map.len());
/// assert_eq!(Some(&Value::from("baz")), map.load(&Value::from("bar")));
/// # }
/// ```
#[macro_export]
macro_rules! dynmap {
    () => { $crate::Map::new() };

    ( $( $key:expr => $value:expr ),* ) => {{
        let mut map = $crate::Map::new();
        $({
            map = map.store($crate::Value::from($key), $crate::Value::from($value));
        })*;
        map
    }};

    ( $( $key:expr => $value:expr ,)* ) => {{
        let mut map = $crate::Map::new();
        $({
            map = map.store($crate::Value::from($key), $crate::Value::from($value));
        })*;
        map
    }};
}

/// Type alias for [`GenericMap`] with the [`DefaultSharedPtr`] pointer
/// kind.
pub type Map = GenericMap<DefaultSharedPtr>;

/// A persistent map for dynamically typed keys.
///
/// See the [module documentation][crate::map] for an overview. The pointer
/// kind `P` selects how trie nodes are shared between map generations;
/// [`Map`] fixes it to atomic reference counting.
pub struct GenericMap<P: SharedPointerKind> {
    root: SharedPointer<RootTable<P>, P>,
}

impl<P: SharedPointerKind> GenericMap<P> {
    /// Construct an empty map.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynhamt::{Map, Value};
    /// let map = Map::new();
    /// assert!(map.is_empty());
    /// assert_eq!(None, map.load(&Value::from("hello")));
    /// ```
    #[must_use]
    pub fn new() -> Self {
        GenericMap {
            root: SharedPointer::new(RootTable::new()),
        }
    }

    /// Construct a map with a single mapping.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynhamt::{Map, Value};
    /// let map = Map::unit(123i32, "onetwothree");
    /// assert_eq!(
    ///   Some(&Value::from("onetwothree")),
    ///   map.load(&Value::from(123i32))
    /// );
    /// ```
    #[inline]
    #[must_use]
    pub fn unit(key: impl Into<Value>, value: impl Into<Value>) -> Self {
        Self::new().store(key, value)
    }

    /// The number of distinct keys in the map.
    ///
    /// Time: O(1)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Test whether the map is empty.
    ///
    /// Time: O(1)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Test whether two maps share the same root node in memory.
    ///
    /// True for a map compared against itself or against a clone of
    /// itself; false for structurally equal maps built separately.
    ///
    /// Time: O(1)
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        SharedPointer::ptr_eq(&self.root, &other.root)
    }

    /// Look up the value stored for a key.
    ///
    /// Time: O(log n)
    ///
    /// # Panics
    ///
    /// Panics if the key is [`Opaque`](Value::Opaque).
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynhamt::{Map, Value};
    /// let map = Map::unit("hello", "world");
    /// assert_eq!(Some(&Value::from("world")), map.load(&Value::from("hello")));
    /// assert_eq!(None, map.load(&Value::from("goodbye")));
    /// ```
    #[must_use]
    pub fn load(&self, key: &Value) -> Option<&Value> {
        self.root.lookup(hash(key), key)
    }

    /// Test whether the map contains a mapping for a key.
    ///
    /// Time: O(log n)
    #[must_use]
    pub fn contains_key(&self, key: &Value) -> bool {
        self.load(key).is_some()
    }

    /// Construct a new map with `{key → value}` added, replacing any prior
    /// mapping for an equal key. The receiver is unchanged.
    ///
    /// Time: O(log n)
    ///
    /// # Panics
    ///
    /// Panics if the key is [`Opaque`](Value::Opaque); nothing is
    /// published in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynhamt::{Map, Value};
    /// let m1 = Map::new().store("hello", "world");
    /// let m2 = m1.store("bar", "baz");
    /// assert_eq!(1, m1.len());
    /// assert_eq!(2, m2.len());
    /// assert_eq!(None, m1.load(&Value::from("bar")));
    /// ```
    #[must_use]
    pub fn store(&self, key: impl Into<Value>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let hash = hash(&key);
        GenericMap {
            root: SharedPointer::new(self.root.assoc(hash, key, value.into())),
        }
    }
}

impl<P: SharedPointerKind> Clone for GenericMap<P> {
    /// Clone a map, sharing its entire structure.
    ///
    /// Time: O(1)
    fn clone(&self) -> Self {
        GenericMap {
            root: self.root.clone(),
        }
    }
}

impl<P: SharedPointerKind> Default for GenericMap<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: SharedPointerKind> Debug for GenericMap<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        f.debug_struct("Map").field("len", &self.len()).finish()
    }
}

impl<P: SharedPointerKind> FromIterator<(Value, Value)> for GenericMap<P> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        iter.into_iter()
            .fold(Self::new(), |map, (key, value)| map.store(key, value))
    }
}

// Tests

#[cfg(test)]
mod test {
    use super::*;
    use ::proptest::{collection, num::i16, proptest};
    use archery::RcK;
    use rand::seq::SliceRandom;
    use rand::thread_rng;
    use static_assertions::{assert_impl_all, assert_not_impl_any};
    use std::collections::HashMap as StdHashMap;

    assert_impl_all!(Map: Send, Sync, Clone);
    assert_not_impl_any!(GenericMap<RcK>: Send, Sync);

    #[test]
    fn empty_map_loads_nothing() {
        let map = Map::new();
        assert_eq!(0, map.len());
        assert!(map.is_empty());
        assert_eq!(None, map.load(&Value::from("hello")));
    }

    #[test]
    fn store_leaves_the_original_untouched() {
        let empty = Map::new();
        let m1 = empty.store("hello", "world");

        assert_eq!(1, m1.len());
        assert_eq!(Some(&Value::from("world")), m1.load(&Value::from("hello")));
        assert_eq!(0, empty.len());
        assert_eq!(None, empty.load(&Value::from("hello")));

        let m2 = m1.store("bar", "baz");
        assert_eq!(2, m2.len());
        assert_eq!(Some(&Value::from("world")), m2.load(&Value::from("hello")));
        assert_eq!(Some(&Value::from("baz")), m2.load(&Value::from("bar")));
        assert_eq!(1, m1.len());
        assert_eq!(None, m1.load(&Value::from("bar")));
    }

    #[test]
    fn restore_replaces_only_in_the_new_map() {
        let m2 = Map::new().store("hello", "world").store("bar", "baz");
        let m3 = m2.store("bar", "foo");

        assert_eq!(2, m3.len());
        assert_eq!(Some(&Value::from("foo")), m3.load(&Value::from("bar")));
        assert_eq!(2, m2.len());
        assert_eq!(Some(&Value::from("baz")), m2.load(&Value::from("bar")));
    }

    #[test]
    fn idempotent_restore() {
        let once = Map::new().store("hello", "world");
        let twice = once.store("hello", "world");
        assert_eq!(once.len(), twice.len());
        assert_eq!(
            Some(&Value::from("world")),
            twice.load(&Value::from("hello"))
        );
    }

    #[test]
    fn ten_thousand_distinct_keys() {
        let mut map = Map::new();
        for i in 0..10_000isize {
            map = map.store(i, format!("hello world_{i}"));
        }
        assert_eq!(10_000, map.len());
        for i in 0..10_000isize {
            assert_eq!(
                Some(&Value::from(format!("hello world_{i}"))),
                map.load(&Value::Int(i)),
            );
        }
    }

    #[test]
    fn struct_keys_compare_structurally() {
        let key = Value::record("TestStruct", vec![Value::Int(1), Value::from("a")]);
        let other = Value::record("TestStruct", vec![Value::Int(2), Value::from("a")]);
        let map = Map::new().store(key.clone(), "stored");

        assert_eq!(Some(&Value::from("stored")), map.load(&key));
        assert_eq!(None, map.load(&other));
    }

    #[test]
    fn mixed_key_kinds_coexist() {
        let map = Map::new()
            .store(1u8, "u8")
            .store(1i64, "i64")
            .store(1isize, "int")
            .store("1", "str")
            .store(true, "bool")
            .store(Value::Null, "null");
        assert_eq!(6, map.len());
        assert_eq!(Some(&Value::from("u8")), map.load(&Value::U8(1)));
        assert_eq!(Some(&Value::from("i64")), map.load(&Value::I64(1)));
        assert_eq!(Some(&Value::from("int")), map.load(&Value::Int(1)));
        assert_eq!(Some(&Value::from("str")), map.load(&Value::from("1")));
        assert_eq!(Some(&Value::from("bool")), map.load(&Value::Bool(true)));
        assert_eq!(Some(&Value::from("null")), map.load(&Value::Null));
    }

    #[test]
    fn contains_key() {
        let map = Map::unit("hello", "world");
        assert!(map.contains_key(&Value::from("hello")));
        assert!(!map.contains_key(&Value::from("world")));
    }

    #[test]
    fn ptr_eq_for_clones_only() {
        let m1 = Map::new().store("hello", "world");
        let m2 = m1.clone();
        let m3 = Map::new().store("hello", "world");
        assert!(m1.ptr_eq(&m2));
        assert!(!m1.ptr_eq(&m3));
    }

    #[test]
    fn final_map_is_insertion_order_independent() {
        let mut keys: Vec<isize> = (0..500).collect();
        let reference = keys
            .iter()
            .fold(Map::new(), |map, &i| map.store(i, i * 2));

        let mut rng = thread_rng();
        for _ in 0..4 {
            keys.shuffle(&mut rng);
            let shuffled = keys
                .iter()
                .fold(Map::new(), |map, &i| map.store(i, i * 2));
            assert_eq!(reference.len(), shuffled.len());
            for &i in &keys {
                assert_eq!(
                    reference.load(&Value::Int(i)),
                    shuffled.load(&Value::Int(i))
                );
            }
        }
    }

    #[test]
    fn macro_allows_trailing_comma() {
        let map1 = dynmap! {"x" => 1i32, "y" => 2i32};
        let map2 = dynmap! {
            "x" => 1i32,
            "y" => 2i32,
        };
        assert_eq!(2, map1.len());
        assert_eq!(map1.len(), map2.len());
        assert_eq!(map1.load(&Value::from("x")), map2.load(&Value::from("x")));
    }

    #[test]
    fn from_iterator() {
        let map: Map = (0..100isize)
            .map(|i| (Value::Int(i), Value::Int(i)))
            .collect();
        assert_eq!(100, map.len());
        assert_eq!(Some(&Value::Int(42)), map.load(&Value::Int(42)));
    }

    #[test]
    #[should_panic(expected = "cannot index value of kind function")]
    fn storing_an_opaque_key_is_fatal() {
        let _ = Map::new().store(Value::Opaque("function"), "nope");
    }

    #[test]
    fn opaque_values_are_fine() {
        let map = Map::new().store("callback", Value::Opaque("function"));
        assert!(map.contains_key(&Value::from("callback")));
    }

    proptest! {
        #[test]
        fn store_and_length(ref m in collection::hash_map(i16::ANY, i16::ANY, 0..1000)) {
            let mut map = Map::new();
            for (index, (k, v)) in m.iter().enumerate() {
                map = map.store(*k, *v);
                assert_eq!(Some(&Value::I16(*v)), map.load(&Value::I16(*k)));
                assert_eq!(index + 1, map.len());
            }
        }

        #[test]
        fn agrees_with_a_standard_map(ref pairs in collection::vec((i16::ANY, i16::ANY), 0..200)) {
            let mut model = StdHashMap::new();
            let mut map = Map::new();
            for (k, v) in pairs {
                model.insert(*k, *v);
                map = map.store(*k, *v);
            }
            assert_eq!(model.len(), map.len());
            for (k, v) in &model {
                assert_eq!(Some(&Value::I16(*v)), map.load(&Value::I16(*k)));
            }
        }

        #[test]
        fn predecessors_survive_every_store(ref pairs in collection::vec((i16::ANY, i16::ANY), 1..60)) {
            let mut generations: Vec<(Map, StdHashMap<i16, i16>)> = Vec::new();
            let mut model = StdHashMap::new();
            let mut map = Map::new();
            for (k, v) in pairs {
                model.insert(*k, *v);
                map = map.store(*k, *v);
                generations.push((map.clone(), model.clone()));
            }
            for (snapshot, expected) in &generations {
                assert_eq!(expected.len(), snapshot.len());
                for (k, v) in expected {
                    assert_eq!(Some(&Value::I16(*v)), snapshot.load(&Value::I16(*k)));
                }
            }
        }
    }
}
