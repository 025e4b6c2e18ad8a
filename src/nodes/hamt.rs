// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Trie node machinery.
//!
//! The trie has three node shapes: a fixed 32-slot root table, bitmap
//! compressed sub-tables, and leaves holding one key-value pair together
//! with the hash that positioned it. Descent consumes the hash five bits at
//! a time; once the 32 bits are spent, the key is rehashed at the next
//! level and descent restarts in fresh hash space.
//!
//! Nothing here mutates a published node. Every update clones the spine
//! from the root to the touched slot and shares all other children with the
//! previous generation.

use std::array;

use archery::{SharedPointer, SharedPointerKind};

use crate::hash::rehash;
use crate::value::Value;

/// Bits of hash consumed per trie level.
pub(crate) const HASH_SHIFT: u32 = 5;

/// Fan-out of every table: `2^HASH_SHIFT` slots.
pub(crate) const HASH_WIDTH: usize = 1 << HASH_SHIFT;

/// The 5-bit window of `hash` selected at `shift`.
#[inline]
pub(crate) fn mask(hash: u32, shift: u32) -> u32 {
    (hash >> shift) & (HASH_WIDTH as u32 - 1)
}

/// A key-value pair caching the hash that led it to its position.
///
/// The cached hash is the level-0 digest for leaves in the first 32 bits of
/// descent, and the current rehash wherever collision resolution crossed a
/// level boundary.
pub(crate) struct Leaf {
    pub(crate) hash: u32,
    pub(crate) key: Value,
    pub(crate) value: Value,
}

/// An occupied slot: either a single leaf or a deeper sub-table.
pub(crate) enum Slot<P: SharedPointerKind> {
    Leaf(SharedPointer<Leaf, P>),
    Table(SharedPointer<SubTable<P>, P>),
}

impl<P: SharedPointerKind> Slot<P> {
    fn leaf(hash: u32, key: Value, value: Value) -> Self {
        Slot::Leaf(SharedPointer::new(Leaf { hash, key, value }))
    }

    fn table(table: SubTable<P>) -> Self {
        Slot::Table(SharedPointer::new(table))
    }
}

// Clones share the pointed-to node; no node data is copied.
impl<P: SharedPointerKind> Clone for Slot<P> {
    fn clone(&self) -> Self {
        match self {
            Slot::Leaf(leaf) => Slot::Leaf(leaf.clone()),
            Slot::Table(table) => Slot::Table(table.clone()),
        }
    }
}

/// The fixed-width table at the top of the trie.
///
/// Unlike sub-tables it is not bitmap compressed, and it carries the count
/// of live leaves in the whole trie.
pub(crate) struct RootTable<P: SharedPointerKind> {
    count: usize,
    slots: [Option<Slot<P>>; HASH_WIDTH],
}

impl<P: SharedPointerKind> Clone for RootTable<P> {
    fn clone(&self) -> Self {
        RootTable {
            count: self.count,
            slots: self.slots.clone(),
        }
    }
}

impl<P: SharedPointerKind> RootTable<P> {
    pub(crate) fn new() -> Self {
        RootTable {
            count: 0,
            slots: array::from_fn(|_| None),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.count
    }

    /// A copy of this table with `{key → value}` added or replaced, sharing
    /// every untouched subtree with `self`.
    pub(crate) fn assoc(&self, hash: u32, key: Value, value: Value) -> Self {
        let idx = mask(hash, 0) as usize;
        let mut root = self.clone();
        root.count += 1;
        match &self.slots[idx] {
            None => {
                root.slots[idx] = Some(Slot::leaf(hash, key, value));
            }
            Some(Slot::Leaf(leaf)) => {
                if leaf.key == key {
                    root.slots[idx] = Some(Slot::leaf(hash, key, value));
                    root.count -= 1;
                } else {
                    let table =
                        resolve_collision(HASH_SHIFT, leaf.clone(), Leaf { hash, key, value });
                    root.slots[idx] = Some(Slot::table(table));
                }
            }
            Some(Slot::Table(sub)) => {
                let (table, replaced) = sub.assoc(HASH_SHIFT, hash, key, value);
                root.slots[idx] = Some(Slot::table(table));
                if replaced {
                    root.count -= 1;
                }
            }
        }
        root
    }

    pub(crate) fn lookup(&self, hash: u32, key: &Value) -> Option<&Value> {
        match &self.slots[mask(hash, 0) as usize] {
            None => None,
            Some(Slot::Leaf(leaf)) => {
                if leaf.key == *key {
                    Some(&leaf.value)
                } else {
                    None
                }
            }
            Some(Slot::Table(sub)) => sub.lookup(HASH_SHIFT, hash, key),
        }
    }
}

/// A bitmap-compressed table below the root.
///
/// Bit `i` of `bitmap` records whether logical slot `i` is occupied; the
/// occupied slots' children are packed in ascending slot order, so a
/// present slot's child sits at the popcount of the bitmap below its bit.
pub(crate) struct SubTable<P: SharedPointerKind> {
    bitmap: u32,
    children: Vec<Slot<P>>,
}

// The child vector is copied, the children themselves are shared.
impl<P: SharedPointerKind> Clone for SubTable<P> {
    fn clone(&self) -> Self {
        SubTable {
            bitmap: self.bitmap,
            children: self.children.clone(),
        }
    }
}

impl<P: SharedPointerKind> SubTable<P> {
    fn contains(&self, idx: u32) -> bool {
        self.bitmap & (1 << idx) != 0
    }

    /// Physical position of logical slot `idx`: the number of occupied
    /// slots below it.
    fn position(&self, idx: u32) -> usize {
        (self.bitmap & ((1 << idx) - 1)).count_ones() as usize
    }

    /// A copy of this table with `{key → value}` added or replaced, plus
    /// whether an existing mapping for an equal key was replaced.
    ///
    /// `shift` selects the hash window for this depth; at 32 and beyond the
    /// digest is spent, so the key is rehashed at level `shift / 5` and the
    /// window restarts at zero.
    fn assoc(&self, shift: u32, hash: u32, key: Value, value: Value) -> (Self, bool) {
        debug_assert_eq!(self.bitmap.count_ones() as usize, self.children.len());
        let (shift, hash) = if shift >= 32 {
            (0, rehash(&key, shift / HASH_SHIFT))
        } else {
            (shift, hash)
        };

        let idx = mask(hash, shift);
        if !self.contains(idx) {
            let mut table = self.clone();
            table.bitmap |= 1 << idx;
            let pos = table.position(idx);
            table.children.insert(pos, Slot::leaf(hash, key, value));
            return (table, false);
        }

        let pos = self.position(idx);
        match &self.children[pos] {
            Slot::Leaf(leaf) => {
                if leaf.key == key {
                    let mut table = self.clone();
                    table.children[pos] = Slot::leaf(hash, key, value);
                    (table, true)
                } else {
                    let deeper = resolve_collision(
                        shift + HASH_SHIFT,
                        leaf.clone(),
                        Leaf { hash, key, value },
                    );
                    let mut table = self.clone();
                    table.children[pos] = Slot::table(deeper);
                    (table, false)
                }
            }
            Slot::Table(sub) => {
                let (child, replaced) = sub.assoc(shift + HASH_SHIFT, hash, key, value);
                let mut table = self.clone();
                table.children[pos] = Slot::table(child);
                (table, replaced)
            }
        }
    }

    fn lookup(&self, shift: u32, hash: u32, key: &Value) -> Option<&Value> {
        debug_assert_eq!(self.bitmap.count_ones() as usize, self.children.len());
        let (shift, hash) = if shift >= 32 {
            (0, rehash(key, shift / HASH_SHIFT))
        } else {
            (shift, hash)
        };

        let idx = mask(hash, shift);
        if !self.contains(idx) {
            return None;
        }
        match &self.children[self.position(idx)] {
            Slot::Leaf(leaf) => {
                if leaf.key == *key {
                    Some(&leaf.value)
                } else {
                    None
                }
            }
            Slot::Table(sub) => sub.lookup(shift + HASH_SHIFT, hash, key),
        }
    }
}

/// Builds the smallest sub-table that separates two leaves whose hashes
/// agreed on every window above `shift`.
///
/// The incumbent leaf stays shared unless a rehash level boundary forces a
/// fresh copy, because crossing one rewrites the cached hash of both
/// leaves. Where the two windows at `shift` differ, the leaves land in a
/// two-child table in ascending slot order; where they still agree, the
/// table wraps a single deeper child and descent continues.
fn resolve_collision<P: SharedPointerKind>(
    shift: u32,
    incumbent: SharedPointer<Leaf, P>,
    newcomer: Leaf,
) -> SubTable<P> {
    let (shift, incumbent, newcomer) = if shift >= 32 {
        let level = shift / HASH_SHIFT;
        let rehashed = Leaf {
            hash: rehash(&incumbent.key, level),
            key: incumbent.key.clone(),
            value: incumbent.value.clone(),
        };
        let hash = rehash(&newcomer.key, level);
        let newcomer = Leaf { hash, ..newcomer };
        (0, SharedPointer::new(rehashed), newcomer)
    } else {
        (shift, incumbent, newcomer)
    };

    let i1 = mask(incumbent.hash, shift);
    let i2 = mask(newcomer.hash, shift);
    if i1 == i2 {
        return SubTable {
            bitmap: 1 << i1,
            children: vec![Slot::table(resolve_collision(
                shift + HASH_SHIFT,
                incumbent,
                newcomer,
            ))],
        };
    }

    let bitmap = 1 << i1 | 1 << i2;
    let newcomer = SharedPointer::new(newcomer);
    let children = if i1 < i2 {
        vec![Slot::Leaf(incumbent), Slot::Leaf(newcomer)]
    } else {
        vec![Slot::Leaf(newcomer), Slot::Leaf(incumbent)]
    };
    SubTable { bitmap, children }
}
