// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A persistent hash array mapped trie for dynamically typed keys.
//!
//! This crate provides [`Map`], an immutable associative map whose keys and
//! values are [`Value`]s: a tagged sum over integers of every width, floats,
//! strings, byte sequences, booleans, null, reference handles, ordered
//! collections, and records. Updating a map returns a new map that shares
//! structure with its predecessor; the old map remains valid and unchanged,
//! so any number of threads can read any number of generations without
//! synchronization.
//!
//! # Examples
//!
//! ```
//! use dynhamt::{Map, Value};
//!
//! let empty = Map::new();
//! let m1 = empty.store("hello", "world");
//! let m2 = m1.store("bar", "baz");
//!
//! assert_eq!(Some(&Value::from("world")), m2.load(&Value::from("hello")));
//! assert_eq!(Some(&Value::from("baz")), m2.load(&Value::from("bar")));
//!
//! // Previous generations are untouched.
//! assert_eq!(None, m1.load(&Value::from("bar")));
//! assert_eq!(0, empty.len());
//! ```
//!
//! # How it works
//!
//! Keys are digested to 32 bits with a CRC-32 over a canonical byte
//! encoding (see [`hash`](crate::hash)), and the digest is consumed five
//! bits at a time to index a 32-ary trie. Interior nodes compress their 32
//! logical slots into a bitmap plus a dense child vector; updates copy only
//! the spine from the root to the touched slot. When two keys exhaust the
//! 32-bit digest without diverging, they are rehashed with a level counter
//! mixed in and descent continues in fresh hash space.
//!
//! # Limits
//!
//! - The digest is a checksum, not a cryptographic hash; do not expose the
//!   map to adversarially chosen keys.
//! - Structural keys must be acyclic. Cycles through pointer-shaped edges
//!   are fine (those hash by identity), but a value that reaches itself
//!   through slice or struct edges cannot be hashed.
//! - There is no `delete` and no iteration over entries; the map is a
//!   grow-only set of persistent generations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod nodes;

pub mod hash;
pub mod map;
pub mod shared_ptr;
pub mod value;

pub use crate::map::{GenericMap, Map};
pub use crate::shared_ptr::DefaultSharedPtr;
pub use crate::value::Value;
