// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The 32-bit digest protocol for dynamically typed values.
//!
//! [`hash`] produces the digest that positions a key in the trie;
//! [`rehash`] mixes a level counter into the digest so that a key re-enters
//! fresh 32-bit hash space each time the trie exhausts the previous digest.
//! The digest is a CRC-32 (IEEE) over the little-endian level, a one-byte
//! type tag, and a canonical little-endian encoding of the value. Nested
//! values are written into the same accumulator, each followed by a `0x00`
//! separator.
//!
//! Equal values produce equal digests at every level. The converse does not
//! hold, and the digest is a checksum, not a cryptographic hash: callers
//! must not feed it adversarially constructed keys.
//!
//! Hashing assumes acyclic structural values. A struct that reaches itself
//! through slice or struct edges would recurse forever; pointer-shaped
//! edges hash by identity token and therefore break cycles.

use crc32fast::Hasher;

use crate::value::Value;

/// The top-level digest of a value, used to position a key in the trie.
///
/// # Panics
///
/// Panics if the value (or anything nested in it) is
/// [`Opaque`](Value::Opaque).
pub fn hash(value: &Value) -> u32 {
    rehash(value, 0)
}

/// The digest of a value at the given rehash level.
///
/// `rehash(v, 0)` is [`hash`]`(v)`. Each higher level yields an unrelated
/// digest for continued trie descent.
///
/// # Panics
///
/// Panics if the value (or anything nested in it) is
/// [`Opaque`](Value::Opaque).
pub fn rehash(value: &Value, level: u32) -> u32 {
    let mut digest = Hasher::new();
    digest.update(&level.to_le_bytes());
    write_value(&mut digest, value);
    digest.finalize()
}

fn write_value(digest: &mut Hasher, value: &Value) {
    digest.update(&[type_tag(value)]);
    match value {
        Value::U8(x) => digest.update(&[*x]),
        Value::I8(x) => digest.update(&[zigzag8(*x)]),
        Value::U16(x) => digest.update(&x.to_le_bytes()),
        Value::I16(x) => digest.update(&zigzag16(*x).to_le_bytes()),
        Value::U32(x) => digest.update(&x.to_le_bytes()),
        Value::I32(x) => digest.update(&zigzag32(*x).to_le_bytes()),
        Value::U64(x) => digest.update(&x.to_le_bytes()),
        Value::I64(x) => digest.update(&zigzag64(*x).to_le_bytes()),
        Value::Uint(x) => digest.update(&(*x as u64).to_le_bytes()),
        Value::Int(x) => digest.update(&zigzag64(*x as i64).to_le_bytes()),
        Value::F32(x) => digest.update(&x.to_bits().to_le_bytes()),
        Value::F64(x) => digest.update(&x.to_bits().to_le_bytes()),
        Value::Str(x) => digest.update(x.as_bytes()),
        Value::Bytes(x) => digest.update(x),
        Value::Bool(x) => digest.update(&[u8::from(*x)]),
        Value::Uintptr(x) => digest.update(&(*x as u64).to_le_bytes()),
        Value::Null => {}
        Value::Mapping(id) | Value::Interface(id) | Value::Pointer(id) => {
            digest.update(&id.to_le_bytes());
        }
        Value::Slice(items) | Value::Array(items) => {
            for item in items {
                write_value(digest, item);
                digest.update(&[0]);
            }
        }
        Value::Struct { name, fields } => {
            digest.update(name.as_bytes());
            for field in fields {
                write_value(digest, field);
                digest.update(&[0]);
            }
        }
        Value::Opaque(_) => unreachable!(),
    }
}

fn type_tag(value: &Value) -> u8 {
    match value {
        Value::U8(_) => 1,
        Value::I8(_) => 2,
        Value::U16(_) => 3,
        Value::I16(_) => 4,
        Value::U32(_) => 5,
        Value::I32(_) => 6,
        Value::U64(_) => 7,
        Value::I64(_) => 8,
        Value::Uint(_) => 9,
        Value::Int(_) => 10,
        Value::F32(_) => 11,
        Value::F64(_) => 12,
        Value::Str(_) => 13,
        Value::Bytes(_) => 14,
        Value::Bool(_) => 15,
        Value::Uintptr(_) => 16,
        Value::Null => 17,
        Value::Mapping(_) => 18,
        Value::Interface(_) => 19,
        Value::Pointer(_) => 20,
        Value::Slice(_) => 21,
        Value::Array(_) => 22,
        Value::Struct { .. } => 23,
        Value::Opaque(kind) => panic!("cannot index value of kind {kind}"),
    }
}

// Zig-zag keeps small magnitudes near zero while folding the sign into the
// low bit: 0, -1, 1, -2, ... map to 0, 1, 2, 3, ...

fn zigzag8(x: i8) -> u8 {
    ((x << 1) ^ (x >> 7)) as u8
}

fn zigzag16(x: i16) -> u16 {
    ((x << 1) ^ (x >> 15)) as u16
}

fn zigzag32(x: i32) -> u32 {
    ((x << 1) ^ (x >> 31)) as u32
}

fn zigzag64(x: i64) -> u64 {
    ((x << 1) ^ (x >> 63)) as u64
}
