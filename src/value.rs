// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Dynamically typed values and their equality contract.
//!
//! [`Value`] is the tagged sum over every kind of key or value the map can
//! hold. Equality is defined by [`PartialEq`] below: scalars compare by
//! value, reference-shaped handles compare by identity token, and
//! collections and structs compare deeply. `Value` is deliberately not
//! [`Eq`]: float payloads keep IEEE semantics, so `NaN != NaN`.

use std::fmt;

/// A dynamically typed value.
///
/// Any variant can be stored as a map value. Any variant except
/// [`Opaque`](Value::Opaque) can be used as a key; storing under an
/// `Opaque` key panics before anything is published.
///
/// Reference-shaped variants ([`Mapping`](Value::Mapping),
/// [`Interface`](Value::Interface), [`Pointer`](Value::Pointer)) carry a
/// stable 64-bit identity token rather than the referenced data; two
/// handles are equal exactly when their tokens are equal. A token of `0`
/// is the null reference and compares equal to [`Null`](Value::Null).
#[derive(Clone, Debug)]
pub enum Value {
    /// Unsigned 8-bit integer.
    U8(u8),
    /// Signed 8-bit integer.
    I8(i8),
    /// Unsigned 16-bit integer.
    U16(u16),
    /// Signed 16-bit integer.
    I16(i16),
    /// Unsigned 32-bit integer.
    U32(u32),
    /// Signed 32-bit integer.
    I32(i32),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// Signed 64-bit integer.
    I64(i64),
    /// Native-width unsigned integer.
    Uint(usize),
    /// Native-width signed integer.
    Int(isize),
    /// 32-bit float.
    F32(f32),
    /// 64-bit float.
    F64(f64),
    /// Text string.
    Str(String),
    /// Byte sequence.
    Bytes(Vec<u8>),
    /// Boolean.
    Bool(bool),
    /// Pointer-sized integer, compared by value like the other integers.
    Uintptr(usize),
    /// The null value.
    Null,
    /// A mapping handle, identified by token.
    Mapping(u64),
    /// An interface-like box, identified by token.
    Interface(u64),
    /// A pointer, identified by token.
    Pointer(u64),
    /// An ordered collection with slice semantics.
    Slice(Vec<Value>),
    /// An ordered collection with array semantics.
    Array(Vec<Value>),
    /// A record with a type name and ordered field values.
    Struct {
        /// The record's type name.
        name: String,
        /// Field values in declaration order.
        fields: Vec<Value>,
    },
    /// A host value of a kind the map cannot index (a function, a channel).
    ///
    /// The payload names the kind for diagnostics. Opaque values may be
    /// stored as map values but never as keys, and no two are ever equal.
    Opaque(&'static str),
}

impl Value {
    /// Construct a struct value from a type name and its field values.
    pub fn record(name: impl Into<String>, fields: Vec<Value>) -> Self {
        Value::Struct {
            name: name.into(),
            fields,
        }
    }

    /// Whether this value is null: either [`Null`](Value::Null) itself or a
    /// reference-shaped handle whose identity token is 0.
    pub fn is_null(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::Mapping(0) | Value::Interface(0) | Value::Pointer(0)
        )
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, _) | (_, Null) => self.is_null() && other.is_null(),
            (U8(a), U8(b)) => a == b,
            (I8(a), I8(b)) => a == b,
            (U16(a), U16(b)) => a == b,
            (I16(a), I16(b)) => a == b,
            (U32(a), U32(b)) => a == b,
            (I32(a), I32(b)) => a == b,
            (U64(a), U64(b)) => a == b,
            (I64(a), I64(b)) => a == b,
            (Uint(a), Uint(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (F32(a), F32(b)) => a == b,
            (F64(a), F64(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            (Bool(a), Bool(b)) => a == b,
            (Uintptr(a), Uintptr(b)) => a == b,
            (Mapping(a), Mapping(b)) => a == b,
            (Interface(a), Interface(b)) => a == b,
            (Pointer(a), Pointer(b)) => a == b,
            (Slice(a), Slice(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (
                Struct {
                    name: na,
                    fields: fa,
                },
                Struct {
                    name: nb,
                    fields: fb,
                },
            ) => na == nb && fa == fb,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::U8(x) => write!(f, "{x}"),
            Value::I8(x) => write!(f, "{x}"),
            Value::U16(x) => write!(f, "{x}"),
            Value::I16(x) => write!(f, "{x}"),
            Value::U32(x) => write!(f, "{x}"),
            Value::I32(x) => write!(f, "{x}"),
            Value::U64(x) => write!(f, "{x}"),
            Value::I64(x) => write!(f, "{x}"),
            Value::Uint(x) => write!(f, "{x}"),
            Value::Int(x) => write!(f, "{x}"),
            Value::F32(x) => write!(f, "{x}"),
            Value::F64(x) => write!(f, "{x}"),
            Value::Str(x) => write!(f, "{x:?}"),
            Value::Bytes(x) => write!(f, "{x:?}"),
            Value::Bool(x) => write!(f, "{x}"),
            Value::Uintptr(x) => write!(f, "{x:#x}"),
            Value::Null => write!(f, "null"),
            Value::Mapping(id) => write!(f, "mapping@{id:#x}"),
            Value::Interface(id) => write!(f, "interface@{id:#x}"),
            Value::Pointer(id) => write!(f, "pointer@{id:#x}"),
            Value::Slice(items) | Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Struct { name, fields } => {
                write!(f, "{name}{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{field}")?;
                }
                write!(f, "}}")
            }
            Value::Opaque(kind) => write!(f, "<{kind}>"),
        }
    }
}

macro_rules! impl_from {
    ($($t:ty => $variant:ident,)*) => {
        $(
            impl From<$t> for Value {
                fn from(x: $t) -> Self {
                    Value::$variant(x)
                }
            }
        )*
    };
}

impl_from! {
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    u64 => U64,
    i64 => I64,
    usize => Uint,
    isize => Int,
    f32 => F32,
    f64 => F64,
    String => Str,
    bool => Bool,
    Vec<u8> => Bytes,
    Vec<Value> => Slice,
}

impl From<&str> for Value {
    fn from(x: &str) -> Self {
        Value::Str(x.to_owned())
    }
}

impl From<&[u8]> for Value {
    fn from(x: &[u8]) -> Self {
        Value::Bytes(x.to_vec())
    }
}
