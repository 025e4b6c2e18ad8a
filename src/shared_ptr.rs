//! About shared pointers. Re-export the [`archery`] crate.
//!
//! [`archery`]: https://docs.rs/archery/latest/

pub use archery::{ArcK, RcK, SharedPointer, SharedPointerKind};

/// Default shared pointer used for trie nodes in this crate.
///
/// [`ArcK`] makes maps [`Send`] and [`Sync`]; single-threaded callers can
/// instantiate [`GenericMap`](crate::GenericMap) with [`RcK`] instead.
///
/// [`ArcK`]: https://docs.rs/archery/latest/archery/shared_pointer/kind/struct.ArcK.html
pub type DefaultSharedPtr = ArcK;
