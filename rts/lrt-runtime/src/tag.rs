//! Constructor tag extraction.

use lrt_core::{Dynamic, Tag, Value};

/// Returns the constructor tag of a statically typed value.
#[inline]
pub fn constructor_tag<V: Value + ?Sized>(value: &V) -> Tag {
    value.constructor_tag()
}

/// Returns the constructor tag of a value of unknown type.
///
/// Data values report their own tag. A compact integer is a nullary
/// constructor encoded as its tag, so it is returned unchanged. Anything
/// else has tag 0.
pub fn constructor_tag_of(value: &Dynamic) -> Tag {
    match value {
        Dynamic::Data(data) => data.constructor_tag(),
        Dynamic::Int(n) => *n,
        Dynamic::Bool(_) | Dynamic::Opaque(_) => 0,
    }
}
