//! The tag capability and deep forcing.

use std::rc::Rc;
use std::sync::Arc;

use crate::Eval;

/// A constructor tag.
///
/// Tags number the constructors of a sum type in declaration order. Tag 0
/// also means "not a sum-type case" (functions, opaque values, ...).
pub type Tag = i32;

/// A runtime value that can report its constructor tag.
///
/// Case dispatch on a sum type consults the tag without forcing any field.
pub trait Value {
    /// Returns the constructor tag of this value.
    fn constructor_tag(&self) -> Tag {
        0
    }
}

/// Values that can be evaluated to normal form.
///
/// `normalize` forces every lazy reference reachable from `self`. Values
/// without lazy parts are already normal.
pub trait Normalize {
    /// Forces everything reachable from this value.
    fn normalize(&self) -> Eval<()>;
}

macro_rules! already_normal {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Normalize for $ty {
                #[inline]
                fn normalize(&self) -> Eval<()> {
                    Ok(())
                }
            }
        )*
    };
}

already_normal!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    str,
    String,
    Arc<str>,
);

impl<T: Normalize> Normalize for Option<T> {
    fn normalize(&self) -> Eval<()> {
        match self {
            Some(v) => v.normalize(),
            None => Ok(()),
        }
    }
}

impl<T: Normalize> Normalize for Vec<T> {
    fn normalize(&self) -> Eval<()> {
        self.iter().try_for_each(Normalize::normalize)
    }
}

impl<T: Normalize + ?Sized> Normalize for Rc<T> {
    fn normalize(&self) -> Eval<()> {
        (**self).normalize()
    }
}
