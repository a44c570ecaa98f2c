//! Values whose static type is not known to the runtime.

use std::any::{self, Any};
use std::fmt;
use std::rc::Rc;

use crate::{Eval, Normalize, Value};

/// A data value that can be stored behind a [`Dynamic`].
///
/// Implemented for every `'static` type that is both a [`Value`] and
/// [`Normalize`].
pub trait Data: Value + Normalize + Any {
    /// Returns `self` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns the name of the concrete type.
    fn type_name(&self) -> &'static str;
}

impl<T: Value + Normalize + Any> Data for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        any::type_name::<T>()
    }
}

/// A runtime value of unknown static type.
#[derive(Clone)]
pub enum Dynamic {
    /// A compact native integer. Nullary constructors of enumeration-like
    /// types are encoded this way instead of being allocated.
    Int(i32),
    /// A native boolean.
    Bool(bool),
    /// A data constructor value.
    Data(Rc<dyn Data>),
    /// Any other host value.
    Opaque(Rc<dyn Any>),
}

impl Dynamic {
    /// Wraps a data constructor value.
    #[must_use]
    pub fn data(value: impl Data) -> Self {
        Self::Data(Rc::new(value))
    }

    /// Wraps an arbitrary host value.
    #[must_use]
    pub fn opaque(value: impl Any) -> Self {
        Self::Opaque(Rc::new(value))
    }

    /// Returns the integer if this is a compact integer.
    #[must_use]
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean if this is a native boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns a reference to the payload if it has type `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Data(data) => (**data).as_any().downcast_ref::<T>(),
            Self::Opaque(value) => (**value).downcast_ref::<T>(),
            Self::Int(_) | Self::Bool(_) => None,
        }
    }

    /// Returns the payload as `T`, or a type error naming both shapes.
    pub fn expect_data<T: Any>(&self) -> Eval<&T> {
        self.downcast_ref::<T>().ok_or(crate::EvalError::TypeError {
            expected: any::type_name::<T>(),
            got: self.type_name(),
        })
    }

    /// Returns a name for the shape of this value.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "Int",
            Self::Bool(_) => "Bool",
            Self::Data(data) => (**data).type_name(),
            Self::Opaque(_) => "opaque value",
        }
    }
}

impl Normalize for Dynamic {
    fn normalize(&self) -> Eval<()> {
        match self {
            Self::Data(data) => data.normalize(),
            Self::Int(_) | Self::Bool(_) | Self::Opaque(_) => Ok(()),
        }
    }
}

impl From<i32> for Dynamic {
    fn from(n: i32) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for Dynamic {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Data(data) => write!(f, "<{} #{}>", data.type_name(), data.constructor_tag()),
            Self::Opaque(_) => write!(f, "<opaque>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EvalError, Tag};

    #[derive(Debug, PartialEq)]
    enum Answer {
        No,
        Yes,
    }

    impl Value for Answer {
        fn constructor_tag(&self) -> Tag {
            match self {
                Self::No => 0,
                Self::Yes => 1,
            }
        }
    }

    impl Normalize for Answer {
        fn normalize(&self) -> Eval<()> {
            Ok(())
        }
    }

    #[test]
    fn test_downcast_data() {
        let d = Dynamic::data(Answer::Yes);
        assert_eq!(d.downcast_ref::<Answer>(), Some(&Answer::Yes));
        assert_eq!(d.downcast_ref::<String>(), None);
    }

    #[test]
    fn test_downcast_opaque() {
        let d = Dynamic::opaque(String::from("handle"));
        assert_eq!(d.downcast_ref::<String>().map(String::as_str), Some("handle"));
        assert_eq!(d.type_name(), "opaque value");
    }

    #[test]
    fn test_expect_data_reports_both_shapes() {
        let d = Dynamic::from(3);
        match d.expect_data::<Answer>() {
            Err(EvalError::TypeError { got, .. }) => assert_eq!(got, "Int"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_debug() {
        assert_eq!(format!("{:?}", Dynamic::from(true)), "true");
        assert_eq!(format!("{:?}", Dynamic::from(-4)), "-4");
    }
}
