//! The lazy reference capability.
//!
//! [`Lazy`] is implemented by everything that can be forced: single-threaded
//! thunks ([`Thunk`]) and thread-safe thunks ([`SyncThunk`](crate::SyncThunk)).
//! Compiled code passes values around as [`LazyRef`], a cheap shared handle
//! to a thunk.

use std::fmt;
use std::rc::{Rc, Weak};

use crate::thunk::Pending;
use crate::{Eval, EvalError, Normalize, Thunk};

/// A value that may not have been computed yet.
///
/// Every force hands out a clone of the memoized value, so `T` should be
/// cheap to clone: a scalar, a data value made of lazy references, or a
/// payload behind an `Rc`. A `LazyRef<String>` copies the string on each
/// force; a `LazyRef<Rc<str>>` does not.
pub trait Lazy<T> {
    /// Forces the value to weak head normal form.
    ///
    /// Forcing is idempotent: once a value has been produced, every later
    /// force returns the same value without recomputing it.
    fn force_shallow(&self) -> Eval<T>;

    /// Returns true if forcing would still have to run a computation.
    fn is_unevaluated(&self) -> bool;

    /// Forces the value and everything reachable from it.
    fn force_deep(&self) -> Eval<T>
    where
        T: Normalize,
    {
        let value = self.force_shallow()?;
        value.normalize()?;
        Ok(value)
    }

    /// Takes the computation out of an unevaluated cell and marks the cell
    /// as being forced. Returns the outcome instead if there is nothing to
    /// run.
    #[doc(hidden)]
    fn take_pending(&self) -> Result<Pending<T>, Eval<T>> {
        Err(self.force_shallow())
    }

    /// Stores the outcome for a cell emptied by `take_pending`.
    #[doc(hidden)]
    fn settle(&self, _outcome: &Eval<T>) {}
}

/// A shared handle to a lazy value.
///
/// Cloning a `LazyRef` shares the underlying cell: when one holder forces
/// it, every other holder observes the memoized result.
pub struct LazyRef<T>(Rc<dyn Lazy<T>>);

impl<T> Clone for LazyRef<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: Clone + 'static> LazyRef<T> {
    /// Wraps an already evaluated value.
    #[must_use]
    pub fn ready(value: T) -> Self {
        Self(Rc::new(Thunk::evaluated(value)))
    }

    /// Defers a computation.
    ///
    /// The computation may return another lazy reference; forcing chases it
    /// to a final value before memoizing.
    #[must_use]
    pub fn delay(code: impl FnOnce() -> Eval<LazyRef<T>> + 'static) -> Self {
        Self(Rc::new(Thunk::new(code)))
    }

    /// Defers a computation that produces its value directly.
    #[must_use]
    pub fn delay_value(code: impl FnOnce() -> Eval<T> + 'static) -> Self {
        Self::delay(move || code().map(Self::ready))
    }

    /// Defers a computation that refers to its own result.
    ///
    /// This ties the knot for circular structures such as `ones = 1 : ones`.
    /// The computation receives a handle to the thunk being defined; the
    /// structure keeps itself alive for as long as it refers to itself.
    #[must_use]
    pub fn fix(code: impl FnOnce(LazyRef<T>) -> Eval<LazyRef<T>> + 'static) -> Self {
        let cell = Rc::new_cyclic(|this: &Weak<Thunk<T>>| {
            let this = this.clone();
            Thunk::new(move || {
                let this = this
                    .upgrade()
                    .ok_or_else(|| EvalError::user("self-referential thunk was released"))?;
                code(LazyRef::from_rc(this))
            })
        });
        Self::from_rc(cell)
    }

    /// Shares an existing lazy cell.
    #[must_use]
    pub fn from_rc(cell: Rc<impl Lazy<T> + 'static>) -> Self {
        Self(cell)
    }
}

impl<T> LazyRef<T> {
    /// Returns true if both handles refer to the same cell.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Lazy<T> for LazyRef<T> {
    #[inline]
    fn force_shallow(&self) -> Eval<T> {
        self.0.force_shallow()
    }

    #[inline]
    fn is_unevaluated(&self) -> bool {
        self.0.is_unevaluated()
    }

    fn take_pending(&self) -> Result<Pending<T>, Eval<T>> {
        self.0.take_pending()
    }

    fn settle(&self, outcome: &Eval<T>) {
        self.0.settle(outcome);
    }
}

impl<T: Normalize> Normalize for LazyRef<T> {
    fn normalize(&self) -> Eval<()> {
        self.force_shallow()?.normalize()
    }
}

impl<T: Clone + 'static> From<T> for LazyRef<T> {
    fn from(value: T) -> Self {
        Self::ready(value)
    }
}

impl<T> fmt::Debug for LazyRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unevaluated() {
            write!(f, "<thunk>")
        } else {
            write!(f, "<evaluated>")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_ready_is_evaluated() {
        let r = LazyRef::ready(5_i64);
        assert!(!r.is_unevaluated());
        assert_eq!(r.force_shallow(), Ok(5));
        assert_eq!(r.force_shallow(), Ok(5));
    }

    #[test]
    fn test_delay_is_lazy() {
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        let r = LazyRef::delay_value(move || {
            flag.set(true);
            Ok(1_i64)
        });
        assert!(r.is_unevaluated());
        assert!(!ran.get());
        assert_eq!(r.force_shallow(), Ok(1));
        assert!(ran.get());
        assert!(!r.is_unevaluated());
    }

    #[test]
    fn test_clones_share_the_cell() {
        let r = LazyRef::delay_value(|| Ok(String::from("shared")));
        let s = r.clone();
        assert!(r.ptr_eq(&s));
        assert_eq!(s.force_shallow().unwrap(), "shared");
        assert!(!r.is_unevaluated());
    }

    #[test]
    fn test_fix_sees_itself() {
        // A thunk whose value is "a reference to itself, forced once".
        let count = Rc::new(Cell::new(0));
        let hits = Rc::clone(&count);
        let r: LazyRef<i64> = LazyRef::fix(move |this| {
            hits.set(hits.get() + 1);
            assert!(this.is_unevaluated());
            Ok(LazyRef::ready(9))
        });
        assert_eq!(r.force_shallow(), Ok(9));
        assert_eq!(r.force_shallow(), Ok(9));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_force_deep_normalizes() {
        let inner = LazyRef::delay_value(|| Ok(3_i64));
        let outer: LazyRef<LazyRef<i64>> = LazyRef::ready(inner.clone());
        assert!(inner.is_unevaluated());
        outer.force_deep().unwrap();
        assert!(!inner.is_unevaluated());
    }

    #[test]
    fn test_debug_reports_state() {
        let r = LazyRef::delay_value(|| Ok(0_u8));
        assert_eq!(format!("{r:?}"), "<thunk>");
        r.force_shallow().unwrap();
        assert_eq!(format!("{r:?}"), "<evaluated>");
    }
}
