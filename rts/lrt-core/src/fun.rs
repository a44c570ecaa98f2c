//! Curried function values.
//!
//! A function value of arity N is a [`Fun<P, R>`] where `P` is the tuple
//! of its parameter types in application order, e.g. `Fun<(A, B, C), R>`
//! for `A -> B -> C -> R`. Arities 1 to 5 are supported.
//!
//! # Calling Convention
//!
//! The underlying computation receives its arguments **last-bound first**:
//! a `Fun<(A, B, C), R>` runs with `(LazyRef<C>, LazyRef<B>, LazyRef<A>)`.
//! Each partial application then only appends the newest argument to the
//! ones a later application delivers; previously bound arguments are never
//! reshuffled.
//!
//! ```text
//!   f : Fun<(A, B, C), R>
//!   f.bind_one(a)             -> Fun<(B, C), R>   runs f with (c, b) ++ (a)
//!   f.bind_one(a).bind_one(b) -> Fun<(C,), R>     runs f with (c) ++ (b, a)
//!   f.apply_all((a, b, c))    -> LazyRef<R>       runs f with (c, b, a)
//! ```
//!
//! Both paths must force to the same value; `apply_all` is preferred when
//! all arguments are known since it skips the intermediate partial
//! applications.

use std::fmt;
use std::mem::ManuallyDrop;
use std::rc::Rc;

use crate::{Eval, LazyRef, Normalize, Value};

/// A parameter list of a curried function.
///
/// Implemented for tuples `(A1,)` through `(A1, A2, A3, A4, A5)`.
pub trait Params: 'static {
    /// Number of parameters.
    const ARITY: usize;

    /// Lazily held arguments in delivery (reverse application) order.
    type Delivered: 'static;
}

enum Code<P: Params, R> {
    /// A stateless function shared by every value built from it.
    Static(fn(P::Delivered) -> Eval<LazyRef<R>>),
    /// A closure, possibly holding bound arguments.
    Closure(Rc<dyn Fn(P::Delivered) -> Eval<LazyRef<R>>>),
}

impl<P: Params, R> Clone for Code<P, R> {
    fn clone(&self) -> Self {
        match self {
            Self::Static(f) => Self::Static(*f),
            Self::Closure(c) => Self::Closure(Rc::clone(c)),
        }
    }
}

impl<P: Params, R> Code<P, R> {
    #[inline]
    fn call(&self, args: P::Delivered) -> Eval<LazyRef<R>> {
        match self {
            Self::Static(f) => f(args),
            Self::Closure(c) => c(args),
        }
    }
}

/// A curried function value taking parameters `P` and producing `R`.
pub struct Fun<P: Params, R> {
    code: Code<P, R>,
}

impl<P: Params, R> Clone for Fun<P, R> {
    fn clone(&self) -> Self {
        Self {
            code: self.code.clone(),
        }
    }
}

impl<P: Params, R: 'static> Fun<P, R> {
    /// Creates a function from its computation.
    ///
    /// The computation receives the arguments last-bound first and returns
    /// the result, which may itself still be lazy.
    #[must_use]
    pub fn new(run: impl Fn(P::Delivered) -> Eval<LazyRef<R>> + 'static) -> Self {
        Self {
            code: Code::Closure(Rc::new(run)),
        }
    }

    /// Creates a function from a plain function pointer.
    ///
    /// Such functions carry no state and cost no allocation; every copy
    /// shares the same code.
    #[must_use]
    pub const fn from_fn(run: fn(P::Delivered) -> Eval<LazyRef<R>>) -> Self {
        Self {
            code: Code::Static(run),
        }
    }

    /// Runs the function with arguments in delivery order.
    pub fn run(&self, args: P::Delivered) -> Eval<LazyRef<R>> {
        self.code.call(args)
    }

    /// Returns the number of arguments this function still expects.
    #[must_use]
    pub const fn arity(&self) -> usize {
        P::ARITY
    }

    /// Reinterprets this function at another signature without copying.
    ///
    /// Used for shared helpers that are reused across types which differ in
    /// name only, e.g. a `#[repr(transparent)]` newtype and its payload.
    /// No check is performed at runtime.
    ///
    /// # Safety
    ///
    /// `Q` must have the same arity as `P`, and every parameter type of `Q`
    /// and the result `S` must have the same runtime representation as the
    /// corresponding type of `P` and `R`. The function is only ever called
    /// with values of the new types, so any mismatch in layout is undefined
    /// behavior.
    #[must_use]
    pub unsafe fn coerce<Q: Params, S: 'static>(self) -> Fun<Q, S> {
        let this = ManuallyDrop::new(self);
        // SAFETY: `Fun` holds either a function pointer or a reference-counted
        // trait object; neither layout depends on the type parameters. The
        // caller guarantees the code can be called with `Q::Delivered`. The
        // original is not dropped, so the reference count moves over intact.
        unsafe { std::mem::transmute_copy::<Fun<P, R>, Fun<Q, S>>(&*this) }
    }
}

/// Application of a curried function.
pub trait Apply {
    /// Type of the first parameter.
    type First;
    /// Result type once saturated.
    type Output;
    /// All arguments in application order.
    type Applied;
    /// What remains after binding the first argument: a function of one
    /// lower arity, or the lazy result for arity 1.
    type Partial;

    /// Binds the next argument.
    fn bind_one(&self, arg: LazyRef<Self::First>) -> Self::Partial;

    /// Binds all arguments at once, without building the intermediate
    /// partial applications. The function runs when the result is forced.
    fn apply_all(&self, args: Self::Applied) -> LazyRef<Self::Output>;
}

macro_rules! curried {
    (@partial $R:ident;) => { LazyRef<$R> };
    (@partial $R:ident; $($A:ident),+) => { Fun<($($A,)+), $R> };

    (@bind $code:ident $a1:ident;) => {
        LazyRef::delay(move || $code.call(($a1,)))
    };
    (@bind $code:ident $a1:ident; $($RA:ident $ra:ident),+) => {
        Fun::new(move |($($ra,)+): ($(LazyRef<$RA>,)+)| {
            $code.call(($($ra,)+ $a1.clone(),))
        })
    };

    ($n:literal; $A1:ident $a1:ident; [$($A:ident $a:ident),*]; [$($RA:ident $ra:ident),*]) => {
        impl<$A1: 'static, $($A: 'static,)*> Params for ($A1, $($A,)*) {
            const ARITY: usize = $n;
            type Delivered = ($(LazyRef<$RA>,)* LazyRef<$A1>,);
        }

        impl<$A1: 'static, $($A: 'static,)* R: Clone + 'static> Apply for Fun<($A1, $($A,)*), R> {
            type First = $A1;
            type Output = R;
            type Applied = (LazyRef<$A1>, $(LazyRef<$A>,)*);
            type Partial = curried!(@partial R; $($A),*);

            fn bind_one(&self, $a1: LazyRef<$A1>) -> Self::Partial {
                let code = self.code.clone();
                curried!(@bind code $a1; $($RA $ra),*)
            }

            fn apply_all(&self, args: Self::Applied) -> LazyRef<R> {
                let ($a1, $($a,)*) = args;
                let code = self.code.clone();
                LazyRef::delay(move || code.call(($($ra,)* $a1,)))
            }
        }
    };
}

curried!(1; A1 a1; []; []);
curried!(2; A1 a1; [A2 a2]; [A2 a2]);
curried!(3; A1 a1; [A2 a2, A3 a3]; [A3 a3, A2 a2]);
curried!(4; A1 a1; [A2 a2, A3 a3, A4 a4]; [A4 a4, A3 a3, A2 a2]);
curried!(5; A1 a1; [A2 a2, A3 a3, A4 a4, A5 a5]; [A5 a5, A4 a4, A3 a3, A2 a2]);

/// Functions are never sum-type cases.
impl<P: Params, R> Value for Fun<P, R> {}

/// A function is already in normal form.
impl<P: Params, R> Normalize for Fun<P, R> {
    fn normalize(&self) -> Eval<()> {
        Ok(())
    }
}

impl<P: Params, R> fmt::Debug for Fun<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function/{}>", P::ARITY)
    }
}
