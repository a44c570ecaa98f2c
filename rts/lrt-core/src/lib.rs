//! Lazy object model for the LRT runtime system.
//!
//! Compiled code for a non-strict language is emitted against the types in
//! this crate:
//!
//! - **[`Value`]** - every runtime value can report a constructor tag
//! - **[`Lazy`] / [`LazyRef`]** - a handle to a value that may not be computed yet
//! - **[`Thunk`]** - a deferred computation that updates itself in place
//! - **[`Fun`]** - curried function values of arity 1 to 5
//! - **[`Product1`] .. [`Product6`]** - lazily-held fields of data constructors
//! - **[`SyncThunk`]** - a thunk that may be forced from several threads
//!
//! # Evaluation Model
//!
//! ```text
//!   LazyRef::delay(..)         force_shallow()          force_shallow()
//!          |                         |                        |
//!          v                         v                        v
//!   +-------------+          +-----------+            +-----------+
//!   | Unevaluated | -------> |  Forcing  | ---------> | Evaluated |  (memo, O(1))
//!   +-------------+          +-----------+            +-----------+
//!                                  |
//!                                  | computation fails
//!                                  v
//!                            +-----------+
//!                            |  Failed   |  (same error on every force)
//!                            +-----------+
//! ```
//!
//! # Example
//!
//! ```
//! use lrt_core::{Apply, Fun, Lazy, LazyRef};
//!
//! // Arguments arrive last-bound first: `y` is the second argument.
//! let sub: Fun<(i64, i64), i64> = Fun::new(|(y, x): (LazyRef<i64>, LazyRef<i64>)| {
//!     Ok(LazyRef::ready(x.force_shallow()? - y.force_shallow()?))
//! });
//!
//! let ten = LazyRef::ready(10);
//! let three = LazyRef::ready(3);
//! let saturated = sub.apply_all((ten.clone(), three.clone()));
//! let stepwise = sub.bind_one(ten).bind_one(three);
//!
//! assert_eq!(saturated.force_shallow().unwrap(), 7);
//! assert_eq!(stepwise.force_shallow().unwrap(), 7);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

mod dynamic;
mod error;
mod fun;
mod lazy;
mod product;
mod sync;
mod thunk;
mod value;

pub use dynamic::{Data, Dynamic};
pub use error::{Eval, EvalError};
pub use fun::{Apply, Fun, Params};
pub use lazy::{Lazy, LazyRef};
pub use product::{
    field, field_of, Constructor, FieldOf, HasField, Product1, Product2, Product3, Product4,
    Product5, Product6,
};
pub use sync::{SharedRef, SyncThunk};
pub use thunk::Thunk;
pub use value::{Normalize, Tag, Value};
