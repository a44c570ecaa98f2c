//! Tagged products: the representation of data constructor values.
//!
//! A data constructor with N fields is stored as a `ProductN`, holding N
//! lazy field references. The fields are stored as given and never forced
//! by the product itself, so infinite and circular structures are fine.
//!
//! The constructor tag belongs to the concrete data type, not to the
//! product: a data type wraps (or, for sum types, is an enum over) products
//! and implements [`Value`] itself.
//!
//! ```text
//!   enum List { Nil, Cons(Product2<i64, List>) }
//!                            |
//!               +------------+------------+
//!               |                         |
//!         LazyRef<i64> (m1)        LazyRef<List> (m2)
//! ```
//!
//! Fields are read either directly (`product.m1()`) or through the shared
//! accessor functions returned by [`field`], which compose like any other
//! function value. Products of different arity are unrelated types, so a
//! three-field value can never reach a two-field accessor:
//!
//! ```compile_fail
//! use lrt_core::{field, Apply, Constructor, LazyRef, Product2, Product3, Value};
//!
//! #[derive(Clone)]
//! struct Pair(Product2<i64, i64>);
//! impl Value for Pair {}
//! impl Constructor for Pair {
//!     type Shape = Product2<i64, i64>;
//!     fn shape(&self) -> &Self::Shape { &self.0 }
//! }
//!
//! #[derive(Clone)]
//! struct Triple(Product3<i64, i64, i64>);
//! impl Value for Triple {}
//! impl Constructor for Triple {
//!     type Shape = Product3<i64, i64, i64>;
//!     fn shape(&self) -> &Self::Shape { &self.0 }
//! }
//!
//! let triple = Triple(Product3::new(
//!     LazyRef::ready(1),
//!     LazyRef::ready(2),
//!     LazyRef::ready(3),
//! ));
//! let first = field::<Pair, 0>();
//! let _ = first.bind_one(LazyRef::ready(triple));
//! ```
//!
//! The same call with a `LazyRef<Pair>` compiles:
//!
//! ```
//! # use lrt_core::{field, Apply, Constructor, Lazy, LazyRef, Product2, Value};
//! # #[derive(Clone)]
//! # struct Pair(Product2<i64, i64>);
//! # impl Value for Pair {}
//! # impl Constructor for Pair {
//! #     type Shape = Product2<i64, i64>;
//! #     fn shape(&self) -> &Self::Shape { &self.0 }
//! # }
//! let pair = Pair(Product2::new(LazyRef::ready(1), LazyRef::ready(2)));
//! let first = field::<Pair, 0>();
//! assert_eq!(first.bind_one(LazyRef::ready(pair)).force_shallow(), Ok(1));
//! ```

use std::any::{self, Any};
use std::fmt;

use crate::{Dynamic, Eval, EvalError, Fun, Lazy, LazyRef, Normalize, Value};

/// Access to field `I` of a product.
pub trait HasField<const I: usize> {
    /// Type of the field's value.
    type Field;

    /// Returns the lazy reference stored in the field.
    fn field(&self) -> &LazyRef<Self::Field>;
}

/// A data constructor represented by a single product shape.
pub trait Constructor: Value + Clone + 'static {
    /// The product holding the constructor's fields.
    type Shape;

    /// Returns the product.
    fn shape(&self) -> &Self::Shape;
}

/// Type of field `I` of constructor `C`.
pub type FieldOf<C, const I: usize> = <<C as Constructor>::Shape as HasField<I>>::Field;

macro_rules! has_field {
    ($name:ident [$($T:ident),+] $idx:literal $m:ident $F:ident) => {
        impl<$($T),+> HasField<$idx> for $name<$($T),+> {
            type Field = $F;

            #[inline]
            fn field(&self) -> &LazyRef<$F> {
                &self.$m
            }
        }
    };
}

macro_rules! product {
    ($(#[$doc:meta])* $name:ident $n:literal $generics:tt { $($idx:literal => $m:ident: $F:ident),+ }) => {
        $(#[$doc])*
        pub struct $name<$($F),+> {
            $($m: LazyRef<$F>,)+
        }

        impl<$($F),+> $name<$($F),+> {
            /// Number of fields.
            pub const ARITY: usize = $n;

            /// Stores the field references without forcing them.
            #[must_use]
            pub fn new($($m: LazyRef<$F>),+) -> Self {
                Self { $($m),+ }
            }

            $(
                #[doc = concat!("Returns field ", stringify!($idx), ".")]
                #[inline]
                pub fn $m(&self) -> &LazyRef<$F> {
                    &self.$m
                }
            )+
        }

        impl<$($F),+> Clone for $name<$($F),+> {
            fn clone(&self) -> Self {
                Self { $($m: self.$m.clone()),+ }
            }
        }

        $(has_field!($name $generics $idx $m $F);)+

        impl<$($F: Normalize),+> Normalize for $name<$($F),+> {
            fn normalize(&self) -> Eval<()> {
                $(self.$m.normalize()?;)+
                Ok(())
            }
        }

        impl<$($F),+> fmt::Debug for $name<$($F),+> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name))
                    $(.field(&self.$m))+
                    .finish()
            }
        }
    };
}

product!(
    /// A product with one field.
    Product1 1 [T1] { 0 => m1: T1 }
);
product!(
    /// A product with two fields.
    Product2 2 [T1, T2] { 0 => m1: T1, 1 => m2: T2 }
);
product!(
    /// A product with three fields.
    Product3 3 [T1, T2, T3] { 0 => m1: T1, 1 => m2: T2, 2 => m3: T3 }
);
product!(
    /// A product with four fields.
    Product4 4 [T1, T2, T3, T4] { 0 => m1: T1, 1 => m2: T2, 2 => m3: T3, 3 => m4: T4 }
);
product!(
    /// A product with five fields.
    Product5 5 [T1, T2, T3, T4, T5] {
        0 => m1: T1, 1 => m2: T2, 2 => m3: T3, 3 => m4: T4, 4 => m5: T5
    }
);
product!(
    /// A product with six fields.
    Product6 6 [T1, T2, T3, T4, T5, T6] {
        0 => m1: T1, 1 => m2: T2, 2 => m3: T3, 3 => m4: T4, 4 => m5: T5, 5 => m6: T6
    }
);

fn project<C, const I: usize>((this,): (LazyRef<C>,)) -> Eval<LazyRef<FieldOf<C, I>>>
where
    C: Constructor,
    C::Shape: HasField<I>,
{
    let value = this.force_shallow()?;
    Ok(<C::Shape as HasField<I>>::field(value.shape()).clone())
}

/// Returns the accessor function for field `I` of constructor `C`.
///
/// The accessor forces its argument to reach the constructor, but not the
/// field. Every call returns the same stateless code, so accessors cost no
/// allocation and may be shared freely.
#[must_use]
pub fn field<C, const I: usize>() -> Fun<(C,), FieldOf<C, I>>
where
    C: Constructor,
    C::Shape: HasField<I>,
    FieldOf<C, I>: 'static,
{
    Fun::from_fn(project::<C, I>)
}

/// Reads field `I` of a dynamically typed constructor value.
///
/// Fails with [`EvalError::TypeError`] if the value is not a `C`.
pub fn field_of<C, const I: usize>(value: &Dynamic) -> Eval<LazyRef<FieldOf<C, I>>>
where
    C: Constructor + Any,
    C::Shape: HasField<I>,
{
    match value.downcast_ref::<C>() {
        Some(data) => Ok(<C::Shape as HasField<I>>::field(data.shape()).clone()),
        None => Err(EvalError::TypeError {
            expected: any::type_name::<C>(),
            got: value.type_name(),
        }),
    }
}
