//! Property tests for lrt-core
//!
//! These tests check the laws the object model promises to compiled code.

use lrt_core::{field, Apply, Constructor, Eval, Fun, Lazy, LazyRef, Product3, Value};
use proptest::prelude::*;

type L = LazyRef<i64>;

/// Weighs arguments by position, so any reordering changes the result.
fn weigh(args: &[i64]) -> i64 {
    args.iter()
        .fold(0_i64, |acc, &x| acc.wrapping_mul(31).wrapping_add(x))
}

fn ready(x: i64) -> L {
    LazyRef::ready(x)
}

fn result(xs: &[Eval<i64>]) -> Eval<LazyRef<i64>> {
    let values = xs.iter().cloned().collect::<Eval<Vec<i64>>>()?;
    Ok(LazyRef::ready(weigh(&values)))
}

fn fun1() -> Fun<(i64,), i64> {
    Fun::new(|(a,): (L,)| result(&[a.force_shallow()]))
}

fn fun2() -> Fun<(i64, i64), i64> {
    Fun::new(|(b, a): (L, L)| result(&[a.force_shallow(), b.force_shallow()]))
}

fn fun3() -> Fun<(i64, i64, i64), i64> {
    Fun::new(|(c, b, a): (L, L, L)| {
        result(&[a.force_shallow(), b.force_shallow(), c.force_shallow()])
    })
}

fn fun4() -> Fun<(i64, i64, i64, i64), i64> {
    Fun::new(|(d, c, b, a): (L, L, L, L)| {
        result(&[
            a.force_shallow(),
            b.force_shallow(),
            c.force_shallow(),
            d.force_shallow(),
        ])
    })
}

fn fun5() -> Fun<(i64, i64, i64, i64, i64), i64> {
    Fun::new(|(e, d, c, b, a): (L, L, L, L, L)| {
        result(&[
            a.force_shallow(),
            b.force_shallow(),
            c.force_shallow(),
            d.force_shallow(),
            e.force_shallow(),
        ])
    })
}

// ============================================================
// Arity reduction: bind_one chaining == apply_all
// ============================================================

proptest! {
    #[test]
    fn arity_1_reduction(a in any::<i64>()) {
        let f = fun1();
        let expected = weigh(&[a]);
        prop_assert_eq!(f.bind_one(ready(a)).force_shallow(), Ok(expected));
        prop_assert_eq!(f.apply_all((ready(a),)).force_shallow(), Ok(expected));
    }

    #[test]
    fn arity_2_reduction(a in any::<i64>(), b in any::<i64>()) {
        let f = fun2();
        let stepwise = f.bind_one(ready(a)).bind_one(ready(b));
        let saturated = f.apply_all((ready(a), ready(b)));
        prop_assert_eq!(stepwise.force_shallow(), saturated.force_shallow());
        prop_assert_eq!(saturated.force_shallow(), Ok(weigh(&[a, b])));
    }

    #[test]
    fn arity_3_reduction(a in any::<i64>(), b in any::<i64>(), c in any::<i64>()) {
        let f = fun3();
        let stepwise = f.bind_one(ready(a)).bind_one(ready(b)).bind_one(ready(c));
        let saturated = f.apply_all((ready(a), ready(b), ready(c)));
        prop_assert_eq!(stepwise.force_shallow(), saturated.force_shallow());
        prop_assert_eq!(saturated.force_shallow(), Ok(weigh(&[a, b, c])));
    }

    #[test]
    fn arity_4_reduction(
        a in any::<i64>(),
        b in any::<i64>(),
        c in any::<i64>(),
        d in any::<i64>(),
    ) {
        let f = fun4();
        let stepwise = f
            .bind_one(ready(a))
            .bind_one(ready(b))
            .bind_one(ready(c))
            .bind_one(ready(d));
        let saturated = f.apply_all((ready(a), ready(b), ready(c), ready(d)));
        prop_assert_eq!(stepwise.force_shallow(), saturated.force_shallow());
        prop_assert_eq!(saturated.force_shallow(), Ok(weigh(&[a, b, c, d])));
    }

    #[test]
    fn arity_5_reduction(
        a in any::<i64>(),
        b in any::<i64>(),
        c in any::<i64>(),
        d in any::<i64>(),
        e in any::<i64>(),
    ) {
        let f = fun5();
        let stepwise = f
            .bind_one(ready(a))
            .bind_one(ready(b))
            .bind_one(ready(c))
            .bind_one(ready(d))
            .bind_one(ready(e));
        let saturated = f.apply_all((ready(a), ready(b), ready(c), ready(d), ready(e)));
        prop_assert_eq!(stepwise.force_shallow(), saturated.force_shallow());
        prop_assert_eq!(saturated.force_shallow(), Ok(weigh(&[a, b, c, d, e])));
    }

    // Mixing the two: bind some arguments, saturate the rest.
    #[test]
    fn partial_then_apply_all(a in any::<i64>(), b in any::<i64>(), c in any::<i64>(), d in any::<i64>()) {
        let partial = fun4().bind_one(ready(a));
        let mixed = partial.apply_all((ready(b), ready(c), ready(d)));
        prop_assert_eq!(mixed.force_shallow(), Ok(weigh(&[a, b, c, d])));
    }
}

// ============================================================
// Product field ordering
// ============================================================

#[derive(Clone)]
struct Record(Product3<i64, String, bool>);

impl Value for Record {}

impl Constructor for Record {
    type Shape = Product3<i64, String, bool>;

    fn shape(&self) -> &Self::Shape {
        &self.0
    }
}

const ORDERS: [[usize; 3]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

proptest! {
    #[test]
    fn product_fields_in_any_forcing_order(
        a in any::<i64>(),
        b in ".{0,12}",
        c in any::<bool>(),
        order in prop::sample::select(ORDERS.to_vec()),
    ) {
        let built = {
            let (a, b) = (a, b.clone());
            LazyRef::delay_value(move || {
                Ok(Record(Product3::new(
                    LazyRef::delay_value(move || Ok(a)),
                    LazyRef::delay_value(move || Ok(b)),
                    LazyRef::ready(c),
                )))
            })
        };

        let first = field::<Record, 0>().bind_one(built.clone());
        let second = field::<Record, 1>().bind_one(built.clone());
        let third = field::<Record, 2>().bind_one(built);

        for index in order {
            match index {
                0 => {
                    prop_assert_eq!(first.force_shallow(), Ok(a));
                }
                1 => {
                    prop_assert_eq!(second.force_shallow(), Ok(b.clone()));
                }
                _ => {
                    prop_assert_eq!(third.force_shallow(), Ok(c));
                }
            }
        }
    }
}
