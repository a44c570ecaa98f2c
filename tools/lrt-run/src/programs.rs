//! Demonstration programs built directly on the object model.
//!
//! Each program is what a compiler would emit for a small source program:
//! lazy lists as a sum type over products, curried helpers, and an entry
//! action for the driver.

use lrt_core::{
    field, Apply, Constructor, Eval, EvalError, Fun, Lazy, LazyRef, Normalize, Product2, Tag,
    Value,
};
use lrt_runtime::{quote_string, Action, RuntimeContext};

// ============================================================================
// Lazy lists
// ============================================================================

/// A lazy list: `data List a = Nil | Cons a (List a)`.
#[derive(Clone)]
pub enum List<T> {
    /// The empty list.
    Nil,
    /// A head and a tail.
    Cons(Product2<T, List<T>>),
}

impl<T> Value for List<T> {
    fn constructor_tag(&self) -> Tag {
        match self {
            Self::Nil => 0,
            Self::Cons(_) => 1,
        }
    }
}

impl<T: Normalize> Normalize for List<T> {
    fn normalize(&self) -> Eval<()> {
        let mut node = match self {
            Self::Nil => return Ok(()),
            Self::Cons(cell) => cell.clone(),
        };
        loop {
            node.m1().normalize()?;
            match node.m2().force_shallow()? {
                Self::Nil => return Ok(()),
                Self::Cons(next) => node = next,
            }
        }
    }
}

fn cons<T>(head: LazyRef<T>, tail: LazyRef<List<T>>) -> List<T> {
    List::Cons(Product2::new(head, tail))
}

fn nil<T: Clone + 'static>() -> LazyRef<List<T>> {
    LazyRef::ready(List::Nil)
}

/// `from n = n : from (n + 1)`
fn from(n: i64) -> LazyRef<List<i64>> {
    LazyRef::delay_value(move || Ok(cons(LazyRef::ready(n), from(n + 1))))
}

fn tail<T: Clone + 'static>(xs: &LazyRef<List<T>>) -> LazyRef<List<T>> {
    let xs = xs.clone();
    LazyRef::delay(move || match xs.force_shallow()? {
        List::Cons(cell) => Ok(cell.m2().clone()),
        List::Nil => Err(EvalError::PatternMatchFailure("tail")),
    })
}

fn filter<T: Clone + 'static>(keep: Fun<(T,), bool>, xs: LazyRef<List<T>>) -> LazyRef<List<T>> {
    LazyRef::delay(move || {
        let mut xs = xs;
        loop {
            let List::Cons(cell) = xs.force_shallow()? else {
                return Ok(nil());
            };
            if keep.bind_one(cell.m1().clone()).force_shallow()? {
                let rest = filter(keep.clone(), cell.m2().clone());
                return Ok(LazyRef::ready(cons(cell.m1().clone(), rest)));
            }
            xs = cell.m2().clone();
        }
    })
}

fn zip_with<A, B, C>(
    f: Fun<(A, B), C>,
    xs: LazyRef<List<A>>,
    ys: LazyRef<List<B>>,
) -> LazyRef<List<C>>
where
    A: Clone + 'static,
    B: Clone + 'static,
    C: Clone + 'static,
{
    LazyRef::delay(move || match (xs.force_shallow()?, ys.force_shallow()?) {
        (List::Cons(x), List::Cons(y)) => {
            let head = f.apply_all((x.m1().clone(), y.m1().clone()));
            let rest = zip_with(f, x.m2().clone(), y.m2().clone());
            Ok(LazyRef::ready(cons(head, rest)))
        }
        _ => Ok(nil()),
    })
}

/// Forces at most `n` elements from the front of a list.
fn take<T: Clone + 'static>(n: usize, xs: &LazyRef<List<T>>) -> Eval<Vec<T>> {
    let mut out = Vec::new();
    let mut xs = xs.clone();
    while out.len() < n {
        match xs.force_shallow()? {
            List::Nil => break,
            List::Cons(cell) => {
                out.push(cell.m1().force_shallow()?);
                xs = cell.m2().clone();
            }
        }
    }
    Ok(out)
}

// ============================================================================
// Arithmetic helpers
// ============================================================================

fn plus((y, x): (LazyRef<i64>, LazyRef<i64>)) -> Eval<LazyRef<i64>> {
    x.force_shallow()?
        .checked_add(y.force_shallow()?)
        .map(LazyRef::ready)
        .ok_or_else(|| EvalError::user("arithmetic overflow"))
}

/// `indivisible p n = mod n p /= 0`
fn indivisible((n, p): (LazyRef<i64>, LazyRef<i64>)) -> Eval<LazyRef<bool>> {
    Ok(LazyRef::ready(n.force_shallow()? % p.force_shallow()? != 0))
}

const PLUS: Fun<(i64, i64), i64> = Fun::from_fn(plus);
const INDIVISIBLE: Fun<(i64, i64), bool> = Fun::from_fn(indivisible);

/// `sieve (p : xs) = p : sieve (filter (indivisible p) xs)`
fn sieve(xs: LazyRef<List<i64>>) -> LazyRef<List<i64>> {
    LazyRef::delay(move || match xs.force_shallow()? {
        List::Nil => Ok(nil()),
        List::Cons(cell) => {
            let keep = INDIVISIBLE.bind_one(cell.m1().clone());
            let rest = sieve(filter(keep, cell.m2().clone()));
            Ok(LazyRef::ready(cons(cell.m1().clone(), rest)))
        }
    })
}

/// `fibs = 0 : 1 : zipWith (+) fibs (tail fibs)`
fn fibs() -> LazyRef<List<i64>> {
    LazyRef::fix(|fibs| {
        let rest = zip_with(PLUS, fibs.clone(), tail(&fibs));
        let second = LazyRef::ready(cons(LazyRef::ready(1), rest));
        Ok(LazyRef::ready(cons(LazyRef::ready(0), second)))
    })
}

/// `ones = 1 : ones`
fn ones() -> LazyRef<List<i64>> {
    LazyRef::fix(|ones| Ok(LazyRef::ready(cons(LazyRef::ready(1), ones))))
}

/// `data Numbered = Numbered Int Int`
#[derive(Clone)]
struct Numbered(Product2<i64, i64>);

impl Value for Numbered {}

impl Constructor for Numbered {
    type Shape = Product2<i64, i64>;

    fn shape(&self) -> &Self::Shape {
        &self.0
    }
}

fn numbered((value, index): (LazyRef<i64>, LazyRef<i64>)) -> Eval<LazyRef<Numbered>> {
    Ok(LazyRef::ready(Numbered(Product2::new(index, value))))
}

const NUMBERED: Fun<(i64, i64), Numbered> = Fun::from_fn(numbered);

// ============================================================================
// Programs
// ============================================================================

/// `main = pure code`
pub fn exit_with(code: i32) -> LazyRef<Action<i32>> {
    LazyRef::ready(Action::pure(LazyRef::ready(code)))
}

/// `main = pure value`
pub fn boolean(value: bool) -> LazyRef<Action<bool>> {
    LazyRef::ready(Action::pure(LazyRef::ready(value)))
}

/// Requests each code in turn and returns no status of its own.
pub fn request(codes: Vec<i32>) -> LazyRef<Action<()>> {
    LazyRef::ready(Action::new(move |ctx: &mut RuntimeContext| {
        for &code in &codes {
            ctx.exit_code.request(code);
        }
        Ok(LazyRef::ready(()))
    }))
}

/// Prints the first `count` primes, numbered from 1.
pub fn primes(count: usize) -> LazyRef<Action<()>> {
    LazyRef::delay_value(move || {
        Ok(Action::new(move |ctx: &mut RuntimeContext| {
            let primes = sieve(from(2));
            let entries = zip_with(NUMBERED, from(1), primes);
            let index = field::<Numbered, 0>();
            let prime = field::<Numbered, 1>();
            for entry in take(count, &entries)? {
                let entry = LazyRef::ready(entry);
                let i = index.bind_one(entry.clone()).force_shallow()?;
                let p = prime.bind_one(entry).force_shallow()?;
                ctx.stdout.write_line(&format!("{i}: {p}"))?;
            }
            Ok(LazyRef::ready(()))
        }))
    })
}

/// Prints the `n`th Fibonacci number.
pub fn fib(n: usize) -> LazyRef<Action<()>> {
    LazyRef::ready(Action::new(move |ctx: &mut RuntimeContext| {
        let len = n
            .checked_add(1)
            .ok_or_else(|| EvalError::user("fib: index out of range"))?;
        let prefix = take(len, &fibs())?;
        let value = prefix
            .last()
            .copied()
            .ok_or(EvalError::PatternMatchFailure("fib"))?;
        ctx.stdout.write_line(&format!("fib {n} = {value}"))?;
        Ok(LazyRef::ready(()))
    }))
}

/// Prints `count` elements of an infinite circular list.
pub fn ones_list(count: usize) -> LazyRef<Action<()>> {
    LazyRef::ready(Action::new(move |ctx: &mut RuntimeContext| {
        let shown: Vec<String> = take(count, &ones())?
            .iter()
            .map(ToString::to_string)
            .collect();
        ctx.stdout.write_line(&format!("[{}]", shown.join(",")))?;
        Ok(LazyRef::ready(()))
    }))
}

/// Echoes standard input, one quoted line per input line.
pub fn echo() -> LazyRef<Action<()>> {
    LazyRef::ready(Action::new(|ctx: &mut RuntimeContext| {
        while let Some(line) = ctx.stdin.read_line()? {
            ctx.stdout.write_line(&quote_string(&line))?;
        }
        Ok(LazyRef::ready(()))
    }))
}

/// `main = pure x where x = x + 1`
pub fn diverge() -> LazyRef<Action<i32>> {
    let x: LazyRef<i32> = LazyRef::fix(|x| {
        let n = x.force_shallow()?;
        Ok(LazyRef::ready(n + 1))
    });
    LazyRef::ready(Action::pure(x))
}
