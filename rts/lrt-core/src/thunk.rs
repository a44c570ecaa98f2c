//! Single-threaded memoizing thunks.
//!
//! A [`Thunk`] runs its computation at most once. The first force replaces
//! the captured computation with its result (update in place), so forcing
//! any shared reference afterwards is O(1).
//!
//! A computation may return another unevaluated thunk (this is how tail
//! calls come back). Forcing walks such a chain in a loop: every cell on it
//! is marked as being forced, and the final outcome is written into all of
//! them. The stack does not grow with the length of the chain.
//!
//! Thunks are `!Send`: the minimal contract evaluates on one thread only.
//! Use [`SyncThunk`](crate::SyncThunk) for values shared across threads.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::mem;

use crate::{Eval, EvalError, Lazy, LazyRef};

/// A computation that has been taken out of its cell and not yet run.
#[doc(hidden)]
pub type Pending<T> = Box<dyn FnOnce() -> Eval<LazyRef<T>>>;

/// State of a thunk.
enum ThunkState<T> {
    /// The computation has not been started.
    Unevaluated(Pending<T>),
    /// The computation is running.
    Forcing,
    /// The computation produced a value in weak head normal form.
    Evaluated(T),
    /// The computation failed; the error is handed out on every force.
    Failed(EvalError),
}

/// A deferred computation that memoizes its result.
pub struct Thunk<T> {
    state: RefCell<ThunkState<T>>,
    release: fn(ThunkState<T>),
}

impl<T: Clone + 'static> Thunk<T> {
    /// Creates a thunk from a computation.
    ///
    /// The computation may return another lazy reference; the chain is
    /// followed until a value is reached, and only that value is stored.
    #[must_use]
    pub fn new(code: impl FnOnce() -> Eval<LazyRef<T>> + 'static) -> Self {
        Self::with_state(ThunkState::Unevaluated(Box::new(code)))
    }

    /// Creates a thunk that already holds its value.
    #[must_use]
    pub fn evaluated(value: T) -> Self {
        Self::with_state(ThunkState::Evaluated(value))
    }

    fn with_state(state: ThunkState<T>) -> Self {
        Self {
            state: RefCell::new(state),
            release: release::<ThunkState<T>>,
        }
    }
}

impl<T> Thunk<T> {
    /// Returns true if the computation failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(*self.state.borrow(), ThunkState::Failed(_))
    }

    fn is_pending(&self) -> bool {
        matches!(
            *self.state.borrow(),
            ThunkState::Unevaluated(_) | ThunkState::Forcing
        )
    }
}

impl<T: Clone> Lazy<T> for Thunk<T> {
    fn force_shallow(&self) -> Eval<T> {
        let code = match self.take_pending() {
            Ok(code) => code,
            Err(outcome) => return outcome,
        };

        let mut chain = Chain {
            head: self,
            links: Vec::new(),
            armed: true,
        };
        let outcome = chain.run(code);
        chain.settle(&outcome);
        outcome
    }

    fn is_unevaluated(&self) -> bool {
        self.is_pending()
    }

    fn take_pending(&self) -> Result<Pending<T>, Eval<T>> {
        // The computation is taken out before it runs, so no borrow is held
        // while arbitrary code (including forces of this thunk) executes.
        match self.state.replace(ThunkState::Forcing) {
            ThunkState::Unevaluated(code) => Ok(code),
            ThunkState::Evaluated(value) => {
                let out = value.clone();
                self.state.replace(ThunkState::Evaluated(value));
                Err(Ok(out))
            }
            ThunkState::Failed(err) => {
                let out = err.clone();
                self.state.replace(ThunkState::Failed(err));
                Err(Err(out))
            }
            ThunkState::Forcing => Err(Err(EvalError::BlackHole)),
        }
    }

    fn settle(&self, outcome: &Eval<T>) {
        let state = match outcome {
            Ok(value) => ThunkState::Evaluated(value.clone()),
            Err(err) => ThunkState::Failed(err.clone()),
        };
        self.state.replace(state);
    }
}

/// The cells claimed while one force walks a chain of thunks.
///
/// Dropping an armed chain (the computation panicked) poisons every claimed
/// cell instead of leaving it marked as being forced.
struct Chain<'a, T: Clone> {
    head: &'a Thunk<T>,
    links: Vec<LazyRef<T>>,
    armed: bool,
}

impl<T: Clone> Chain<'_, T> {
    fn run(&mut self, mut code: Pending<T>) -> Eval<T> {
        loop {
            let next = code()?;
            match next.take_pending() {
                Ok(pending) => {
                    self.links.push(next);
                    code = pending;
                }
                Err(outcome) => return outcome,
            }
        }
    }

    fn settle(&mut self, outcome: &Eval<T>) {
        self.armed = false;
        if let Err(err) = outcome {
            tracing::trace!(error = %err, links = self.links.len(), "thunk computation failed");
        }
        self.head.settle(outcome);
        for link in self.links.drain(..) {
            link.settle(outcome);
        }
    }
}

impl<T: Clone> Drop for Chain<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            self.settle(&Err(EvalError::user("thunk computation panicked")));
        }
    }
}

impl<T> Drop for Thunk<T> {
    fn drop(&mut self) {
        let state = mem::replace(self.state.get_mut(), ThunkState::Forcing);
        (self.release)(state);
    }
}

impl<T> fmt::Debug for Thunk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.state.borrow() {
            ThunkState::Unevaluated(_) => "unevaluated",
            ThunkState::Forcing => "forcing",
            ThunkState::Evaluated(_) => "evaluated",
            ThunkState::Failed(_) => "failed",
        };
        write!(f, "<thunk {state}>")
    }
}

// ============================================================================
// Release
// ============================================================================

thread_local! {
    static RELEASING: Cell<bool> = const { Cell::new(false) };
    static DEFERRED: RefCell<Vec<Box<dyn Any>>> = const { RefCell::new(Vec::new()) };
}

/// Drops the contents of a cell without recursing into the cells it owns.
///
/// Dropping the head of a long evaluated list would otherwise drop one cell
/// per stack frame. A release that starts while another is running is
/// queued, and the outermost release drains the queue in a loop.
pub(crate) fn release<S: 'static>(contents: S) {
    match RELEASING.try_with(|busy| busy.replace(true)) {
        Ok(false) => {
            let _reset = Draining;
            drop(contents);
            while let Some(next) = DEFERRED
                .try_with(|queue| queue.borrow_mut().pop())
                .ok()
                .flatten()
            {
                drop(next);
            }
        }
        Ok(true) => {
            // If the queue is already gone the contents are dropped in place.
            let _ = DEFERRED.try_with(move |queue| queue.borrow_mut().push(Box::new(contents)));
        }
        Err(_) => drop(contents),
    }
}

struct Draining;

impl Drop for Draining {
    fn drop(&mut self) {
        let _ = RELEASING.try_with(|busy| busy.set(false));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};
    use std::rc::Rc;

    fn counting(counter: &Rc<Cell<u32>>, value: i64) -> LazyRef<i64> {
        let counter = Rc::clone(counter);
        LazyRef::delay_value(move || {
            counter.set(counter.get() + 1);
            Ok(value)
        })
    }

    /// `go n acc = if n == 0 then acc else go (n - 1) (acc + n)`
    fn go(n: i64, acc: i64) -> LazyRef<i64> {
        LazyRef::delay(move || {
            if n == 0 {
                Ok(LazyRef::ready(acc))
            } else {
                Ok(go(n - 1, acc + n))
            }
        })
    }

    #[derive(Clone)]
    struct Node(i64, LazyRef<Node>);

    fn naturals(n: i64) -> LazyRef<Node> {
        LazyRef::delay_value(move || Ok(Node(n, naturals(n + 1))))
    }

    #[test]
    fn test_runs_once() {
        let counter = Rc::new(Cell::new(0));
        let thunk = counting(&counter, 42);
        for _ in 0..5 {
            assert_eq!(thunk.force_shallow(), Ok(42));
        }
        assert_eq!(counter.get(), 1);
    }

    #[test]
    fn test_runs_once_across_holders() {
        let counter = Rc::new(Cell::new(0));
        let thunk = counting(&counter, 7);
        let holders: Vec<_> = (0..4).map(|_| thunk.clone()).collect();
        let sum: i64 = holders.iter().map(|h| h.force_shallow().unwrap()).sum();
        assert_eq!(sum, 28);
        assert_eq!(counter.get(), 1);
    }

    #[test]
    fn test_not_forced_until_demanded() {
        let counter = Rc::new(Cell::new(0));
        let _unused = counting(&counter, 1);
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn test_chain_is_flattened() {
        let counter = Rc::new(Cell::new(0));
        let inner = counting(&counter, 3);
        let middle = {
            let inner = inner.clone();
            LazyRef::delay(move || Ok(inner))
        };
        let outer = {
            let middle = middle.clone();
            LazyRef::delay(move || Ok(middle))
        };

        assert_eq!(outer.force_shallow(), Ok(3));
        assert!(!middle.is_unevaluated());
        assert!(!inner.is_unevaluated());
        assert_eq!(middle.force_shallow(), Ok(3));
        assert_eq!(counter.get(), 1);
    }

    #[test]
    fn test_long_tail_call_chain() {
        let n = 1_000_000;
        assert_eq!(go(n, 0).force_shallow(), Ok(n * (n + 1) / 2));
    }

    #[test]
    fn test_chain_into_evaluated_cell() {
        let done = LazyRef::delay_value(|| Ok(11_i64));
        assert_eq!(done.force_shallow(), Ok(11));
        let outer = {
            let done = done.clone();
            LazyRef::delay(move || Ok(done))
        };
        assert_eq!(outer.force_shallow(), Ok(11));
    }

    #[test]
    fn test_chain_back_to_itself_is_a_black_hole() {
        let looping: LazyRef<i64> = LazyRef::fix(Ok);
        assert_eq!(looping.force_shallow(), Err(EvalError::BlackHole));
    }

    #[test]
    fn test_failure_is_memoized() {
        let attempts = Rc::new(Cell::new(0));
        let seen = Rc::clone(&attempts);
        let thunk = Thunk::<i64>::new(move || {
            seen.set(seen.get() + 1);
            Err(EvalError::user("head of empty list"))
        });

        assert_eq!(thunk.force_shallow(), Err(EvalError::user("head of empty list")));
        assert_eq!(thunk.force_shallow(), Err(EvalError::user("head of empty list")));
        assert_eq!(attempts.get(), 1);
        assert!(thunk.is_failed());
        assert!(!thunk.is_unevaluated());
    }

    #[test]
    fn test_failure_in_chain_poisons_every_link() {
        let inner = LazyRef::<i64>::delay(|| Err(EvalError::PatternMatchFailure("go")));
        let middle = {
            let inner = inner.clone();
            LazyRef::delay(move || Ok(inner))
        };
        let outer = {
            let middle = middle.clone();
            LazyRef::delay(move || Ok(middle))
        };
        assert_eq!(
            outer.force_shallow(),
            Err(EvalError::PatternMatchFailure("go"))
        );
        for link in [&middle, &inner] {
            assert_eq!(
                link.force_shallow(),
                Err(EvalError::PatternMatchFailure("go"))
            );
        }
    }

    #[test]
    fn test_self_force_is_a_black_hole() {
        let looping: LazyRef<i64> =
            LazyRef::fix(|this| this.force_shallow().map(|n| LazyRef::ready(n + 1)));
        assert_eq!(looping.force_shallow(), Err(EvalError::BlackHole));
    }

    #[test]
    fn test_panic_poisons_the_cell() {
        let thunk = Thunk::<i64>::new(|| panic!("boom"));
        let caught = panic::catch_unwind(AssertUnwindSafe(|| thunk.force_shallow()));
        assert!(caught.is_err());
        assert!(thunk.is_failed());
        assert_eq!(
            thunk.force_shallow(),
            Err(EvalError::user("thunk computation panicked"))
        );
    }

    #[test]
    fn test_rc_payload_is_shared_not_copied() {
        let r = LazyRef::delay_value(|| Ok(Rc::new(vec![0_u8; 4096])));
        let first = r.force_shallow().unwrap();
        let second = r.force_shallow().unwrap();
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_dropping_a_long_evaluated_list() {
        let head = naturals(0);
        let mut cursor = head.clone();
        for expected in 0..1_000_000 {
            let Node(n, next) = cursor.force_shallow().unwrap();
            assert_eq!(n, expected);
            cursor = next;
        }
        drop(cursor);
        drop(head);
    }

    #[test]
    fn test_release_leaves_no_queued_cells() {
        // The queue is drained and the flag cleared once a release returns.
        drop(go(10, 0));
        let r = naturals(5);
        assert_eq!(r.force_shallow().map(|Node(n, _)| n), Ok(5));
        assert!(DEFERRED.with_borrow(Vec::is_empty));
        assert!(!RELEASING.get());
    }

    #[test]
    fn test_debug_state() {
        let thunk = Thunk::new(|| Ok(LazyRef::ready(1_u8)));
        assert_eq!(format!("{thunk:?}"), "<thunk unevaluated>");
        thunk.force_shallow().unwrap();
        assert_eq!(format!("{thunk:?}"), "<thunk evaluated>");
        assert_eq!(format!("{:?}", Thunk::evaluated(2_u8)), "<thunk evaluated>");
    }
}
