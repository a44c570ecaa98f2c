//! Thread-safe thunks with blackholing.
//!
//! A [`SyncThunk`] may be forced from several threads at once. The first
//! thread to start forcing marks the thunk as being forced (the blackhole)
//! and runs the computation outside the lock. Any other thread that finds
//! the blackhole blocks on the thunk's condition variable until the result
//! is published, then reads the memo. The computation therefore still runs
//! at most once.
//!
//! ```text
//!   Unevaluated --force--> BeingForced(thread) --publish--> Evaluated(value)
//!                                 |                           or Failed(error)
//!                        other threads wait
//! ```
//!
//! A thread that forces a thunk it is itself forcing gets
//! [`EvalError::BlackHole`] instead of deadlocking. Chains of thunks are
//! walked in a loop, blackholing each link, as for [`Thunk`](crate::Thunk).

use std::fmt;
use std::mem;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex};

use crate::thunk::release;
use crate::{Eval, EvalError, Lazy, Normalize};

type Code<T> = Box<dyn FnOnce() -> Eval<SharedRef<T>> + Send>;

enum SyncState<T> {
    Unevaluated(Code<T>),
    BeingForced(ThreadId),
    Evaluated(T),
    Failed(EvalError),
}

/// A memoizing thunk that can be shared between threads.
pub struct SyncThunk<T> {
    state: Mutex<SyncState<T>>,
    published: Condvar,
    release: fn(SyncState<T>),
}

impl<T: Clone + Send + Sync + 'static> SyncThunk<T> {
    /// Creates a thunk from a computation.
    #[must_use]
    pub fn new(code: impl FnOnce() -> Eval<SharedRef<T>> + Send + 'static) -> Self {
        Self::with_state(SyncState::Unevaluated(Box::new(code)))
    }

    /// Creates a thunk that already holds its value.
    #[must_use]
    pub fn evaluated(value: T) -> Self {
        Self::with_state(SyncState::Evaluated(value))
    }

    fn with_state(state: SyncState<T>) -> Self {
        Self {
            state: Mutex::new(state),
            published: Condvar::new(),
            release: release::<SyncState<T>>,
        }
    }

    /// Takes the computation, or returns the outcome if there is nothing
    /// left to run. Blocks while another thread holds the blackhole.
    fn claim(&self) -> Result<Code<T>, Eval<T>> {
        let me = thread::current().id();
        let mut state = self.state.lock();
        loop {
            match mem::replace(&mut *state, SyncState::BeingForced(me)) {
                SyncState::Unevaluated(code) => return Ok(code),
                SyncState::Evaluated(value) => {
                    let out = value.clone();
                    *state = SyncState::Evaluated(value);
                    return Err(Ok(out));
                }
                SyncState::Failed(err) => {
                    let out = err.clone();
                    *state = SyncState::Failed(err);
                    return Err(Err(out));
                }
                SyncState::BeingForced(owner) => {
                    *state = SyncState::BeingForced(owner);
                    if owner == me {
                        return Err(Err(EvalError::BlackHole));
                    }
                    tracing::trace!(?owner, "waiting on blackholed thunk");
                    self.published.wait(&mut state);
                }
            }
        }
    }

    fn publish(&self, outcome: &Eval<T>) {
        let mut state = self.state.lock();
        *state = match outcome {
            Ok(value) => SyncState::Evaluated(value.clone()),
            Err(err) => SyncState::Failed(err.clone()),
        };
        drop(state);
        self.published.notify_all();
    }
}

impl<T> SyncThunk<T> {
    fn is_pending(&self) -> bool {
        matches!(
            *self.state.lock(),
            SyncState::Unevaluated(_) | SyncState::BeingForced(_)
        )
    }
}

/// The thunks blackholed by one force.
///
/// If the computation unwinds, dropping the armed chain publishes a failure
/// to every claimed thunk so that waiters wake up.
struct Chain<'a, T: Clone + Send + Sync + 'static> {
    head: &'a SyncThunk<T>,
    links: Vec<SharedRef<T>>,
    armed: bool,
}

impl<T: Clone + Send + Sync + 'static> Chain<'_, T> {
    fn run(&mut self, mut code: Code<T>) -> Eval<T> {
        loop {
            let next = code()?;
            match next.0.claim() {
                Ok(pending) => {
                    self.links.push(next);
                    code = pending;
                }
                Err(outcome) => return outcome,
            }
        }
    }

    fn publish(&mut self, outcome: &Eval<T>) {
        self.armed = false;
        if let Err(err) = outcome {
            tracing::trace!(error = %err, links = self.links.len(), "thunk computation failed");
        }
        self.head.publish(outcome);
        for link in self.links.drain(..) {
            link.0.publish(outcome);
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Drop for Chain<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            self.publish(&Err(EvalError::user("thunk computation panicked")));
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Lazy<T> for SyncThunk<T> {
    fn force_shallow(&self) -> Eval<T> {
        let code = match self.claim() {
            Ok(code) => code,
            Err(outcome) => return outcome,
        };

        let mut chain = Chain {
            head: self,
            links: Vec::new(),
            armed: true,
        };
        let outcome = chain.run(code);
        chain.publish(&outcome);
        outcome
    }

    fn is_unevaluated(&self) -> bool {
        self.is_pending()
    }
}

impl<T> Drop for SyncThunk<T> {
    fn drop(&mut self) {
        let state = mem::replace(self.state.get_mut(), SyncState::Failed(EvalError::BlackHole));
        (self.release)(state);
    }
}

impl<T> fmt::Debug for SyncThunk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.state.lock() {
            SyncState::Unevaluated(_) => "unevaluated",
            SyncState::BeingForced(_) => "being forced",
            SyncState::Evaluated(_) => "evaluated",
            SyncState::Failed(_) => "failed",
        };
        write!(f, "<sync thunk {state}>")
    }
}

/// A shared handle to a lazy value that may cross threads.
pub struct SharedRef<T>(Arc<SyncThunk<T>>);

impl<T> Clone for SharedRef<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: Clone + Send + Sync + 'static> SharedRef<T> {
    /// Wraps an already evaluated value.
    #[must_use]
    pub fn ready(value: T) -> Self {
        Self(Arc::new(SyncThunk::evaluated(value)))
    }

    /// Defers a computation behind a blackholing thunk.
    #[must_use]
    pub fn delay(code: impl FnOnce() -> Eval<SharedRef<T>> + Send + 'static) -> Self {
        Self(Arc::new(SyncThunk::new(code)))
    }

    /// Defers a computation that produces its value directly.
    #[must_use]
    pub fn delay_value(code: impl FnOnce() -> Eval<T> + Send + 'static) -> Self {
        Self::delay(move || code().map(Self::ready))
    }
}

impl<T> SharedRef<T> {
    /// Returns true if both handles refer to the same cell.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: Clone + Send + Sync + 'static> Lazy<T> for SharedRef<T> {
    #[inline]
    fn force_shallow(&self) -> Eval<T> {
        self.0.force_shallow()
    }

    #[inline]
    fn is_unevaluated(&self) -> bool {
        self.0.is_pending()
    }
}

impl<T: Normalize + Clone + Send + Sync + 'static> Normalize for SharedRef<T> {
    fn normalize(&self) -> Eval<()> {
        self.force_shallow()?.normalize()
    }
}

impl<T> fmt::Debug for SharedRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_pending() {
            write!(f, "<thunk>")
        } else {
            write!(f, "<evaluated>")
        }
    }
}
