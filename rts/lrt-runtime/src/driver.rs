//! Running a program.

use std::fmt;
use std::rc::Rc;

use lrt_core::{Dynamic, Eval, Lazy, LazyRef, Normalize, Value};
use tracing::{debug, instrument, warn};

use crate::{RuntimeContext, RuntimeResult};

/// A side-effecting program action.
///
/// Running an action may read and write the context's handles and request
/// an exit code. The result it returns may still be lazy.
pub struct Action<T>(Rc<dyn Fn(&mut RuntimeContext) -> Eval<LazyRef<T>>>);

impl<T> Clone for Action<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: Clone + 'static> Action<T> {
    /// Creates an action from its effect.
    #[must_use]
    pub fn new(run: impl Fn(&mut RuntimeContext) -> Eval<LazyRef<T>> + 'static) -> Self {
        Self(Rc::new(run))
    }

    /// An action with no effect.
    #[must_use]
    pub fn pure(value: LazyRef<T>) -> Self {
        Self::new(move |_: &mut RuntimeContext| Ok(value.clone()))
    }

    /// Performs the action.
    pub fn run(&self, ctx: &mut RuntimeContext) -> Eval<LazyRef<T>> {
        (self.0)(ctx)
    }

    /// Sequences `next` after this action, passing it this action's result.
    #[must_use]
    pub fn and_then<U: Clone + 'static>(
        self,
        next: impl Fn(LazyRef<T>) -> Eval<Action<U>> + 'static,
    ) -> Action<U> {
        Action::new(move |ctx: &mut RuntimeContext| {
            let result = self.run(ctx)?;
            next(result)?.run(ctx)
        })
    }
}

impl<T> Value for Action<T> {}

impl<T> Normalize for Action<T> {
    fn normalize(&self) -> Eval<()> {
        Ok(())
    }
}

impl<T> fmt::Debug for Action<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<action>")
    }
}

/// Results a program can end with.
///
/// Integers become the exit status and booleans map `true`/`false` to 0/1.
/// Every other result yields no explicit status.
pub trait ExitStatus {
    /// The status this result requests, if any.
    fn exit_status(&self) -> Option<i32> {
        None
    }
}

impl ExitStatus for i32 {
    fn exit_status(&self) -> Option<i32> {
        Some(*self)
    }
}

impl ExitStatus for bool {
    fn exit_status(&self) -> Option<i32> {
        Some(if *self { 0 } else { 1 })
    }
}

impl ExitStatus for () {}
impl ExitStatus for String {}
impl<T> ExitStatus for Vec<T> {}
impl<T> ExitStatus for Option<T> {}

impl ExitStatus for Dynamic {
    fn exit_status(&self) -> Option<i32> {
        match self {
            Self::Int(n) => n.exit_status(),
            Self::Bool(b) => b.exit_status(),
            Self::Data(_) | Self::Opaque(_) => None,
        }
    }
}

/// Runs the program whose entry action is `main`.
///
/// The entry is forced, the action it yields is performed, and its result
/// is fully forced. Standard error and standard output are flushed on every
/// path, and a failure escaping the program is returned after flushing.
///
/// Returns the exit status the result requests, if any.
#[instrument(skip_all)]
pub fn run_program<T>(ctx: &mut RuntimeContext, main: &LazyRef<Action<T>>) -> RuntimeResult<Option<i32>>
where
    T: ExitStatus + Normalize + Clone + 'static,
{
    let outcome = execute(ctx, main);
    let flushed = ctx.flush_all();

    match outcome {
        Ok(status) => {
            flushed?;
            Ok(status)
        }
        Err(err) => {
            warn!(error = %err, "program failed");
            if let Err(flush_err) = flushed {
                warn!(error = %flush_err, "output lost after failure");
            }
            Err(err.into())
        }
    }
}

fn execute<T>(ctx: &mut RuntimeContext, main: &LazyRef<Action<T>>) -> Eval<Option<i32>>
where
    T: ExitStatus + Normalize + Clone + 'static,
{
    debug!("forcing entry action");
    let action = main.force_shallow()?;

    debug!("performing entry action");
    let result = action.run(ctx)?;

    let value = result.force_deep()?;
    let status = value.exit_status();
    debug!(?status, "program finished");
    Ok(status)
}
