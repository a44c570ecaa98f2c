//! Program driver for the lazy runtime.
//!
//! This crate runs programs built on [`lrt_core`]: it owns the process
//! context (standard handles and the exit-code registry), forces the entry
//! action and derives the exit status, and provides the small utilities
//! compiled code calls into.
//!
//! # Overview
//!
//! ```text
//! +--------------------------------------------------------------+
//! |                        RuntimeContext                        |
//! |  +-----------+  +-----------+  +-----------+  +-----------+  |
//! |  |  stdout   |  |  stderr   |  |   stdin   |  | exit code |  |
//! |  +-----------+  +-----------+  +-----------+  +-----------+  |
//! +--------------------------------------------------------------+
//!          ^                                 |
//!          | &mut                            | shutdown(status)
//! +--------------------+                     v
//! | run_program(main)  |---------> Option<i32> exit status
//! +--------------------+
//! ```
//!
//! # Example
//!
//! ```
//! use lrt_core::LazyRef;
//! use lrt_runtime::{run_program, Action, RuntimeConfig, RuntimeContext};
//!
//! let main = Action::new(|ctx: &mut RuntimeContext| {
//!     ctx.stdout.write_line("hello")?;
//!     Ok(LazyRef::ready(3_i32))
//! });
//!
//! let mut ctx = RuntimeContext::new(RuntimeConfig::captured());
//! let status = run_program(&mut ctx, &LazyRef::ready(main)).unwrap();
//! assert_eq!(status, Some(3));
//! assert_eq!(ctx.stdout.captured().as_deref(), Some("hello\n"));
//! ```

#![warn(missing_docs)]

mod config;
mod context;
mod driver;
mod duplicate;
mod error;
mod exit;
mod handles;
mod quote;
mod tag;

pub use config::RuntimeConfig;
pub use context::RuntimeContext;
pub use driver::{run_program, Action, ExitStatus};
pub use duplicate::duplicate;
pub use error::{ConfigError, DuplicationError, DuplicationStage, RuntimeFailure, RuntimeResult};
pub use exit::ExitCodeRegistry;
pub use handles::{CaptureBuffer, InputHandle, OutputHandle};
pub use quote::{quote_char, quote_string};
pub use tag::{constructor_tag, constructor_tag_of};
