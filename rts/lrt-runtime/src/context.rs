//! The process-lifetime runtime context.

use std::io::Read;

use crate::{ExitCodeRegistry, InputHandle, OutputHandle, RuntimeConfig, RuntimeFailure, RuntimeResult};

/// Everything a running program may touch outside the object graph.
///
/// One context is created at startup and passed by `&mut` to every action,
/// so there is no global state.
#[derive(Debug)]
pub struct RuntimeContext {
    /// The configuration the context was built from.
    pub config: RuntimeConfig,
    /// Standard output.
    pub stdout: OutputHandle,
    /// Standard error.
    pub stderr: OutputHandle,
    /// Standard input.
    pub stdin: InputHandle,
    /// Exit code requested by the program.
    pub exit_code: ExitCodeRegistry,
}

impl RuntimeContext {
    /// Creates a context with the standard handles.
    ///
    /// With [`RuntimeConfig::captured`] output goes to memory and input is
    /// empty.
    #[must_use]
    pub fn new(config: RuntimeConfig) -> Self {
        let stdin = if config.capture_output {
            InputHandle::empty()
        } else {
            InputHandle::stdin()
        };
        Self::with_input(config, stdin)
    }

    /// Creates a context reading its input from `input`.
    #[must_use]
    pub fn with_reader(config: RuntimeConfig, input: impl Read + 'static) -> Self {
        Self::with_input(config, InputHandle::new(Box::new(input)))
    }

    fn with_input(config: RuntimeConfig, stdin: InputHandle) -> Self {
        Self {
            stdout: OutputHandle::stdout(&config),
            stderr: OutputHandle::stderr(&config),
            stdin,
            exit_code: ExitCodeRegistry::new(),
            config,
        }
    }

    /// Flushes standard error, then standard output.
    ///
    /// Both handles are flushed even if the first fails; the first error is
    /// reported.
    pub fn flush_all(&mut self) -> RuntimeResult<()> {
        let stderr = self.stderr.flush().map_err(|source| RuntimeFailure::Flush {
            handle: self.stderr.name(),
            source,
        });
        let stdout = self.stdout.flush().map_err(|source| RuntimeFailure::Flush {
            handle: self.stdout.name(),
            source,
        });
        stderr.and(stdout)
    }

    /// Flushes output and returns the process exit code.
    ///
    /// An explicit program status wins over the registry's code.
    pub fn shutdown(&mut self, status: Option<i32>) -> RuntimeResult<i32> {
        self.flush_all()?;
        let code = status.unwrap_or_else(|| self.exit_code.code());
        tracing::debug!(code, "runtime shut down");
        Ok(code)
    }
}
