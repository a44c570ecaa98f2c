//! Exit-code bookkeeping.

/// Records the exit code requested by the program.
///
/// The registry starts at 0 and only ever grows: a request is accepted if
/// it is higher than the current code and below 256. It is read once, at
/// shutdown.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExitCodeRegistry {
    code: i32,
}

impl ExitCodeRegistry {
    /// Creates a registry holding 0.
    #[must_use]
    pub const fn new() -> Self {
        Self { code: 0 }
    }

    /// Requests `code` as the process exit code.
    pub fn request(&mut self, code: i32) {
        if code > self.code && code < 256 {
            self.code = code;
        }
    }

    /// Returns the highest accepted request, or 0.
    #[must_use]
    pub const fn code(&self) -> i32 {
        self.code
    }
}
