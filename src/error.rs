//! Top-level error type for the `chronografy` binary.
//!
//! Component errors (`GeocodeError`, `FetchError`, ...) are handled where they occur. Only
//! conditions that end a run reach the caller, as an `AppError` carrying the process exit code:
//!
//! - `2`: configuration or usage
//! - `3`: the run finished without producing an animation
//! - `4`: provider, filesystem or encoding failures
//!
//! A failure the user has already been shown (through the run's `Notifier`) comes back as a
//! silent error: exit code only, nothing further to print.

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    pub fn no_output(message: impl Into<String>) -> Self {
        Self::new(3, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(4, message)
    }

    /// The run already told the user what went wrong.
    pub fn silent(exit_code: u8) -> Self {
        Self::new(exit_code, "")
    }

    pub fn is_silent(&self) -> bool {
        self.message.is_empty()
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
