//! Error types for the tapevm compiler and virtual machine

use thiserror::Error;

/// Tapevm errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Assembly errors
    /// Close-loop symbol with no open loop before it
    ///
    /// **Triggered by:** a `]` that does not close any `[`
    /// **Example:** `+]`
    #[error("Unmatched `]` at byte {position}: no loop is open")]
    UnmatchedClose {
        /// Byte offset of the `]` in the source
        position: usize,
    },

    /// Open-loop symbol that is never closed
    ///
    /// **Triggered by:** a `[` still open at end of input
    /// **Example:** `[->+<`
    #[error("Unmatched `[` at byte {position}: loop is never closed")]
    UnmatchedOpen {
        /// Byte offset of the `[` in the source
        position: usize,
    },

    // Runtime errors
    /// Tape access outside the fixed tape bound
    ///
    /// **Triggered by:** reading or writing a cell after the pointer moved past either edge
    /// **Example:** `<+` with the pointer starting at cell 0
    /// **Prevention:** raise `tape_size` or `start_pointer` in the VM config
    #[error("Tape access out of bounds: cell {pointer} on a tape of {tape_size} cells")]
    OutOfBounds {
        /// Absolute cell index that was accessed
        pointer: i64,
        /// Number of cells on the tape
        tape_size: usize,
    },

    /// Execution step budget exhausted
    #[error("Execution limit exceeded (max: {limit} steps)")]
    ExecutionLimitExceeded {
        /// Maximum allowed steps
        limit: u64,
    },

    /// Raw and optimized runs disagree during lockstep validation
    #[error("Optimized run diverged at checkpoint {checkpoint} (pc {pc}): {reason}")]
    Diverged {
        /// Number of checkpoints passed before the mismatch
        checkpoint: u64,
        /// Program counter of the raw run when the mismatch was found
        pc: usize,
        /// What differed
        reason: String,
    },

    // Environment errors
    /// Invalid VM configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O failure while reading input or writing output
    #[error("I/O error: {0}")]
    Io(String),
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Fatal error that cannot be recovered from
    Fatal,
    /// Recoverable error that may be retried
    Recoverable,
    /// Warning that doesn't prevent execution
    Warning,
}

impl Error {
    /// Create a configuration error with a message
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Classify error severity
    pub fn classify(&self) -> ErrorSeverity {
        match self {
            Error::UnmatchedClose { .. } => ErrorSeverity::Fatal,
            Error::UnmatchedOpen { .. } => ErrorSeverity::Fatal,
            Error::OutOfBounds { .. } => ErrorSeverity::Fatal,
            Error::Diverged { .. } => ErrorSeverity::Fatal,

            Error::ExecutionLimitExceeded { .. } => ErrorSeverity::Recoverable,
            Error::Io(_) => ErrorSeverity::Recoverable,
            Error::Config(_) => ErrorSeverity::Recoverable,
        }
    }

    /// True for errors raised before any instruction executes
    pub fn is_assembly_error(&self) -> bool {
        matches!(
            self,
            Error::UnmatchedClose { .. } | Error::UnmatchedOpen { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// Result type for tapevm operations
pub type Result<T> = std::result::Result<T, Error>;
