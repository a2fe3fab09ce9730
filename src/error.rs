//! Core error taxonomy.

use thiserror::Error;

/// Errors returned by the `rlvm` core.
///
/// These map 1:1 onto the error kinds a hosting machine needs to triage a
/// failed instruction (abort the instruction and log) from a failure that
/// should halt the process outright; see [`RlvmError::is_fatal`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RlvmError {
    /// Malformed table of contents, bad compiler magic, or wrong declared
    /// archive size.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// Unsupported compiler version in a script header.
    #[error("unsupported compiler version: {0}")]
    InvalidCompiler(i32),

    /// Decompressed size did not match the declared original size.
    #[error("truncated decompression output: expected {expected} bytes, got {actual}")]
    TruncatedOutput {
        /// Declared `original_size`.
        expected: usize,
        /// Bytes actually produced before input was exhausted.
        actual: usize,
    },

    /// Second-level XOR required but the title key is unknown.
    #[error("unknown title key for second-level XOR")]
    UnknownKey,

    /// Memory or index access outside the defined extent.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// `begin > end` in a range operation.
    #[error("invalid range [{begin}, {end})")]
    InvalidRange {
        /// Range start.
        begin: u64,
        /// Range end.
        end: u64,
    },

    /// Value exceeds the bit width of the target cell.
    #[error("value {value} overflows {bits}-bit field")]
    Overflow {
        /// Value that was rejected.
        value: i64,
        /// Bit width of the target field.
        bits: u8,
    },

    /// Unknown expression opcode.
    #[error("invalid operator code: {0}")]
    InvalidOperator(i32),

    /// String op on an integer bank, or vice versa.
    #[error("invalid memory reference: {0}")]
    InvalidMemoryReference(String),

    /// Stack-routed memory access with no active frame.
    #[error("stack is empty")]
    StackEmpty,

    /// An injected clock moved backwards.
    #[error("clock moved backwards: {prev} -> {now}")]
    NonMonotonicClock {
        /// Previously observed timepoint, in milliseconds.
        prev: u64,
        /// Newly observed timepoint, in milliseconds.
        now: u64,
    },

    /// File lookup failed.
    #[error("not found: {0}")]
    NotFound(String),
}

impl RlvmError {
    /// Returns `true` for errors that should halt the host process rather
    /// than abort only the current instruction.
    ///
    /// Only clock regressions and unresolved decryption keys are treated as
    /// fatal: everything else is a well-formed, per-instruction failure the
    /// machine can recover from by skipping ahead (spec.md §7).
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::NonMonotonicClock { .. } | Self::UnknownKey)
    }
}

/// Convenience alias for fallible core operations.
pub type Result<T> = std::result::Result<T, RlvmError>;
