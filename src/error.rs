//! Error types for the tracing core
//!
//! [`TraceError`] covers every failure a traced program can hit. They all
//! describe mistakes in the host program (a misspelled variable, an
//! unregistered function, a code listing with a repeated tag) rather than
//! conditions worth recovering from, so they are propagated with `?` up to
//! whoever started the trace and reported there.

use thiserror::Error;

/// Errors raised by the session, the frame model and the surface
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    /// Variable, array or record lookup by an undeclared name
    #[error("no variable named {name}")]
    NameNotFound { name: String },

    /// Invocation of a function that was never registered
    #[error("no function named {name}")]
    FunctionNotFound { name: String },

    /// More than one region of a frame carries the same tag
    #[error("tag {tag} is not unique in frame {function}")]
    AmbiguousTag { tag: String, function: String },

    /// A contract operation was invoked without a concrete implementation
    #[error("no implementation for {operation}")]
    UnimplementedOperation { operation: String },

    /// A name was declared twice in the same frame
    #[error("{name} is already declared in frame {function}")]
    DuplicateName { name: String, function: String },

    /// Array access past the end
    #[error("index {index} out of bounds for array {name} of length {len}")]
    IndexOutOfBounds {
        name: String,
        index: usize,
        len: usize,
    },

    /// The name exists but holds a different kind of container
    #[error("{name} is not {expected}")]
    KindMismatch { name: String, expected: &'static str },

    /// A frame operation was requested while the call stack is empty
    #[error("no active stack frame")]
    NoActiveFrame,

    /// Arithmetic in a traced body left the range of `Value::Int`
    #[error("integer overflow in {operation}")]
    Overflow { operation: String },

    /// A pending step was discarded before it was consumed
    #[error("step at {key} was interrupted")]
    Interrupted { key: String },
}

pub type Result<T> = std::result::Result<T, TraceError>;
