//! The tracing core
//!
//! - [`session`]: the [`TraceSession`] coordinator, frame management and the
//!   call protocol
//! - [`scheduler`]: step requests, the continuation queue and the step
//!   controls
//! - [`function`]: the [`TracedFunction`] contract and the function registry

pub mod function;
pub mod scheduler;
pub mod session;

pub use function::{FunctionTable, ScriptedFunction, TracedFunction};
pub use scheduler::{Control, StepFuture};
pub use session::TraceSession;
