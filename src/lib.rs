//! # Introduction
//!
//! calltrace turns traced programs into step-through call-stack
//! visualizations. A traced function body runs as ordinary async Rust and
//! asks the session for a step at every point worth showing; each request
//! highlights a region of the function's listing and waits until the user
//! steps. Frames fly in when a call starts and fade out when it returns.
//!
//! ## Execution model
//!
//! ```text
//! traced body → request_step → continuation queue → step_in / step_over / run
//!      ↓                                                     ↓
//!   call(name) → frame push → Surface ← animations      body resumes
//! ```
//!
//! 1. [`trace`]: the [`trace::TraceSession`] coordinator, the step
//!    scheduler and the [`trace::TracedFunction`] contract.
//! 2. [`model`]: values, listings, variables, frames and the call stack.
//! 3. [`surface`]: the rendering collaborator trait and the in-memory
//!    [`surface::Canvas`].
//! 4. [`animation`]: fixed-step move, fly-in, fade and zoom animations.
//! 5. [`programs`]: built-in traced demos.
//! 6. [`ui`]: ratatui-based TUI; not part of the stable library API.
//!
//! Everything runs on a single thread: sessions, traced bodies and
//! animations must be driven from inside a tokio `LocalSet`.

pub mod animation;
pub mod config;
pub mod error;
pub mod model;
pub mod programs;
pub mod surface;
pub mod trace;
pub mod ui;

pub use config::TraceConfig;
pub use error::{Result, TraceError};
pub use model::value::Value;
pub use trace::{Control, TraceSession};
