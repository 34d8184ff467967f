//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into three layers:
//!
//! - **[`app`]**: application state and the keyboard event loop
//! - **[`panes`]**: stateless render functions for the canvas and the status bar
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: construct it with a
//! [`TraceSession`] and the [`Canvas`] it draws on, then await [`App::run`]
//! inside the session's `LocalSet`.
//!
//! [`TraceSession`]: crate::trace::TraceSession
//! [`Canvas`]: crate::surface::Canvas
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;
