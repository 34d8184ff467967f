//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`canvas`]: the stack of frames, drawn from the in-memory canvas
//! - [`status`]: status bar with keybindings and session state
//!
//! Each pane module exports a primary `render_*` function that reads its
//! input and never mutates session state.

pub mod canvas;
pub mod status;

pub use canvas::{canvas_area, render_canvas_pane};
pub use status::{render_status_bar, StatusRenderData};
