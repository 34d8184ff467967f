//! Session configuration
//!
//! Geometry is expressed in canvas cells: the terminal UI maps one unit to
//! one character cell, and tests treat the values as plain numbers.

use std::time::Duration;

/// Default height of a stack frame
pub const DEFAULT_FRAME_HEIGHT: f64 = 12.0;

/// Default horizontal offset between nested frames
pub const DEFAULT_FRAME_DX: f64 = 4.0;

/// Default vertical offset between nested frames
pub const DEFAULT_FRAME_DY: f64 = 2.0;

/// Gap between the surface edge and the outermost frame
pub const MARGIN: f64 = 1.0;

/// Width of the border drawn around each frame
pub const BORDER_WIDTH: f64 = 1.0;

/// Delay between automatic steps in run mode
pub const DEFAULT_RUN_DELAY: Duration = Duration::from_millis(100);

/// Tunable parameters of a [`TraceSession`](crate::trace::TraceSession)
#[derive(Debug, Clone, PartialEq)]
pub struct TraceConfig {
    /// Fixed frame width; `None` derives it from the surface width and `max_depth`
    pub frame_width: Option<f64>,
    pub frame_height: f64,
    pub frame_dx: f64,
    pub frame_dy: f64,
    /// Deepest call nesting the demo expects, used for the derived width
    pub max_depth: usize,
    pub run_delay: Duration,
    /// Leave the outermost frame on screen after it returns
    pub keep_last_frame: bool,
    /// Whether steps highlight and frames animate
    pub tracing: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        TraceConfig {
            frame_width: None,
            frame_height: DEFAULT_FRAME_HEIGHT,
            frame_dx: DEFAULT_FRAME_DX,
            frame_dy: DEFAULT_FRAME_DY,
            max_depth: 1,
            run_delay: DEFAULT_RUN_DELAY,
            keep_last_frame: false,
            tracing: true,
        }
    }
}

impl TraceConfig {
    pub fn with_frame_width(mut self, width: f64) -> Self {
        self.frame_width = Some(width);
        self
    }

    pub fn with_frame_height(mut self, height: f64) -> Self {
        self.frame_height = height;
        self
    }

    pub fn with_frame_deltas(mut self, dx: f64, dy: f64) -> Self {
        self.frame_dx = dx;
        self.frame_dy = dy;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_run_delay(mut self, delay: Duration) -> Self {
        self.run_delay = delay;
        self
    }

    pub fn with_keep_last_frame(mut self, keep: bool) -> Self {
        self.keep_last_frame = keep;
        self
    }

    pub fn with_tracing(mut self, tracing: bool) -> Self {
        self.tracing = tracing;
        self
    }

    /// Frame width to use on a surface of the given width
    pub fn resolve_frame_width(&self, surface_width: f64) -> f64 {
        match self.frame_width {
            Some(width) => width,
            None => {
                let total = surface_width - 2.0 * MARGIN - 2.0 * BORDER_WIDTH;
                total - self.max_depth as f64 * self.frame_dx
            }
        }
    }

    /// Top-left corner of a frame pushed at `level` (0 = outermost)
    pub fn frame_origin(&self, level: usize) -> (f64, f64) {
        (
            MARGIN + level as f64 * self.frame_dx,
            MARGIN + level as f64 * self.frame_dy,
        )
    }
}
