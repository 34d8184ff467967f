// Shared helpers for the session integration tests
#![allow(dead_code)]

use calltrace::config::TraceConfig;
use calltrace::model::function::FunctionInfo;
use calltrace::surface::{Canvas, SharedSurface};
use calltrace::trace::TraceSession;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

pub type SharedCanvas = Rc<RefCell<Canvas>>;

/// A session drawing on an 80x24 canvas
pub fn session_with(config: TraceConfig) -> (TraceSession, SharedCanvas) {
    let canvas = Rc::new(RefCell::new(Canvas::new(80.0, 24.0)));
    let surface: SharedSurface = canvas.clone();
    (TraceSession::new("test", surface, config), canvas)
}

pub fn session() -> (TraceSession, SharedCanvas) {
    session_with(TraceConfig::default())
}

pub fn info(name: &str, source: &str) -> FunctionInfo {
    FunctionInfo::new(name, source)
}

/// Let every spawned task run until it blocks on a step, with animations
/// finished (time is paused, so this costs nothing)
pub async fn settle() {
    tokio::time::sleep(Duration::from_secs(2)).await;
}

/// Tag of the region highlighted on the canvas
pub fn highlighted(canvas: &SharedCanvas) -> Option<String> {
    canvas.borrow().highlighted_tag().map(str::to_string)
}
