//! Visual surface abstraction
//!
//! The tracing core never draws anything itself. It drives a [`Surface`]:
//! an owner of visual frames that can position, fade and scale them,
//! highlight tagged regions of their listings and show variable values and
//! value tags. [`Canvas`] is the in-memory implementation used by the
//! terminal UI and by the tests.
//!
//! # Handles
//!
//! Frames and value tags are referred to by opaque ids handed out by the
//! surface. Operations on a handle whose frame has been detached are
//! ignored, so animations still running when their frame leaves the stack
//! are harmless.

pub mod canvas;

pub use canvas::Canvas;

use crate::error::Result;
use crate::model::function::FunctionInfo;
use std::cell::RefCell;
use std::rc::Rc;

/// Identifies one visual frame on a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

/// A tagged region inside a visual frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionRef {
    pub frame: FrameHandle,
    pub index: usize,
}

/// Identifies one value tag on a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagHandle(pub u64);

/// Surface shared between the session, running animations and the UI
pub type SharedSurface = Rc<RefCell<dyn Surface>>;

/// Rendering collaborator driven by the tracing core
pub trait Surface {
    /// Width and height available for frames
    fn size(&self) -> (f64, f64);

    /// Create a detached visual frame showing the function's listing
    fn create_visual_frame(&mut self, function: &FunctionInfo, width: f64, height: f64)
        -> FrameHandle;

    /// Put a frame on screen, above every frame already attached
    fn attach(&mut self, frame: FrameHandle);

    /// Take a frame off screen and release it
    fn detach(&mut self, frame: FrameHandle);

    fn position(&self, frame: FrameHandle) -> Option<(f64, f64)>;

    fn set_position(&mut self, frame: FrameHandle, x: f64, y: f64);

    /// Translate a frame by the given displacement
    fn move_by(&mut self, frame: FrameHandle, dx: f64, dy: f64) {
        if let Some((x, y)) = self.position(frame) {
            self.set_position(frame, x + dx, y + dy);
        }
    }

    fn set_opacity(&mut self, frame: FrameHandle, opacity: f64);

    fn set_scale(&mut self, frame: FrameHandle, scale: f64);

    /// Find the unique region tagged `tag`; more than one match is an error
    fn find_tagged_region(&self, frame: FrameHandle, tag: &str) -> Result<Option<RegionRef>>;

    fn set_region_highlighted(&mut self, region: RegionRef, highlighted: bool);

    fn set_region_visible(&mut self, region: RegionRef, visible: bool);

    /// Show `text` just below the anchor region
    fn render_value_tag(&mut self, text: &str, anchor: RegionRef) -> TagHandle;

    fn remove_value_tag(&mut self, tag: TagHandle);

    /// Create or update the box of a named variable
    fn put_variable(&mut self, frame: FrameHandle, name: &str, text: &str, width: f64);

    /// Move a variable box; `y` of `None` keeps it on the bottom row
    fn place_variable(&mut self, frame: FrameHandle, name: &str, x: f64, y: Option<f64>);

    /// Create or update an array display
    fn put_array(&mut self, frame: FrameHandle, name: &str, cells: &[String], at: Option<(f64, f64)>);

    /// Remove every frame and tag
    fn clear(&mut self);
}
