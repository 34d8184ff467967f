//! In-memory surface
//!
//! [`Canvas`] keeps the complete visual state of a trace: every live frame
//! with its geometry, opacity, scale, region states, variable boxes, arrays
//! and value tags. The terminal UI reads it each tick; tests assert on it.

use super::{FrameHandle, RegionRef, Surface, TagHandle};
use crate::error::{Result, TraceError};
use crate::model::function::FunctionInfo;
use crate::model::listing::Listing;
use rustc_hash::FxHashMap;
use std::rc::Rc;
use tracing::trace;

/// Display state of one tagged region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionState {
    pub highlighted: bool,
    pub visible: bool,
}

impl Default for RegionState {
    fn default() -> Self {
        RegionState {
            highlighted: false,
            visible: true,
        }
    }
}

/// A variable box
#[derive(Debug, Clone, PartialEq)]
pub struct VariableView {
    pub name: String,
    pub text: String,
    pub width: f64,
    /// Offset inside the frame; `None` until the frame lays out its variables
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// An array drawn as a row of cells
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayView {
    pub name: String,
    pub cells: Vec<String>,
    pub at: Option<(f64, f64)>,
}

/// Text annotation placed under a region
#[derive(Debug, Clone, PartialEq)]
pub struct ValueTag {
    pub handle: TagHandle,
    pub text: String,
    pub line: usize,
    pub column: usize,
    pub width: usize,
}

/// Everything known about one frame
#[derive(Debug, Clone)]
pub struct VisualFrame {
    pub handle: FrameHandle,
    pub title: String,
    pub listing: Rc<Listing>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub opacity: f64,
    pub scale: f64,
    pub regions: Vec<RegionState>,
    pub variables: Vec<VariableView>,
    pub arrays: Vec<ArrayView>,
    pub tags: Vec<ValueTag>,
}

impl VisualFrame {
    /// Index of the highlighted region, if any
    pub fn highlighted_region(&self) -> Option<usize> {
        self.regions.iter().position(|r| r.highlighted)
    }

    pub fn variable(&self, name: &str) -> Option<&VariableView> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn array(&self, name: &str) -> Option<&ArrayView> {
        self.arrays.iter().find(|a| a.name == name)
    }
}

/// In-memory [`Surface`]
#[derive(Debug)]
pub struct Canvas {
    width: f64,
    height: f64,
    next_id: u64,
    frames: FxHashMap<FrameHandle, VisualFrame>,
    order: Vec<FrameHandle>, // attached frames, bottom to top
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Canvas {
            width,
            height,
            next_id: 1,
            frames: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    /// Change the drawable area, e.g. after a terminal resize
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Attached frames in drawing order
    pub fn attached_frames(&self) -> impl Iterator<Item = &VisualFrame> {
        self.order.iter().filter_map(|h| self.frames.get(h))
    }

    pub fn frame(&self, handle: FrameHandle) -> Option<&VisualFrame> {
        self.frames.get(&handle)
    }

    pub fn is_attached(&self, handle: FrameHandle) -> bool {
        self.order.contains(&handle)
    }

    /// Number of frames created and not yet detached
    pub fn live_frames(&self) -> usize {
        self.frames.len()
    }

    /// Every highlighted region across all frames
    pub fn highlighted_regions(&self) -> Vec<RegionRef> {
        let mut regions: Vec<RegionRef> = self
            .frames
            .values()
            .flat_map(|frame| {
                frame
                    .regions
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| r.highlighted)
                    .map(|(index, _)| RegionRef {
                        frame: frame.handle,
                        index,
                    })
            })
            .collect();
        regions.sort_by_key(|r| (r.frame, r.index));
        regions
    }

    /// Tag of the highlighted region, if any
    pub fn highlighted_tag(&self) -> Option<&str> {
        self.highlighted_regions().first().and_then(|r| {
            let frame = self.frames.get(&r.frame)?;
            frame.listing.regions().get(r.index).map(|reg| reg.tag.as_str())
        })
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn frame_mut(&mut self, handle: FrameHandle) -> Option<&mut VisualFrame> {
        let frame = self.frames.get_mut(&handle);
        if frame.is_none() {
            trace!(?handle, "ignoring update to released frame");
        }
        frame
    }

    fn region_mut(&mut self, region: RegionRef) -> Option<&mut RegionState> {
        self.frame_mut(region.frame)?.regions.get_mut(region.index)
    }
}

impl Surface for Canvas {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn create_visual_frame(
        &mut self,
        function: &FunctionInfo,
        width: f64,
        height: f64,
    ) -> FrameHandle {
        let handle = FrameHandle(self.next_id());
        let listing = Rc::clone(function.listing());
        let regions = vec![RegionState::default(); listing.regions().len()];
        self.frames.insert(
            handle,
            VisualFrame {
                handle,
                title: function.name().to_string(),
                listing,
                x: 0.0,
                y: 0.0,
                width,
                height,
                opacity: 1.0,
                scale: 1.0,
                regions,
                variables: Vec::new(),
                arrays: Vec::new(),
                tags: Vec::new(),
            },
        );
        handle
    }

    fn attach(&mut self, frame: FrameHandle) {
        if self.frames.contains_key(&frame) && !self.order.contains(&frame) {
            self.order.push(frame);
        }
    }

    fn detach(&mut self, frame: FrameHandle) {
        self.order.retain(|h| *h != frame);
        self.frames.remove(&frame);
    }

    fn position(&self, frame: FrameHandle) -> Option<(f64, f64)> {
        self.frames.get(&frame).map(|f| (f.x, f.y))
    }

    fn set_position(&mut self, frame: FrameHandle, x: f64, y: f64) {
        if let Some(f) = self.frame_mut(frame) {
            f.x = x;
            f.y = y;
        }
    }

    fn set_opacity(&mut self, frame: FrameHandle, opacity: f64) {
        if let Some(f) = self.frame_mut(frame) {
            f.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    fn set_scale(&mut self, frame: FrameHandle, scale: f64) {
        if let Some(f) = self.frame_mut(frame) {
            f.scale = scale.max(0.0);
        }
    }

    fn find_tagged_region(&self, frame: FrameHandle, tag: &str) -> Result<Option<RegionRef>> {
        let Some(f) = self.frames.get(&frame) else {
            return Ok(None);
        };
        match f.listing.matching(tag).as_slice() {
            [] => Ok(None),
            [index] => Ok(Some(RegionRef {
                frame,
                index: *index,
            })),
            _ => Err(TraceError::AmbiguousTag {
                tag: tag.to_string(),
                function: f.title.clone(),
            }),
        }
    }

    fn set_region_highlighted(&mut self, region: RegionRef, highlighted: bool) {
        if let Some(state) = self.region_mut(region) {
            state.highlighted = highlighted;
        }
    }

    fn set_region_visible(&mut self, region: RegionRef, visible: bool) {
        if let Some(state) = self.region_mut(region) {
            state.visible = visible;
        }
    }

    fn render_value_tag(&mut self, text: &str, anchor: RegionRef) -> TagHandle {
        let handle = TagHandle(self.next_id());
        if let Some(frame) = self.frame_mut(anchor.frame) {
            if let Some(region) = frame.listing.regions().get(anchor.index).cloned() {
                frame.tags.push(ValueTag {
                    handle,
                    text: text.to_string(),
                    line: region.line + 1,
                    column: region.column,
                    width: region.width.max(text.chars().count()),
                });
            }
        }
        handle
    }

    fn remove_value_tag(&mut self, tag: TagHandle) {
        for frame in self.frames.values_mut() {
            frame.tags.retain(|t| t.handle != tag);
        }
    }

    fn put_variable(&mut self, frame: FrameHandle, name: &str, text: &str, width: f64) {
        let Some(f) = self.frame_mut(frame) else {
            return;
        };
        match f.variables.iter_mut().find(|v| v.name == name) {
            Some(view) => {
                view.text = text.to_string();
                view.width = width;
            }
            None => f.variables.push(VariableView {
                name: name.to_string(),
                text: text.to_string(),
                width,
                x: None,
                y: None,
            }),
        }
    }

    fn place_variable(&mut self, frame: FrameHandle, name: &str, x: f64, y: Option<f64>) {
        if let Some(view) = self
            .frame_mut(frame)
            .and_then(|f| f.variables.iter_mut().find(|v| v.name == name))
        {
            view.x = Some(x);
            view.y = y;
        }
    }

    fn put_array(
        &mut self,
        frame: FrameHandle,
        name: &str,
        cells: &[String],
        at: Option<(f64, f64)>,
    ) {
        let Some(f) = self.frame_mut(frame) else {
            return;
        };
        match f.arrays.iter_mut().find(|a| a.name == name) {
            Some(view) => {
                view.cells = cells.to_vec();
                if at.is_some() {
                    view.at = at;
                }
            }
            None => f.arrays.push(ArrayView {
                name: name.to_string(),
                cells: cells.to_vec(),
                at,
            }),
        }
    }

    fn clear(&mut self) {
        self.frames.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> FunctionInfo {
        FunctionInfo::new("f", "def f():\n    [[a|x = 1]]\n    [[b|return x]]\n    [[b|pass]]")
    }

    #[test]
    fn test_attach_and_detach() {
        let mut canvas = Canvas::new(80.0, 24.0);
        let handle = canvas.create_visual_frame(&info(), 30.0, 8.0);
        assert!(!canvas.is_attached(handle));

        canvas.attach(handle);
        canvas.attach(handle);
        assert_eq!(canvas.attached_frames().count(), 1);

        canvas.detach(handle);
        assert_eq!(canvas.live_frames(), 0);
        // Updates after release are ignored
        canvas.set_position(handle, 3.0, 4.0);
        assert_eq!(canvas.position(handle), None);
    }

    #[test]
    fn test_find_tagged_region() {
        let mut canvas = Canvas::new(80.0, 24.0);
        let handle = canvas.create_visual_frame(&info(), 30.0, 8.0);

        let region = canvas.find_tagged_region(handle, "a").unwrap();
        assert_eq!(region, Some(RegionRef { frame: handle, index: 0 }));
        assert_eq!(canvas.find_tagged_region(handle, "zzz").unwrap(), None);
        assert!(matches!(
            canvas.find_tagged_region(handle, "b"),
            Err(TraceError::AmbiguousTag { .. })
        ));
    }

    #[test]
    fn test_value_tag_sits_below_region() {
        let mut canvas = Canvas::new(80.0, 24.0);
        let handle = canvas.create_visual_frame(&info(), 30.0, 8.0);
        let region = RegionRef { frame: handle, index: 0 };

        let tag = canvas.render_value_tag("1", region);
        let frame = canvas.frame(handle).unwrap();
        assert_eq!(frame.tags.len(), 1);
        assert_eq!((frame.tags[0].line, frame.tags[0].column), (2, 4));

        canvas.remove_value_tag(tag);
        assert!(canvas.frame(handle).unwrap().tags.is_empty());
    }

    #[test]
    fn test_variable_upsert() {
        let mut canvas = Canvas::new(80.0, 24.0);
        let handle = canvas.create_visual_frame(&info(), 30.0, 8.0);
        canvas.put_variable(handle, "n", "", 8.0);
        canvas.put_variable(handle, "n", "3", 8.0);
        canvas.place_variable(handle, "n", 12.0, None);

        let frame = canvas.frame(handle).unwrap();
        assert_eq!(frame.variables.len(), 1);
        assert_eq!(frame.variable("n").unwrap().text, "3");
        assert_eq!(frame.variable("n").unwrap().x, Some(12.0));
    }
}
