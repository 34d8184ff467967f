//! Function descriptors

use super::listing::Listing;
use std::rc::Rc;

/// Static description of a traced function: its name, the listing shown in
/// its frames and optional frame size overrides
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionInfo {
    name: String,
    listing: Rc<Listing>,
    frame_width: Option<f64>,
    frame_height: Option<f64>,
}

impl FunctionInfo {
    /// Create a descriptor from a name and `[[tag|text]]` listing source
    pub fn new(name: impl Into<String>, source: &str) -> Self {
        FunctionInfo {
            name: name.into(),
            listing: Rc::new(Listing::parse(source)),
            frame_width: None,
            frame_height: None,
        }
    }

    pub fn with_frame_width(mut self, width: f64) -> Self {
        self.frame_width = Some(width);
        self
    }

    pub fn with_frame_height(mut self, height: f64) -> Self {
        self.frame_height = Some(height);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn listing(&self) -> &Rc<Listing> {
        &self.listing
    }

    /// Frame width for this function, falling back to the session default
    pub fn frame_width(&self, default: f64) -> f64 {
        self.frame_width.unwrap_or(default)
    }

    /// Frame height for this function, falling back to the session default
    pub fn frame_height(&self, default: f64) -> f64 {
        self.frame_height.unwrap_or(default)
    }
}
