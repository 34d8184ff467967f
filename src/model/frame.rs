//! Stack frames
//!
//! A [`StackFrame`] is one live invocation of a traced function. It owns the
//! variables, arrays and records the function body declares, keeps their
//! names unique, and mirrors every change onto its visual frame on the
//! [`Surface`].
//!
//! # Highlighting
//!
//! Only one region may be highlighted at a time across the whole session,
//! so the active highlight is not stored here. [`StackFrame::highlight`]
//! receives it from the session, clears it, and replaces it.

use super::function::FunctionInfo;
use super::value::Value;
use super::variable::{ArrayVar, Record, Variable, BOTTOM_MARGIN, VAR_SEP};
use crate::error::{Result, TraceError};
use crate::surface::{FrameHandle, RegionRef, Surface, TagHandle};
use rustc_hash::FxHashMap;

/// Anything declared in a frame's symbol table
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Variable(Variable),
    Array(ArrayVar),
    Record(Record),
}

impl Slot {
    pub fn name(&self) -> &str {
        match self {
            Slot::Variable(v) => v.name(),
            Slot::Array(a) => a.name(),
            Slot::Record(r) => r.name(),
        }
    }
}

/// One activation of a traced function
#[derive(Debug, Clone)]
pub struct StackFrame {
    function: FunctionInfo,
    handle: FrameHandle,
    width: f64,
    height: f64,
    slots: Vec<Slot>,                  // declaration order
    symtab: FxHashMap<String, usize>,  // name -> index into slots
    tags: FxHashMap<String, TagHandle>, // region tag -> value tag shown under it
    kept: bool,
}

impl StackFrame {
    pub fn new(function: FunctionInfo, handle: FrameHandle, width: f64, height: f64) -> Self {
        StackFrame {
            function,
            handle,
            width,
            height,
            slots: Vec::new(),
            symtab: FxHashMap::default(),
            tags: FxHashMap::default(),
            kept: false,
        }
    }

    pub fn function(&self) -> &FunctionInfo {
        &self.function
    }

    pub fn name(&self) -> &str {
        self.function.name()
    }

    pub fn handle(&self) -> FrameHandle {
        self.handle
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Whether the frame stayed on screen after its function returned
    pub fn is_kept(&self) -> bool {
        self.kept
    }

    pub fn mark_kept(&mut self) {
        self.kept = true;
    }

    /// Current position of the frame on the surface
    pub fn position(&self, surface: &dyn Surface) -> Option<(f64, f64)> {
        surface.position(self.handle)
    }

    /// Adjust the frame's location by the given displacement
    pub fn move_by(&self, surface: &mut dyn Surface, dx: f64, dy: f64) {
        surface.move_by(self.handle, dx, dy);
    }

    fn declare(&mut self, slot: Slot) -> Result<()> {
        let name = slot.name().to_string();
        if self.symtab.contains_key(&name) {
            return Err(TraceError::DuplicateName {
                name,
                function: self.name().to_string(),
            });
        }
        self.symtab.insert(name, self.slots.len());
        self.slots.push(slot);
        Ok(())
    }

    fn slot(&self, name: &str) -> Result<&Slot> {
        self.symtab
            .get(name)
            .map(|&index| &self.slots[index])
            .ok_or_else(|| TraceError::NameNotFound {
                name: name.to_string(),
            })
    }

    fn slot_mut(&mut self, name: &str) -> Result<&mut Slot> {
        match self.symtab.get(name) {
            Some(&index) => Ok(&mut self.slots[index]),
            None => Err(TraceError::NameNotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Add a variable to the frame; it starts out undefined
    pub fn add_variable(&mut self, mut variable: Variable, surface: &mut dyn Surface) -> Result<()> {
        variable.set(Value::Undefined);
        let name = variable.name().to_string();
        let (text, width) = (variable.display_text(), variable.width());
        self.declare(Slot::Variable(variable))?;
        surface.put_variable(self.handle, &name, &text, width);
        Ok(())
    }

    /// Add an array, optionally at a fixed offset inside the frame
    pub fn add_array(
        &mut self,
        array: ArrayVar,
        at: Option<(f64, f64)>,
        surface: &mut dyn Surface,
    ) -> Result<()> {
        let (name, cells) = (array.name().to_string(), array.cell_texts());
        self.declare(Slot::Array(array))?;
        surface.put_array(self.handle, &name, &cells, at);
        Ok(())
    }

    /// Add a record; its attributes are shown as `record.attribute` boxes
    pub fn add_record(
        &mut self,
        record: Record,
        at: (f64, f64),
        surface: &mut dyn Surface,
    ) -> Result<()> {
        let boxes: Vec<(String, String, f64, f64, f64)> = record
            .attributes()
            .map(|(attr, dx, dy)| {
                let qualified = format!("{}.{}", record.name(), attr.name());
                (qualified, attr.display_text(), attr.width(), dx, dy)
            })
            .collect();
        self.declare(Slot::Record(record))?;
        for (qualified, text, width, dx, dy) in boxes {
            surface.put_variable(self.handle, &qualified, &text, width);
            surface.place_variable(self.handle, &qualified, at.0 + dx, Some(at.1 + dy));
        }
        Ok(())
    }

    /// Scalar and image variables in declaration order
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Variable(v) => Some(v),
            _ => None,
        })
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Look up a variable, or None
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        match self.slot(name) {
            Ok(Slot::Variable(v)) => Some(v),
            _ => None,
        }
    }

    /// Value of the named variable
    pub fn get(&self, name: &str) -> Result<&Value> {
        match self.slot(name)? {
            Slot::Variable(v) => Ok(v.get()),
            _ => Err(kind_mismatch(name, "a variable")),
        }
    }

    /// Assign the named variable and refresh its box
    pub fn set(&mut self, name: &str, value: Value, surface: &mut dyn Surface) -> Result<()> {
        let handle = self.handle;
        match self.slot_mut(name)? {
            Slot::Variable(v) => {
                v.set(value);
                surface.put_variable(handle, name, &v.display_text(), v.width());
                Ok(())
            }
            _ => Err(kind_mismatch(name, "a variable")),
        }
    }

    /// Point an image variable at a new image (or none)
    pub fn set_image(
        &mut self,
        name: &str,
        image: Option<String>,
        surface: &mut dyn Surface,
    ) -> Result<()> {
        let handle = self.handle;
        match self.slot_mut(name)? {
            Slot::Variable(v) => {
                v.set_image(image)?;
                surface.put_variable(handle, name, &v.display_text(), v.width());
                Ok(())
            }
            _ => Err(kind_mismatch(name, "an image variable")),
        }
    }

    pub fn array(&self, name: &str) -> Result<&ArrayVar> {
        match self.slot(name)? {
            Slot::Array(a) => Ok(a),
            _ => Err(kind_mismatch(name, "an array")),
        }
    }

    pub fn array_get(&self, name: &str, index: usize) -> Result<&Value> {
        self.array(name)?.get(index)
    }

    /// Assign one array cell and refresh the array display
    pub fn array_set(
        &mut self,
        name: &str,
        index: usize,
        value: Value,
        surface: &mut dyn Surface,
    ) -> Result<()> {
        let handle = self.handle;
        match self.slot_mut(name)? {
            Slot::Array(a) => {
                a.set(index, value)?;
                surface.put_array(handle, name, &a.cell_texts(), None);
                Ok(())
            }
            _ => Err(kind_mismatch(name, "an array")),
        }
    }

    pub fn record(&self, name: &str) -> Result<&Record> {
        match self.slot(name)? {
            Slot::Record(r) => Ok(r),
            _ => Err(kind_mismatch(name, "a record")),
        }
    }

    /// Value of one record attribute
    pub fn record_get(&self, name: &str, attribute: &str) -> Result<&Value> {
        self.record(name)?
            .attribute(attribute)
            .map(Variable::get)
            .ok_or_else(|| TraceError::NameNotFound {
                name: format!("{}.{}", name, attribute),
            })
    }

    /// Assign one record attribute
    pub fn record_set(
        &mut self,
        name: &str,
        attribute: &str,
        value: Value,
        surface: &mut dyn Surface,
    ) -> Result<()> {
        let handle = self.handle;
        let qualified = format!("{}.{}", name, attribute);
        let record = match self.slot_mut(name)? {
            Slot::Record(r) => r,
            _ => return Err(kind_mismatch(name, "a record")),
        };
        let attr = record
            .attribute_mut(attribute)
            .ok_or_else(|| TraceError::NameNotFound {
                name: qualified.clone(),
            })?;
        attr.set(value);
        surface.put_variable(handle, &qualified, &attr.display_text(), attr.width());
        Ok(())
    }

    /// Place the variables right-aligned along the bottom of the frame
    pub fn layout_variables(&self, surface: &mut dyn Surface) {
        let mut x = self.width;
        let row = self.height - BOTTOM_MARGIN;
        let variables: Vec<&Variable> = self.variables().collect();
        for variable in variables.into_iter().rev() {
            x -= variable.width() + VAR_SEP;
            surface.place_variable(self.handle, variable.name(), x, Some(row));
        }
    }

    /// Show or hide the region tagged `key`; a missing tag is ignored
    pub fn set_visible(&self, key: &str, flag: bool, surface: &mut dyn Surface) -> Result<()> {
        if let Some(region) = surface.find_tagged_region(self.handle, key)? {
            surface.set_region_visible(region, flag);
        }
        Ok(())
    }

    /// Replace the session-wide highlight with the region tagged `key`
    ///
    /// The previous highlight is always cleared first. A `key` of `None`, or
    /// a tag missing from this frame's listing, leaves nothing highlighted.
    pub fn highlight(
        &self,
        key: Option<&str>,
        active: &mut Option<RegionRef>,
        surface: &mut dyn Surface,
    ) -> Result<()> {
        if let Some(old) = active.take() {
            surface.set_region_highlighted(old, false);
        }
        if let Some(key) = key {
            if let Some(region) = surface.find_tagged_region(self.handle, key)? {
                surface.set_region_highlighted(region, true);
                *active = Some(region);
            }
        }
        Ok(())
    }

    /// Show `text` under the region tagged `key`
    ///
    /// Returns `None` when the listing has no such region. A tag already
    /// shown under the same region is replaced.
    pub fn add_value_tag(
        &mut self,
        text: &str,
        key: &str,
        surface: &mut dyn Surface,
    ) -> Result<Option<TagHandle>> {
        let Some(anchor) = surface.find_tagged_region(self.handle, key)? else {
            return Ok(None);
        };
        let tag = surface.render_value_tag(text, anchor);
        if let Some(old) = self.tags.insert(key.to_string(), tag) {
            surface.remove_value_tag(old);
        }
        Ok(Some(tag))
    }

    /// Remove the value tag shown under `key`; returns whether one existed
    pub fn remove_value_tag(&mut self, key: &str, surface: &mut dyn Surface) -> bool {
        match self.tags.remove(key) {
            Some(tag) => {
                surface.remove_value_tag(tag);
                true
            }
            None => false,
        }
    }
}

fn kind_mismatch(name: &str, expected: &'static str) -> TraceError {
    TraceError::KindMismatch {
        name: name.to_string(),
        expected,
    }
}
