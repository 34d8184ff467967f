//! Named value holders attached to a stack frame
//!
//! - [`Variable`]: a labelled box holding one [`Value`], optionally an image
//! - [`ArrayVar`]: a fixed-length row of cells with an index underneath
//! - [`Record`]: a bordered group of attribute variables stacked vertically
//!
//! These types only hold data. Pushing their text onto the visual surface is
//! done by [`StackFrame`](super::frame::StackFrame), which owns them.

use super::value::Value;
use crate::error::{Result, TraceError};

/// Default width of a variable box
pub const DEFAULT_VAR_WIDTH: f64 = 8.0;

/// Default height of a variable box
pub const DEFAULT_VAR_HEIGHT: f64 = 1.0;

/// Horizontal gap between variables laid out along the bottom of a frame
pub const VAR_SEP: f64 = 2.0;

/// Distance between the bottom of a frame and its variable row
pub const BOTTOM_MARGIN: f64 = 2.0;

/// What a variable box displays
#[derive(Debug, Clone, PartialEq)]
pub enum VariableKind {
    Scalar,
    /// Image reference drawn at `scale` of the box width
    Image { source: Option<String>, scale: f64 },
}

/// A single named variable
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: String,
    value: Value,
    width: f64,
    height: f64,
    quote: bool,
    kind: VariableKind,
}

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Variable::with_size(name, DEFAULT_VAR_WIDTH, DEFAULT_VAR_HEIGHT)
    }

    pub fn with_size(name: impl Into<String>, width: f64, height: f64) -> Self {
        Variable {
            name: name.into(),
            value: Value::Undefined,
            width,
            height,
            quote: false,
            kind: VariableKind::Scalar,
        }
    }

    /// Create an image variable; `scale` defaults to 0.75 in the demos
    pub fn image(name: impl Into<String>, width: f64, height: f64, scale: f64) -> Self {
        Variable {
            kind: VariableKind::Image {
                source: None,
                scale,
            },
            ..Variable::with_size(name, width, height)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self) -> &Value {
        &self.value
    }

    pub fn set(&mut self, value: Value) {
        self.value = value;
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn kind(&self) -> &VariableKind {
        &self.kind
    }

    pub fn quote_flag(&self) -> bool {
        self.quote
    }

    /// Show string values in quotes
    pub fn set_quote_flag(&mut self, flag: bool) {
        self.quote = flag;
    }

    /// Point an image variable at a new source; fails on scalar variables
    pub fn set_image(&mut self, image: Option<String>) -> Result<()> {
        match &mut self.kind {
            VariableKind::Image { source, .. } => {
                *source = image;
                Ok(())
            }
            VariableKind::Scalar => Err(TraceError::KindMismatch {
                name: self.name.clone(),
                expected: "an image variable",
            }),
        }
    }

    /// Text shown in the variable's box
    pub fn display_text(&self) -> String {
        match &self.kind {
            VariableKind::Scalar => self.value.display_text(self.quote),
            VariableKind::Image { source: None, .. } => String::new(),
            VariableKind::Image {
                source: Some(src),
                scale,
            } => format!("[{} @{:.0}%]", src, scale * 100.0),
        }
    }
}

/// A fixed-length array variable
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayVar {
    name: String,
    values: Vec<Value>,
    quote: bool,
}

impl ArrayVar {
    /// Create an array of `len` undefined cells
    pub fn new(name: impl Into<String>, len: usize) -> Self {
        ArrayVar {
            name: name.into(),
            values: vec![Value::Undefined; len],
            quote: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn set_quote_flag(&mut self, flag: bool) {
        self.quote = flag;
    }

    pub fn get(&self, index: usize) -> Result<&Value> {
        self.values.get(index).ok_or_else(|| self.out_of_bounds(index))
    }

    pub fn set(&mut self, index: usize, value: Value) -> Result<()> {
        let len = self.values.len();
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(TraceError::IndexOutOfBounds {
                name: self.name.clone(),
                index,
                len,
            }),
        }
    }

    /// Display text of every cell, in index order
    pub fn cell_texts(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|v| v.display_text(self.quote))
            .collect()
    }

    fn out_of_bounds(&self, index: usize) -> TraceError {
        TraceError::IndexOutOfBounds {
            name: self.name.clone(),
            index,
            len: self.values.len(),
        }
    }
}

/// Vertical spacing between record attributes
pub const RECORD_DELTA_Y: f64 = 2.0;

/// Gap above the first record attribute
pub const RECORD_TOP_MARGIN: f64 = 1.0;

/// A record drawn as a box of attribute variables
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    name: String,
    width: f64,
    height: f64,
    attributes: Vec<(Variable, f64, f64)>, // variable with its offset inside the record
    next_y: f64,
}

impl Record {
    pub fn new(name: impl Into<String>, width: f64, height: f64) -> Self {
        Record {
            name: name.into(),
            width,
            height,
            attributes: Vec::new(),
            next_y: RECORD_TOP_MARGIN,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Append an attribute, centred horizontally below the previous one
    pub fn add_attribute(&mut self, variable: Variable) -> Result<()> {
        if self.attribute(variable.name()).is_some() {
            return Err(TraceError::DuplicateName {
                name: variable.name().to_string(),
                function: self.name.clone(),
            });
        }
        let x = (self.width - variable.width()) / 2.0;
        let y = self.next_y;
        self.next_y += variable.height() + RECORD_DELTA_Y;
        self.attributes.push((variable, x, y));
        Ok(())
    }

    pub fn attribute(&self, name: &str) -> Option<&Variable> {
        self.attributes
            .iter()
            .map(|(v, _, _)| v)
            .find(|v| v.name() == name)
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.attributes
            .iter_mut()
            .map(|(v, _, _)| v)
            .find(|v| v.name() == name)
    }

    /// Attributes with their offsets inside the record
    pub fn attributes(&self) -> impl Iterator<Item = (&Variable, f64, f64)> {
        self.attributes.iter().map(|(v, x, y)| (v, *x, *y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_bounds() {
        let mut array = ArrayVar::new("a", 3);
        array.set(2, Value::Int(9)).unwrap();
        assert_eq!(array.get(2).unwrap(), &Value::Int(9));
        assert_eq!(
            array.set(3, Value::Int(1)),
            Err(TraceError::IndexOutOfBounds {
                name: "a".to_string(),
                index: 3,
                len: 3
            })
        );
        assert_eq!(array.cell_texts(), vec!["", "", "9"]);
    }

    #[test]
    fn test_record_stacks_attributes() {
        let mut record = Record::new("p", 20.0, 8.0);
        record.add_attribute(Variable::new("x")).unwrap();
        record.add_attribute(Variable::new("y")).unwrap();

        let offsets: Vec<(f64, f64)> = record.attributes().map(|(_, x, y)| (x, y)).collect();
        assert_eq!(offsets, vec![(6.0, 1.0), (6.0, 4.0)]);
        assert!(record.add_attribute(Variable::new("x")).is_err());
    }

    #[test]
    fn test_image_variable_text() {
        let mut scalar = Variable::new("s");
        assert!(scalar.set_image(Some("cat.png".to_string())).is_err());

        let mut image = Variable::image("pic", 10.0, 4.0, 0.75);
        assert_eq!(image.display_text(), "");
        image.set_image(Some("cat.png".to_string())).unwrap();
        assert_eq!(image.display_text(), "[cat.png @75%]");
    }
}
