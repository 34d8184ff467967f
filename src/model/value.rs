//! Runtime value representation
//!
//! [`Value`] is what traced function bodies store in variables, pass through
//! the value stack and return from calls. Every variant has a textual form
//! used for variable boxes and value tags.

use std::fmt;

/// Values manipulated by traced programs
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Undefined, // Declared but never assigned
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    /// Check if this value has been assigned
    pub fn is_defined(&self) -> bool {
        !matches!(self, Value::Undefined)
    }

    /// Get the integer value, returns None if not an Int
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the boolean value, returns None if not a Bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the string contents, returns None if not a Str
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Text shown inside a variable box; strings are quoted when `quote` is set
    pub fn display_text(&self, quote: bool) -> String {
        match self {
            Value::Undefined => String::new(),
            Value::Str(s) if quote => format!("\"{}\"", s),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_text_quotes_strings_only_on_request() {
        let s = Value::from("abc");
        assert_eq!(s.display_text(false), "abc");
        assert_eq!(s.display_text(true), "\"abc\"");
        assert_eq!(Value::Int(7).display_text(true), "7");
    }

    #[test]
    fn test_undefined_shows_as_empty_box() {
        assert_eq!(Value::Undefined.display_text(false), "");
        assert_eq!(Value::Undefined.to_string(), "undefined");
        assert!(!Value::default().is_defined());
    }

    #[test]
    fn test_list_display() {
        let list = Value::List(vec![Value::Int(1), Value::Bool(true), Value::from("x")]);
        assert_eq!(list.to_string(), "[1, true, x]");
    }
}
