//! Built-in traced programs
//!
//! Each program registers its functions on a session and sets the entry
//! point the session starts (and restarts on reset):
//! - [`Program::Factorial`]: `main(n)` calling recursive `fact(n)`
//! - [`Program::Fibonacci`]: doubly recursive `fib(n)`
//! - [`Program::Reverse`]: `reverse` over the list `[1, ..., n]`

pub mod factorial;
pub mod fibonacci;
pub mod reverse;

pub use factorial::{Factorial, FactorialMain};
pub use fibonacci::Fibonacci;
pub use reverse::Reverse;

use crate::error::{Result, TraceError};
use crate::model::value::Value;
use crate::trace::TraceSession;
use clap::ValueEnum;

/// Selectable demo program
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Program {
    Factorial,
    Fibonacci,
    Reverse,
}

impl Program {
    pub fn title(self) -> &'static str {
        match self {
            Program::Factorial => "Factorial",
            Program::Fibonacci => "Fibonacci",
            Program::Reverse => "Array reversal",
        }
    }

    /// Deepest call nesting the program reaches for argument `n`
    pub fn max_depth(self, n: i64) -> usize {
        let n = n.max(1) as usize;
        match self {
            Program::Factorial => n,
            Program::Fibonacci => n.saturating_sub(1).max(1),
            Program::Reverse => 1,
        }
    }

    /// Register the program's functions and its entry point
    pub fn install(self, session: &TraceSession, n: i64) {
        match self {
            Program::Factorial => {
                session.define_function(FactorialMain::new());
                session.define_function(Factorial::new());
                session.set_entry_call("main", vec![Value::Int(n)]);
            }
            Program::Fibonacci => {
                session.define_function(Fibonacci::new());
                session.set_entry_call("fib", vec![Value::Int(n)]);
            }
            Program::Reverse => {
                session.define_function(Reverse::new());
                let items = (1..=n.max(0)).map(Value::Int).collect();
                session.set_entry_call("reverse", vec![Value::List(items)]);
            }
        }
    }
}

/// Pop an integer argument off the value stack
pub(crate) fn int_arg(session: &TraceSession) -> Result<i64> {
    let value = session.pop();
    value.as_int().ok_or_else(|| TraceError::KindMismatch {
        name: format!("argument {}", value),
        expected: "an integer",
    })
}
