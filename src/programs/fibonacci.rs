//! Doubly recursive Fibonacci
//!
//! Every frame makes two nested calls, which makes it the demo where step
//! over saves the most keystrokes.

use super::int_arg;
use crate::error::{Result, TraceError};
use crate::model::function::FunctionInfo;
use crate::model::value::Value;
use crate::trace::{TraceSession, TracedFunction};
use futures_util::future::{FutureExt, LocalBoxFuture};

const FIB_SOURCE: &str = "\
def fib(n):
    if [[test|n < 2]]:
        [[base|return n]]
    a = [[left|fib(n - 1)]]
    b = [[right|fib(n - 2)]]
    [[return|return a + b]]";

/// `fib(n)`
pub struct Fibonacci {
    info: FunctionInfo,
}

impl Fibonacci {
    pub fn new() -> Self {
        Fibonacci {
            info: FunctionInfo::new("fib", FIB_SOURCE),
        }
    }
}

impl Default for Fibonacci {
    fn default() -> Self {
        Self::new()
    }
}

impl TracedFunction for Fibonacci {
    fn info(&self) -> &FunctionInfo {
        &self.info
    }

    fn run<'a>(&'a self, session: &'a TraceSession) -> LocalBoxFuture<'a, Result<Value>> {
        async move {
            let n = int_arg(session)?;
            for name in ["n", "a", "b"] {
                session.declare(name)?;
            }
            session.set("n", Value::Int(n))?;
            session.layout_variables()?;

            if session.request_step("test", move |_| n < 2).await? {
                session.pause("base").await?;
                return Ok(Value::Int(n));
            }

            let a = session
                .request_async_step_and_tag("left", move |s| async move {
                    s.call("fib", vec![Value::Int(n - 1)]).await
                })
                .await?;
            session.set("a", a.clone())?;

            let b = session
                .request_async_step_and_tag("right", move |s| async move {
                    s.call("fib", vec![Value::Int(n - 2)]).await
                })
                .await?;
            session.set("b", b.clone())?;

            let sum = a
                .as_int()
                .zip(b.as_int())
                .and_then(|(a, b)| a.checked_add(b))
                .ok_or_else(|| TraceError::Overflow {
                    operation: format!("fib({n})"),
                })?;
            session.request_step("return", move |_| Value::Int(sum)).await
        }
        .boxed_local()
    }
}
