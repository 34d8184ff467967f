//! Recursive factorial
//!
//! Each level tags the value of its recursive call under the call site, so
//! the partial products show up as the recursion unwinds.

use super::int_arg;
use crate::error::{Result, TraceError};
use crate::model::function::FunctionInfo;
use crate::model::value::Value;
use crate::trace::{TraceSession, TracedFunction};
use futures_util::future::{FutureExt, LocalBoxFuture};

const FACT_SOURCE: &str = "\
def fact(n):
    if [[test|n <= 1]]:
        [[base|return 1]]
    r = [[recurse|fact(n - 1)]]
    [[return|return n * r]]";

const MAIN_SOURCE: &str = "\
def main(n):
    [[call|result = fact(n)]]
    [[print|print(result)]]";

/// `fact(n)`
pub struct Factorial {
    info: FunctionInfo,
}

impl Factorial {
    pub fn new() -> Self {
        Factorial {
            info: FunctionInfo::new("fact", FACT_SOURCE),
        }
    }
}

impl Default for Factorial {
    fn default() -> Self {
        Self::new()
    }
}

impl TracedFunction for Factorial {
    fn info(&self) -> &FunctionInfo {
        &self.info
    }

    fn run<'a>(&'a self, session: &'a TraceSession) -> LocalBoxFuture<'a, Result<Value>> {
        async move {
            let n = int_arg(session)?;
            session.declare("n")?;
            session.declare("r")?;
            session.set("n", Value::Int(n))?;
            session.layout_variables()?;

            if session.request_step("test", move |_| n <= 1).await? {
                session.pause("base").await?;
                return Ok(Value::Int(1));
            }

            let r = session
                .request_async_step_and_tag("recurse", move |s| async move {
                    s.call("fact", vec![Value::Int(n - 1)]).await
                })
                .await?;
            session.set("r", r.clone())?;

            let product = r
                .as_int()
                .and_then(|r| r.checked_mul(n))
                .ok_or_else(|| TraceError::Overflow {
                    operation: format!("fact({n})"),
                })?;
            session
                .request_step("return", move |_| Value::Int(product))
                .await
        }
        .boxed_local()
    }
}

/// `main(n)`: calls `fact(n)` and prints the result
pub struct FactorialMain {
    info: FunctionInfo,
}

impl FactorialMain {
    pub fn new() -> Self {
        FactorialMain {
            info: FunctionInfo::new("main", MAIN_SOURCE),
        }
    }
}

impl Default for FactorialMain {
    fn default() -> Self {
        Self::new()
    }
}

impl TracedFunction for FactorialMain {
    fn info(&self) -> &FunctionInfo {
        &self.info
    }

    fn run<'a>(&'a self, session: &'a TraceSession) -> LocalBoxFuture<'a, Result<Value>> {
        async move {
            let n = int_arg(session)?;
            session.declare("n")?;
            session.declare("result")?;
            session.set("n", Value::Int(n))?;
            session.layout_variables()?;

            let result = session
                .request_async_step("call", move |s| async move {
                    s.call("fact", vec![Value::Int(n)]).await
                })
                .await?;
            session.set("result", result.clone())?;
            session.pause("print").await?;
            Ok(result)
        }
        .boxed_local()
    }
}
