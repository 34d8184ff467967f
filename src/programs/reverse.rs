//! In-place array reversal
//!
//! The array is passed as a list value and copied into an array variable,
//! so every swap is visible in the frame's cell row.

use crate::error::{Result, TraceError};
use crate::model::function::FunctionInfo;
use crate::model::value::Value;
use crate::model::variable::ArrayVar;
use crate::trace::{TraceSession, TracedFunction};
use futures_util::future::{FutureExt, LocalBoxFuture};

const REVERSE_SOURCE: &str = "\
def reverse(array):
    n = len(array)
    for i in [[loop|range(n // 2)]]:
        [[swap|swap(array, i, n - 1 - i)]]
    [[return|return array]]";

/// Row on which the array cells are drawn
const ARRAY_ROW: f64 = 7.0;

/// `reverse(array)`
pub struct Reverse {
    info: FunctionInfo,
}

impl Reverse {
    pub fn new() -> Self {
        Reverse {
            info: FunctionInfo::new("reverse", REVERSE_SOURCE),
        }
    }
}

impl Default for Reverse {
    fn default() -> Self {
        Self::new()
    }
}

impl TracedFunction for Reverse {
    fn info(&self) -> &FunctionInfo {
        &self.info
    }

    fn run<'a>(&'a self, session: &'a TraceSession) -> LocalBoxFuture<'a, Result<Value>> {
        async move {
            let Value::List(items) = session.pop() else {
                return Err(TraceError::KindMismatch {
                    name: "array".to_string(),
                    expected: "a list",
                });
            };
            let n = items.len();
            session.add_array(ArrayVar::new("array", n), Some((2.0, ARRAY_ROW)))?;
            for (index, item) in items.into_iter().enumerate() {
                session.array_set("array", index, item)?;
            }
            session.declare("n")?;
            session.declare("i")?;
            session.set("n", Value::Int(n as i64))?;
            session.layout_variables()?;

            for i in 0..n / 2 {
                session
                    .request_step("loop", move |s| s.set("i", Value::Int(i as i64)))
                    .await??;
                session
                    .request_step("swap", move |s| {
                        let j = n - 1 - i;
                        let left = s.array_get("array", i)?;
                        let right = s.array_get("array", j)?;
                        s.array_set("array", i, right)?;
                        s.array_set("array", j, left)
                    })
                    .await??;
            }

            session
                .request_step("return", |s| -> Result<Value> {
                    s.with_current_frame(|frame| frame.array("array").map(|a| a.values().to_vec()))?
                        .map(Value::List)
                })
                .await?
        }
        .boxed_local()
    }
}
