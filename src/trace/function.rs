//! Traced functions and the function registry
//!
//! A traced function is anything implementing [`TracedFunction`]: it builds
//! its frame and runs its body against a [`TraceSession`], calling the
//! session's step methods wherever execution should be observable. Hosts
//! with simple bodies can skip the trait and register a closure, which is
//! wrapped in a [`ScriptedFunction`].

use super::session::TraceSession;
use crate::error::{Result, TraceError};
use crate::model::frame::StackFrame;
use crate::model::function::FunctionInfo;
use crate::model::value::Value;
use futures_util::future::{FutureExt, LocalBoxFuture};
use rustc_hash::FxHashMap;
use std::future::Future;
use std::rc::Rc;

/// Contract between the session and a traced function body
pub trait TracedFunction {
    fn info(&self) -> &FunctionInfo;

    /// Build the frame for a new invocation
    fn create_frame(&self, session: &TraceSession) -> Result<StackFrame> {
        Ok(session.create_frame(self.info()))
    }

    /// Execute the body and produce the function's result
    fn run<'a>(&'a self, _session: &'a TraceSession) -> LocalBoxFuture<'a, Result<Value>> {
        let operation = format!("{}::run", self.info().name());
        async move { Err(TraceError::UnimplementedOperation { operation }) }.boxed_local()
    }
}

type Body = Rc<dyn Fn(TraceSession) -> LocalBoxFuture<'static, Result<Value>>>;

/// A traced function whose body is a closure
pub struct ScriptedFunction {
    info: FunctionInfo,
    body: Body,
}

impl ScriptedFunction {
    pub fn new<F, Fut>(info: FunctionInfo, body: F) -> Self
    where
        F: Fn(TraceSession) -> Fut + 'static,
        Fut: Future<Output = Result<Value>> + 'static,
    {
        ScriptedFunction {
            info,
            body: Rc::new(move |session| body(session).boxed_local()),
        }
    }
}

impl TracedFunction for ScriptedFunction {
    fn info(&self) -> &FunctionInfo {
        &self.info
    }

    fn run<'a>(&'a self, session: &'a TraceSession) -> LocalBoxFuture<'a, Result<Value>> {
        (self.body)(session.clone())
    }
}

/// Name to function mapping
#[derive(Default)]
pub struct FunctionTable {
    functions: FxHashMap<String, Rc<dyn TracedFunction>>,
}

impl FunctionTable {
    pub fn new() -> Self {
        FunctionTable::default()
    }

    /// Register a function under its own name, replacing any previous one
    pub fn define(&mut self, function: Rc<dyn TracedFunction>) {
        let name = function.info().name().to_string();
        self.define_as(name, function);
    }

    /// Register a function under an alias
    pub fn define_as(&mut self, name: impl Into<String>, function: Rc<dyn TracedFunction>) {
        self.functions.insert(name.into(), function);
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn TracedFunction>> {
        self.functions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
