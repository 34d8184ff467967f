//! The trace session
//!
//! [`TraceSession`] is the coordinator of one visualization: it owns the
//! call stack, the value stack, the pending-step queue, the skip marker, the
//! single active highlight, the function registry and the host's entry
//! point. It is a cheap `Rc` handle; clones share the same state, which is
//! how traced bodies, the run timer and the UI all reach it.
//!
//! This file holds state, frame management and the call protocol. Stepping
//! lives in [`scheduler`](super::scheduler).
//!
//! # Borrowing
//!
//! Every piece of state sits in its own `RefCell` and is borrowed only for
//! the duration of a synchronous operation, never across an `.await`.

use super::function::{FunctionTable, ScriptedFunction, TracedFunction};
use crate::animation::Animation;
use crate::config::TraceConfig;
use crate::error::{Result, TraceError};
use crate::model::frame::StackFrame;
use crate::model::function::FunctionInfo;
use crate::model::stack::CallStack;
use crate::model::value::Value;
use crate::model::variable::{ArrayVar, Record, Variable};
use crate::surface::{FrameHandle, RegionRef, SharedSurface, Surface, TagHandle};
use futures_util::future::{FutureExt, LocalBoxFuture};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Deferred remainder of a traced body, run by a step command
pub(crate) type Continuation = Box<dyn FnOnce(&TraceSession)>;

type EntryPoint = Rc<dyn Fn(TraceSession) -> LocalBoxFuture<'static, Result<Value>>>;

pub(crate) struct SessionInner {
    pub(crate) title: String,
    pub(crate) config: RefCell<TraceConfig>,
    pub(crate) surface: SharedSurface,
    pub(crate) functions: RefCell<FunctionTable>,
    pub(crate) stack: RefCell<CallStack>,
    pub(crate) values: RefCell<Vec<Value>>,
    pub(crate) queue: RefCell<VecDeque<Continuation>>,
    /// Call-stack depth recorded by step-over; `None` when not skipping
    pub(crate) call_base: Cell<Option<usize>>,
    pub(crate) highlight: RefCell<Option<RegionRef>>,
    pub(crate) entry: RefCell<Option<EntryPoint>>,
    pub(crate) entry_task: RefCell<Option<JoinHandle<()>>>,
    pub(crate) run_timer: RefCell<Option<JoinHandle<()>>>,
    pub(crate) outcome: RefCell<Option<Result<Value>>>,
}

/// Shared handle to one visualization's execution state
#[derive(Clone)]
pub struct TraceSession {
    pub(crate) inner: Rc<SessionInner>,
}

impl TraceSession {
    pub fn new(title: impl Into<String>, surface: SharedSurface, config: TraceConfig) -> Self {
        TraceSession {
            inner: Rc::new(SessionInner {
                title: title.into(),
                config: RefCell::new(config),
                surface,
                functions: RefCell::new(FunctionTable::new()),
                stack: RefCell::new(CallStack::new()),
                values: RefCell::new(Vec::new()),
                queue: RefCell::new(VecDeque::new()),
                call_base: Cell::new(None),
                highlight: RefCell::new(None),
                entry: RefCell::new(None),
                entry_task: RefCell::new(None),
                run_timer: RefCell::new(None),
                outcome: RefCell::new(None),
            }),
        }
    }

    pub fn title(&self) -> &str {
        &self.inner.title
    }

    pub fn surface(&self) -> SharedSurface {
        Rc::clone(&self.inner.surface)
    }

    // ----- configuration -----

    /// Snapshot of the current configuration
    pub fn config(&self) -> TraceConfig {
        self.inner.config.borrow().clone()
    }

    pub fn set_frame_deltas(&self, dx: f64, dy: f64) {
        let mut config = self.inner.config.borrow_mut();
        config.frame_dx = dx;
        config.frame_dy = dy;
    }

    /// Fix the frame width instead of deriving it from the maximum depth
    pub fn set_frame_width(&self, width: f64) {
        self.inner.config.borrow_mut().frame_width = Some(width);
    }

    pub fn set_frame_height(&self, height: f64) {
        self.inner.config.borrow_mut().frame_height = height;
    }

    pub fn set_max_stack_depth(&self, depth: usize) {
        self.inner.config.borrow_mut().max_depth = depth;
    }

    pub fn set_run_delay(&self, delay: Duration) {
        self.inner.config.borrow_mut().run_delay = delay;
    }

    pub fn keep_last_frame(&self, flag: bool) {
        self.inner.config.borrow_mut().keep_last_frame = flag;
    }

    pub fn set_trace_mode(&self, flag: bool) {
        self.inner.config.borrow_mut().tracing = flag;
    }

    pub fn is_tracing(&self) -> bool {
        self.inner.config.borrow().tracing
    }

    /// Width given to frames that do not override it
    pub fn frame_width(&self) -> f64 {
        let surface_width = self.inner.surface.borrow().size().0;
        self.inner.config.borrow().resolve_frame_width(surface_width)
    }

    pub fn frame_height(&self) -> f64 {
        self.inner.config.borrow().frame_height
    }

    // ----- function registry -----

    /// Register a closure-bodied function
    pub fn define<F, Fut>(&self, info: FunctionInfo, body: F)
    where
        F: Fn(TraceSession) -> Fut + 'static,
        Fut: Future<Output = Result<Value>> + 'static,
    {
        self.define_function(ScriptedFunction::new(info, body));
    }

    /// Register a function implementing [`TracedFunction`]
    pub fn define_function(&self, function: impl TracedFunction + 'static) {
        debug!(function = function.info().name(), "function defined");
        self.inner.functions.borrow_mut().define(Rc::new(function));
    }

    pub fn function(&self, name: &str) -> Result<Rc<dyn TracedFunction>> {
        self.inner
            .functions
            .borrow()
            .get(name)
            .ok_or_else(|| TraceError::FunctionNotFound {
                name: name.to_string(),
            })
    }

    // ----- value stack -----

    /// Push an argument onto the value stack
    pub fn push(&self, value: Value) {
        self.inner.values.borrow_mut().push(value);
    }

    /// Pop the top value; `Value::Undefined` when the stack is empty
    pub fn pop(&self) -> Value {
        self.inner.values.borrow_mut().pop().unwrap_or_default()
    }

    /// Top value without popping it
    pub fn peek(&self) -> Value {
        self.inner
            .values
            .borrow()
            .last()
            .cloned()
            .unwrap_or_default()
    }

    // ----- call stack -----

    pub fn depth(&self) -> usize {
        self.inner.stack.borrow().depth()
    }

    /// Names of the live frames, outermost first
    pub fn frame_names(&self) -> Vec<String> {
        self.inner
            .stack
            .borrow()
            .frames()
            .iter()
            .map(|f| f.name().to_string())
            .collect()
    }

    pub fn current_frame_handle(&self) -> Result<FrameHandle> {
        self.inner
            .stack
            .borrow()
            .current_frame()
            .map(StackFrame::handle)
            .ok_or(TraceError::NoActiveFrame)
    }

    /// Run `f` against the current frame
    pub fn with_current_frame<R>(&self, f: impl FnOnce(&StackFrame) -> R) -> Result<R> {
        let stack = self.inner.stack.borrow();
        stack.current_frame().map(f).ok_or(TraceError::NoActiveFrame)
    }

    /// Run `f` against the caller of the current frame
    pub fn with_caller_frame<R>(&self, f: impl FnOnce(&StackFrame) -> R) -> Result<R> {
        let stack = self.inner.stack.borrow();
        stack.caller_frame().map(f).ok_or(TraceError::NoActiveFrame)
    }

    /// Run `f` against the current frame with mutable access to the surface
    pub fn with_current_frame_mut<R>(
        &self,
        f: impl FnOnce(&mut StackFrame, &mut dyn Surface) -> Result<R>,
    ) -> Result<R> {
        let mut stack = self.inner.stack.borrow_mut();
        let frame = stack.current_frame_mut().ok_or(TraceError::NoActiveFrame)?;
        let mut surface = self.inner.surface.borrow_mut();
        f(frame, &mut *surface)
    }

    /// Build a frame for `function` with its visual counterpart
    pub fn create_frame(&self, function: &FunctionInfo) -> StackFrame {
        let width = function.frame_width(self.frame_width());
        let height = function.frame_height(self.frame_height());
        let handle = self
            .inner
            .surface
            .borrow_mut()
            .create_visual_frame(function, width, height);
        StackFrame::new(function.clone(), handle, width, height)
    }

    /// Push a frame, positioning it by nesting level
    pub fn push_frame(&self, frame: StackFrame) {
        let config = self.config();
        let level = self.depth();
        let (x, y) = config.frame_origin(level);
        {
            let mut surface = self.inner.surface.borrow_mut();
            surface.set_position(frame.handle(), x, y);
            if config.tracing {
                surface.attach(frame.handle());
            }
        }
        debug!(function = frame.name(), level, "frame pushed");
        self.inner.stack.borrow_mut().push(frame);
    }

    /// Pop the top frame and take it off the surface
    pub fn pop_frame(&self) -> Option<StackFrame> {
        let frame = self.inner.stack.borrow_mut().pop()?;
        self.inner.surface.borrow_mut().detach(frame.handle());
        debug!(function = frame.name(), depth = self.depth(), "frame popped");
        Some(frame)
    }

    /// Whether trace points are currently executed without pausing
    pub fn skipping_call_trace(&self) -> bool {
        self.inner
            .call_base
            .get()
            .is_some_and(|base| self.depth() > base)
    }

    // ----- current-frame conveniences for traced bodies -----

    /// Declare a scalar variable in the current frame
    pub fn declare(&self, name: &str) -> Result<()> {
        self.add_variable(Variable::new(name))
    }

    pub fn add_variable(&self, variable: Variable) -> Result<()> {
        self.with_current_frame_mut(|frame, surface| frame.add_variable(variable, surface))
    }

    pub fn add_array(&self, array: ArrayVar, at: Option<(f64, f64)>) -> Result<()> {
        self.with_current_frame_mut(|frame, surface| frame.add_array(array, at, surface))
    }

    pub fn add_record(&self, record: Record, at: (f64, f64)) -> Result<()> {
        self.with_current_frame_mut(|frame, surface| frame.add_record(record, at, surface))
    }

    /// Value of a variable in the current frame
    pub fn get(&self, name: &str) -> Result<Value> {
        self.with_current_frame(|frame| frame.get(name).cloned())?
    }

    pub fn set(&self, name: &str, value: Value) -> Result<()> {
        self.with_current_frame_mut(|frame, surface| frame.set(name, value, surface))
    }

    pub fn set_image(&self, name: &str, image: Option<String>) -> Result<()> {
        self.with_current_frame_mut(|frame, surface| frame.set_image(name, image, surface))
    }

    pub fn array_get(&self, name: &str, index: usize) -> Result<Value> {
        self.with_current_frame(|frame| frame.array_get(name, index).cloned())?
    }

    pub fn array_set(&self, name: &str, index: usize, value: Value) -> Result<()> {
        self.with_current_frame_mut(|frame, surface| frame.array_set(name, index, value, surface))
    }

    pub fn record_get(&self, name: &str, attribute: &str) -> Result<Value> {
        self.with_current_frame(|frame| frame.record_get(name, attribute).cloned())?
    }

    pub fn record_set(&self, name: &str, attribute: &str, value: Value) -> Result<()> {
        self.with_current_frame_mut(|frame, surface| {
            frame.record_set(name, attribute, value, surface)
        })
    }

    pub fn layout_variables(&self) -> Result<()> {
        self.with_current_frame_mut(|frame, surface| {
            frame.layout_variables(surface);
            Ok(())
        })
    }

    pub fn set_visible(&self, key: &str, flag: bool) -> Result<()> {
        self.with_current_frame_mut(|frame, surface| frame.set_visible(key, flag, surface))
    }

    /// Highlight the current frame's region tagged `key`, or clear the highlight
    pub fn highlight(&self, key: Option<&str>) -> Result<()> {
        let stack = self.inner.stack.borrow();
        let frame = stack.current_frame().ok_or(TraceError::NoActiveFrame)?;
        let mut active = self.inner.highlight.borrow_mut();
        let mut surface = self.inner.surface.borrow_mut();
        frame.highlight(key, &mut *active, &mut *surface)
    }

    /// Region currently highlighted, if any
    pub fn active_highlight(&self) -> Option<RegionRef> {
        *self.inner.highlight.borrow()
    }

    /// Show `text` under the current frame's region tagged `key`
    pub fn add_value_tag(&self, text: &str, key: &str) -> Result<Option<TagHandle>> {
        self.with_current_frame_mut(|frame, surface| frame.add_value_tag(text, key, surface))
    }

    pub fn remove_value_tag(&self, key: &str) -> Result<bool> {
        self.with_current_frame_mut(|frame, surface| Ok(frame.remove_value_tag(key, surface)))
    }

    /// Tag a frame that may no longer be on top of the stack
    pub(crate) fn tag_frame(&self, handle: FrameHandle, text: &str, key: &str) -> Result<()> {
        let mut stack = self.inner.stack.borrow_mut();
        let Some(frame) = stack.find_mut(handle) else {
            return Ok(());
        };
        let mut surface = self.inner.surface.borrow_mut();
        frame.add_value_tag(text, key, &mut *surface)?;
        Ok(())
    }

    // ----- invocation -----

    /// Call the named function with the given arguments
    ///
    /// Arguments are pushed onto the value stack for the body to pop. Nested
    /// frames fly in before the body starts unless the call is being skipped;
    /// the exit animation is started but not awaited, so the frame leaves the
    /// stack immediately.
    pub fn call<'a>(&'a self, name: &'a str, args: Vec<Value>) -> LocalBoxFuture<'a, Result<Value>> {
        async move {
            for arg in args {
                self.push(arg);
            }
            let function = self.function(name)?;
            let frame = function.create_frame(self)?;
            let handle = frame.handle();
            self.push_frame(frame);

            if self.depth() > 1 && !self.skipping_call_trace() && self.is_tracing() {
                Animation::fly_in(handle).run(self.surface()).await;
            }

            let value = function.run(self).await?;

            if self.depth() > 1 || !self.config().keep_last_frame {
                if !self.skipping_call_trace() && self.is_tracing() {
                    Animation::faded_zoom_out(handle).spawn(self.surface());
                }
                self.pop_frame();
            } else if let Some(frame) = self.inner.stack.borrow_mut().current_frame_mut() {
                frame.mark_kept();
            }

            if self.is_tracing() && self.depth() > 0 {
                self.highlight(None)?;
            }
            debug!(function = name, %value, "call returned");
            Ok(value)
        }
        .boxed_local()
    }

    // ----- entry point -----

    /// Set the host program started by [`start`](Self::start) and every reset
    pub fn set_entry_point<F, Fut>(&self, entry: F)
    where
        F: Fn(TraceSession) -> Fut + 'static,
        Fut: Future<Output = Result<Value>> + 'static,
    {
        *self.inner.entry.borrow_mut() = Some(Rc::new(move |session| entry(session).boxed_local()));
    }

    /// Use a single call of `name` with `args` as the entry point
    pub fn set_entry_call(&self, name: impl Into<String>, args: Vec<Value>) {
        let name: String = name.into();
        let name: Rc<str> = Rc::from(name);
        self.set_entry_point(move |session| {
            let name = Rc::clone(&name);
            let args = args.clone();
            async move { session.call(&name, args).await }
        });
    }

    /// Spawn the entry point on the current `LocalSet`
    pub fn start(&self) {
        let Some(entry) = self.inner.entry.borrow().clone() else {
            warn!(session = self.title(), "no entry point defined");
            return;
        };
        *self.inner.outcome.borrow_mut() = None;
        let session = self.clone();
        let task = tokio::task::spawn_local(async move {
            let outcome = entry(session.clone()).await;
            match &outcome {
                Ok(value) => info!(session = session.title(), %value, "trace finished"),
                Err(err) => error!(session = session.title(), %err, "trace failed"),
            }
            *session.inner.outcome.borrow_mut() = Some(outcome);
        });
        if let Some(previous) = self.inner.entry_task.borrow_mut().replace(task) {
            previous.abort();
        }
    }

    /// Result of the last completed entry run
    pub fn outcome(&self) -> Option<Result<Value>> {
        self.inner.outcome.borrow().clone()
    }

    /// Whether the entry point has returned or its task has died
    pub fn is_finished(&self) -> bool {
        self.inner.outcome.borrow().is_some()
            || self
                .inner
                .entry_task
                .borrow()
                .as_ref()
                .is_some_and(|task| task.is_finished())
    }
}
