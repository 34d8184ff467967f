//! Step scheduling
//!
//! Traced bodies call [`TraceSession::request_step`] at every point where
//! execution should be observable. Outside skip mode the step's body is
//! wrapped in a continuation and queued, and the caller gets a
//! [`StepFuture`] that resolves once a step command (`step_in`, `step_over`
//! or the run timer) dequeues and runs it. The queue is global to the
//! session and strictly FIFO, so steps from nested frames are consumed in
//! the order they were requested.
//!
//! # Skip mode
//!
//! `step_over` records the current depth as the call base before stepping.
//! While the stack is deeper than the base, step requests run their body
//! inline and never pause. The first pause actually taken clears the base,
//! so only calls made during the stepped-over step are skipped.

use super::session::TraceSession;
use crate::error::{Result, TraceError};
use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tracing::{debug, info, trace};

/// Presenter-facing triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Consume one step, with tracing on
    StepIn,
    /// Consume one step and skip the calls it makes, with tracing on
    StepOver,
    /// Step on a timer until the trace ends, with tracing off
    Run,
    /// Start over from the entry point, with tracing on
    Reset,
}

enum StepState<T> {
    Ready(Option<Result<T>>),
    Waiting(oneshot::Receiver<T>),
}

/// Result of a step request
///
/// Resolves with the step body's result once the step is consumed, or
/// immediately when the step was skipped. A step discarded by a reset
/// resolves with [`TraceError::Interrupted`].
pub struct StepFuture<T> {
    key: String,
    state: StepState<T>,
}

// The receiver is Unpin and the ready value is never pinned in place.
impl<T> Unpin for StepFuture<T> {}

impl<T> StepFuture<T> {
    fn ready(key: &str, result: Result<T>) -> Self {
        StepFuture {
            key: key.to_string(),
            state: StepState::Ready(Some(result)),
        }
    }

    fn waiting(key: &str, receiver: oneshot::Receiver<T>) -> Self {
        StepFuture {
            key: key.to_string(),
            state: StepState::Waiting(receiver),
        }
    }

    /// Key of the trace point this step belongs to
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether the step completed without pausing
    pub fn is_ready(&self) -> bool {
        matches!(self.state, StepState::Ready(_))
    }
}

impl<T> Future for StepFuture<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.state {
            StepState::Ready(result) => Poll::Ready(result.take().unwrap_or_else(|| {
                Err(TraceError::Interrupted {
                    key: this.key.clone(),
                })
            })),
            StepState::Waiting(receiver) => Pin::new(receiver).poll(cx).map(|received| {
                received.map_err(|_| TraceError::Interrupted {
                    key: this.key.clone(),
                })
            }),
        }
    }
}

impl TraceSession {
    /// Request a step at the trace point `key`
    ///
    /// In skip mode `body` runs now and the returned future is already
    /// complete. Otherwise the region tagged `key` is highlighted (when
    /// tracing), skip mode ends, and `body` is queued until a step command
    /// consumes it.
    pub fn request_step<T, F>(&self, key: &str, body: F) -> StepFuture<T>
    where
        T: 'static,
        F: FnOnce(&TraceSession) -> T + 'static,
    {
        if self.skipping_call_trace() {
            trace!(key, depth = self.depth(), "step skipped");
            return StepFuture::ready(key, Ok(body(self)));
        }

        self.inner.call_base.set(None);
        if self.is_tracing() && self.depth() > 0 {
            if let Err(err) = self.highlight(Some(key)) {
                return StepFuture::ready(key, Err(err));
            }
        }

        let (sender, receiver) = oneshot::channel();
        self.inner
            .queue
            .borrow_mut()
            .push_back(Box::new(move |session: &TraceSession| {
                // The waiting body may have been dropped by a reset.
                let _ = sender.send(body(session));
            }));
        trace!(key, pending = self.pending_steps(), "step queued");
        StepFuture::waiting(key, receiver)
    }

    /// Pause at `key` without doing anything when resumed
    pub fn pause(&self, key: &str) -> StepFuture<()> {
        self.request_step(key, |_| ())
    }

    /// Request a step, then show its result under the region tagged `key`
    ///
    /// The tag goes on the frame that was current when the step was
    /// requested, even if the body changed the stack.
    pub async fn request_step_and_tag<T, F>(&self, key: &str, body: F) -> Result<T>
    where
        T: Display + 'static,
        F: FnOnce(&TraceSession) -> T + 'static,
    {
        let frame = self.current_frame_handle().ok();
        let value = self.request_step(key, body).await?;
        if let Some(frame) = frame {
            self.tag_frame(frame, &value.to_string(), key)?;
        }
        Ok(value)
    }

    /// Request a step whose body is asynchronous, typically a nested call
    ///
    /// The future is built when the step is consumed and awaited right
    /// after; in skip mode both happen immediately.
    pub async fn request_async_step<T, F, Fut>(&self, key: &str, body: F) -> Result<T>
    where
        T: 'static,
        F: FnOnce(TraceSession) -> Fut + 'static,
        Fut: Future<Output = Result<T>> + 'static,
    {
        let pending = self
            .request_step(key, move |session| body(session.clone()))
            .await?;
        pending.await
    }

    /// [`request_async_step`](Self::request_async_step), then tag the result
    pub async fn request_async_step_and_tag<T, F, Fut>(&self, key: &str, body: F) -> Result<T>
    where
        T: Display + 'static,
        F: FnOnce(TraceSession) -> Fut + 'static,
        Fut: Future<Output = Result<T>> + 'static,
    {
        let frame = self.current_frame_handle().ok();
        let value = self.request_async_step(key, body).await?;
        if let Some(frame) = frame {
            self.tag_frame(frame, &value.to_string(), key)?;
        }
        Ok(value)
    }

    /// Run the oldest pending step; returns false when nothing was queued
    pub fn step_in(&self) -> bool {
        let next = self.inner.queue.borrow_mut().pop_front();
        match next {
            Some(continuation) => {
                trace!(depth = self.depth(), "step consumed");
                continuation(self);
                true
            }
            None => false,
        }
    }

    /// Step, skipping every pause inside calls the step makes
    pub fn step_over(&self) -> bool {
        let base = self.depth();
        self.inner.call_base.set(Some(base));
        debug!(base, "stepping over");
        self.step_in()
    }

    /// Step now, then keep stepping every `run_delay` until the trace ends
    pub fn run(&self) {
        self.stop();
        self.step_in();

        let session = self.clone();
        let timer = tokio::task::spawn_local(async move {
            loop {
                let delay = session.config().run_delay;
                tokio::time::sleep(delay).await;
                if session.depth() == 0 || session.is_finished() {
                    break;
                }
                session.step_in();
            }
            debug!(session = session.title(), "run finished");
        });
        *self.inner.run_timer.borrow_mut() = Some(timer);
        debug!(session = self.title(), "run started");
    }

    /// Cancel the run timer; returns whether it was still running
    pub fn stop(&self) -> bool {
        let Some(timer) = self.inner.run_timer.borrow_mut().take() else {
            return false;
        };
        let running = !timer.is_finished();
        timer.abort();
        if running {
            debug!(session = self.title(), "run stopped");
        }
        running
    }

    pub fn is_running(&self) -> bool {
        self.inner
            .run_timer
            .borrow()
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    /// Discard all execution state and start the entry point again
    pub fn reset(&self) {
        self.stop();
        if let Some(task) = self.inner.entry_task.borrow_mut().take() {
            task.abort();
        }

        let discarded = std::mem::take(&mut *self.inner.queue.borrow_mut());
        let frames = self.inner.stack.borrow_mut().clear();
        self.inner.values.borrow_mut().clear();
        self.inner.call_base.set(None);
        *self.inner.highlight.borrow_mut() = None;
        *self.inner.outcome.borrow_mut() = None;
        self.inner.surface.borrow_mut().clear();
        info!(
            session = self.title(),
            steps = discarded.len(),
            frames = frames.len(),
            "trace reset"
        );
        drop(discarded);

        self.start();
    }

    /// Number of queued steps
    pub fn pending_steps(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    /// Depth recorded by the last step-over, if skip mode is armed
    pub fn skip_marker(&self) -> Option<usize> {
        self.inner.call_base.get()
    }

    /// Handle a presenter trigger
    pub fn control(&self, control: Control) {
        debug!(?control, "control");
        match control {
            Control::StepIn => {
                self.stop();
                self.set_trace_mode(true);
                self.step_in();
            }
            Control::StepOver => {
                self.stop();
                self.set_trace_mode(true);
                self.step_over();
            }
            Control::Run => {
                self.set_trace_mode(false);
                self.run();
            }
            Control::Reset => {
                self.set_trace_mode(true);
                self.reset();
            }
        }
    }
}
