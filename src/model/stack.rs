//! Call stack of live frames
//!
//! Strictly LIFO: frames are pushed when an invocation begins and popped
//! when it completes. Positioning and surface attachment happen in the
//! session, which knows the configured per-level offsets.

use super::frame::StackFrame;
use crate::surface::FrameHandle;

/// The call stack
#[derive(Debug, Clone, Default)]
pub struct CallStack {
    frames: Vec<StackFrame>,
}

impl CallStack {
    pub fn new() -> Self {
        CallStack { frames: Vec::new() }
    }

    /// Push a frame and return its level (0 = outermost)
    pub fn push(&mut self, frame: StackFrame) -> usize {
        self.frames.push(frame);
        self.frames.len() - 1
    }

    /// Pop the top frame
    pub fn pop(&mut self) -> Option<StackFrame> {
        self.frames.pop()
    }

    /// Get the current (top) frame
    pub fn current_frame(&self) -> Option<&StackFrame> {
        self.frames.last()
    }

    /// Get a mutable reference to the current frame
    pub fn current_frame_mut(&mut self) -> Option<&mut StackFrame> {
        self.frames.last_mut()
    }

    /// The frame that called the current one
    pub fn caller_frame(&self) -> Option<&StackFrame> {
        self.frames.len().checked_sub(2).map(|i| &self.frames[i])
    }

    /// Find a live frame by its surface handle
    pub fn find_mut(&mut self, handle: FrameHandle) -> Option<&mut StackFrame> {
        self.frames.iter_mut().rev().find(|f| f.handle() == handle)
    }

    /// All frames, outermost first
    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    /// Get the depth of the call stack
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Remove every frame, returning them outermost first
    pub fn clear(&mut self) -> Vec<StackFrame> {
        std::mem::take(&mut self.frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::function::FunctionInfo;

    fn frame(name: &str, id: u64) -> StackFrame {
        StackFrame::new(FunctionInfo::new(name, ""), FrameHandle(id), 10.0, 5.0)
    }

    #[test]
    fn test_lifo_order() {
        let mut stack = CallStack::new();
        assert_eq!(stack.push(frame("main", 1)), 0);
        assert_eq!(stack.push(frame("f", 2)), 1);
        assert_eq!(stack.depth(), 2);

        assert_eq!(stack.pop().unwrap().name(), "f");
        assert_eq!(stack.current_frame().unwrap().name(), "main");
        assert_eq!(stack.pop().unwrap().name(), "main");
        assert!(stack.pop().is_none());
    }

    #[test]
    fn test_caller_frame() {
        let mut stack = CallStack::new();
        stack.push(frame("main", 1));
        assert!(stack.caller_frame().is_none());

        stack.push(frame("f", 2));
        assert_eq!(stack.caller_frame().unwrap().name(), "main");
        assert_eq!(stack.current_frame().unwrap().name(), "f");
    }

    #[test]
    fn test_find_and_clear() {
        let mut stack = CallStack::new();
        stack.push(frame("main", 1));
        stack.push(frame("f", 2));
        assert_eq!(stack.find_mut(FrameHandle(1)).unwrap().name(), "main");
        assert!(stack.find_mut(FrameHandle(9)).is_none());

        let frames = stack.clear();
        assert_eq!(frames.len(), 2);
        assert!(stack.is_empty());
    }
}
