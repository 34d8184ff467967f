//! Frame animations
//!
//! Every animation is a fixed-step simulation: the duration is divided into
//! [`TIME_STEP`] quanta, and after each quantum one linear increment of the
//! animated property is applied to the target frame. The kinds differ only
//! in that increment:
//!
//! | kind             | per step `i` of `n`                         |
//! |------------------|---------------------------------------------|
//! | `Move`           | translate by `(dx / n, dy / n)`             |
//! | `FlyIn`          | translate back from the bottom-right corner |
//! | `FadeOut`        | opacity `(n - i) / n`                       |
//! | `FadedZoomOut`   | opacity and scale `(n - i) / n`             |
//!
//! Animations run on the current `LocalSet`. Await [`Animation::run`] to
//! sequence after completion, or use [`Animation::spawn`] to let it play
//! alongside whatever comes next.

use crate::surface::{FrameHandle, SharedSurface, Surface};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::trace;

/// Time between two increments
pub const TIME_STEP: Duration = Duration::from_millis(20);

/// Duration used when none is given
pub const DEFAULT_DURATION: Duration = Duration::from_millis(500);

/// The property an animation changes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationKind {
    Move { dx: f64, dy: f64 },
    /// Slide in from the bottom-right edge of the surface
    FlyIn,
    FadeOut,
    FadedZoomOut,
}

/// One animation of one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    target: FrameHandle,
    kind: AnimationKind,
    duration: Duration,
}

/// Per-step update resolved when the animation starts
enum Increment {
    Translate { dx: f64, dy: f64 },
    Fade,
    FadeAndShrink,
}

impl Increment {
    fn apply(&self, surface: &mut dyn Surface, target: FrameHandle, step: usize, steps: usize) {
        let remaining = (steps - step) as f64 / steps as f64;
        match *self {
            Increment::Translate { dx, dy } => {
                surface.move_by(target, dx / steps as f64, dy / steps as f64)
            }
            Increment::Fade => surface.set_opacity(target, remaining),
            Increment::FadeAndShrink => {
                surface.set_opacity(target, remaining);
                surface.set_scale(target, remaining);
            }
        }
    }
}

impl Animation {
    pub fn new(target: FrameHandle, kind: AnimationKind) -> Self {
        Animation {
            target,
            kind,
            duration: DEFAULT_DURATION,
        }
    }

    pub fn moving(target: FrameHandle, dx: f64, dy: f64) -> Self {
        Animation::new(target, AnimationKind::Move { dx, dy })
    }

    pub fn fly_in(target: FrameHandle) -> Self {
        Animation::new(target, AnimationKind::FlyIn)
    }

    pub fn fade_out(target: FrameHandle) -> Self {
        Animation::new(target, AnimationKind::FadeOut)
    }

    pub fn faded_zoom_out(target: FrameHandle) -> Self {
        Animation::new(target, AnimationKind::FadedZoomOut)
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn target(&self) -> FrameHandle {
        self.target
    }

    pub fn kind(&self) -> AnimationKind {
        self.kind
    }

    /// Number of increments the animation applies
    pub fn steps(&self) -> usize {
        (self.duration.as_millis() / TIME_STEP.as_millis()) as usize
    }

    /// Put the target in its starting state and resolve the increment
    fn prepare(&self, surface: &mut dyn Surface) -> Increment {
        match self.kind {
            AnimationKind::Move { dx, dy } => Increment::Translate { dx, dy },
            AnimationKind::FlyIn => {
                let (width, height) = surface.size();
                let (x, y) = surface.position(self.target).unwrap_or((width, height));
                let (x_shift, y_shift) = (width - x, height - y);
                surface.move_by(self.target, x_shift, y_shift);
                Increment::Translate {
                    dx: -x_shift,
                    dy: -y_shift,
                }
            }
            AnimationKind::FadeOut => Increment::Fade,
            AnimationKind::FadedZoomOut => Increment::FadeAndShrink,
        }
    }

    /// Play the animation to completion; returns the number of increments
    ///
    /// A duration shorter than one quantum applies the final state at once.
    pub async fn run(self, surface: SharedSurface) -> usize {
        let steps = self.steps();
        let increment = self.prepare(&mut *surface.borrow_mut());
        trace!(target_frame = ?self.target, kind = ?self.kind, steps, "animation started");

        if steps == 0 {
            increment.apply(&mut *surface.borrow_mut(), self.target, 1, 1);
            return 0;
        }
        for step in 1..=steps {
            tokio::time::sleep(TIME_STEP).await;
            increment.apply(&mut *surface.borrow_mut(), self.target, step, steps);
        }
        steps
    }

    /// Play the animation without waiting for it
    pub fn spawn(self, surface: SharedSurface) -> JoinHandle<usize> {
        tokio::task::spawn_local(self.run(surface))
    }
}
