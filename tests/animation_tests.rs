// Fixed-step animations against the in-memory canvas

use calltrace::animation::{Animation, TIME_STEP};
use calltrace::model::function::FunctionInfo;
use calltrace::surface::{Canvas, FrameHandle, SharedSurface, Surface};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tokio::task::LocalSet;
use tokio::time::Instant;

fn canvas_with_frame() -> (Rc<RefCell<Canvas>>, SharedSurface, FrameHandle) {
    let canvas = Rc::new(RefCell::new(Canvas::new(80.0, 24.0)));
    let handle = {
        let mut c = canvas.borrow_mut();
        let handle = c.create_visual_frame(&FunctionInfo::new("f", ""), 20.0, 8.0);
        c.attach(handle);
        c.set_position(handle, 5.0, 3.0);
        handle
    };
    let surface: SharedSurface = canvas.clone();
    (canvas, surface, handle)
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_fly_in_takes_25_steps() {
    let (canvas, surface, handle) = canvas_with_frame();
    let animation = Animation::fly_in(handle);
    assert_eq!(animation.steps(), 25);

    let start = Instant::now();
    assert_eq!(animation.run(surface).await, 25);
    assert!(start.elapsed() >= Duration::from_millis(500));

    let (x, y) = canvas.borrow().position(handle).unwrap();
    assert!((x - 5.0).abs() < 1e-9);
    assert!((y - 3.0).abs() < 1e-9);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_fly_in_starts_off_screen() {
    LocalSet::new()
        .run_until(async {
            let (canvas, surface, handle) = canvas_with_frame();
            let task = Animation::fly_in(handle).spawn(surface);

            // Before the first quantum the frame sits at the bottom-right edge
            tokio::task::yield_now().await;
            assert_eq!(canvas.borrow().position(handle), Some((80.0, 24.0)));

            assert_eq!(task.await.unwrap(), 25);
        })
        .await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_move_by_offset() {
    let (canvas, surface, handle) = canvas_with_frame();
    let steps = Animation::moving(handle, 10.0, -2.0)
        .with_duration(Duration::from_millis(100))
        .run(surface)
        .await;
    assert_eq!(steps, 5);

    let (x, y) = canvas.borrow().position(handle).unwrap();
    assert!((x - 15.0).abs() < 1e-9);
    assert!((y - 1.0).abs() < 1e-9);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_fade_out_reaches_zero() {
    let (canvas, surface, handle) = canvas_with_frame();
    Animation::fade_out(handle).run(surface).await;

    let canvas = canvas.borrow();
    let frame = canvas.frame(handle).unwrap();
    assert_eq!(frame.opacity, 0.0);
    assert_eq!(frame.scale, 1.0);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_faded_zoom_out_midway() {
    LocalSet::new()
        .run_until(async {
            let (canvas, surface, handle) = canvas_with_frame();
            let task = Animation::faded_zoom_out(handle)
                .with_duration(TIME_STEP * 4)
                .spawn(surface);

            // Two of four quanta, plus a little slack for the timer
            tokio::time::sleep(TIME_STEP * 2 + Duration::from_millis(5)).await;
            {
                let canvas = canvas.borrow();
                let frame = canvas.frame(handle).unwrap();
                assert_eq!(frame.opacity, 0.5);
                assert_eq!(frame.scale, 0.5);
            }

            assert_eq!(task.await.unwrap(), 4);
            let canvas = canvas.borrow();
            let frame = canvas.frame(handle).unwrap();
            assert_eq!((frame.opacity, frame.scale), (0.0, 0.0));
        })
        .await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_zero_steps_apply_final_state() {
    let (canvas, surface, handle) = canvas_with_frame();
    let steps = Animation::faded_zoom_out(handle)
        .with_duration(Duration::from_millis(10))
        .run(surface)
        .await;
    assert_eq!(steps, 0);

    let canvas = canvas.borrow();
    let frame = canvas.frame(handle).unwrap();
    assert_eq!((frame.opacity, frame.scale), (0.0, 0.0));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_released_frame_is_ignored() {
    let (canvas, surface, handle) = canvas_with_frame();
    canvas.borrow_mut().detach(handle);
    assert_eq!(Animation::fade_out(handle).run(surface).await, 25);
    assert!(canvas.borrow().frame(handle).is_none());
}
