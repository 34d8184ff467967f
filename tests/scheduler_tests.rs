// Step scheduling: queue order, step over, run and reset

mod common;

use calltrace::model::value::Value;
use calltrace::trace::{Control, TraceSession};
use calltrace::TraceError;
use common::{highlighted, info, session, settle};
use std::cell::RefCell;
use std::rc::Rc;
use tokio::task::LocalSet;

/// `f` pauses at `before`, calls `g` at `call`, then pauses at `after`;
/// `g` pauses at `p1`, `p2`, `p3` and returns 7
fn define_nested(session: &TraceSession) {
    session.define(
        info("g", "def g():\n    [[p1|a]]\n    [[p2|b]]\n    [[p3|return 7]]"),
        |s| async move {
            s.pause("p1").await?;
            s.pause("p2").await?;
            s.pause("p3").await?;
            Ok(Value::Int(7))
        },
    );
    session.define(
        info("f", "def f():\n    [[before|x = 1]]\n    [[call|y = g()]]\n    [[after|return y]]"),
        |s| async move {
            s.pause("before").await?;
            let y = s
                .request_async_step("call", |s| async move { s.call("g", vec![]).await })
                .await?;
            s.pause("after").await?;
            Ok(y)
        },
    );
    session.set_entry_call("f", vec![]);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_simple_trace() {
    LocalSet::new()
        .run_until(async {
            let (session, canvas) = session();
            session.define(
                info("f", "def f():\n    [[a|x = 1]]\n    [[b|return 42]]"),
                |s| async move {
                    s.pause("a").await?;
                    s.pause("b").await?;
                    Ok(Value::Int(42))
                },
            );
            session.set_entry_call("f", vec![]);
            session.start();
            settle().await;

            assert_eq!(session.depth(), 1);
            assert_eq!(session.pending_steps(), 1);
            assert_eq!(highlighted(&canvas).as_deref(), Some("a"));

            assert!(session.step_in());
            settle().await;
            assert_eq!(highlighted(&canvas).as_deref(), Some("b"));

            assert!(session.step_in());
            settle().await;
            assert_eq!(session.depth(), 0);
            assert_eq!(session.outcome(), Some(Ok(Value::Int(42))));
            assert_eq!(canvas.borrow().live_frames(), 0);

            // Nothing left to consume
            assert!(!session.step_in());
        })
        .await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_steps_consumed_in_request_order() {
    LocalSet::new()
        .run_until(async {
            let (session, _canvas) = session();
            let log = Rc::new(RefCell::new(Vec::new()));
            let body_log = Rc::clone(&log);
            session.define(
                info("f", "[[a|a]] [[b|b]] [[c|c]]"),
                move |s| {
                    let log = Rc::clone(&body_log);
                    async move {
                        let steps: Vec<_> = ["a", "b", "c"]
                            .into_iter()
                            .map(|key| {
                                let log = Rc::clone(&log);
                                s.request_step(key, move |_| {
                                    log.borrow_mut().push(key);
                                })
                            })
                            .collect();
                        for step in steps {
                            step.await?;
                        }
                        Ok(Value::Undefined)
                    }
                },
            );
            session.set_entry_call("f", vec![]);
            session.start();
            settle().await;

            assert_eq!(session.pending_steps(), 3);
            assert!(session.step_in());
            assert!(session.step_in());
            assert_eq!(*log.borrow(), vec!["a", "b"]);
            assert!(session.step_in());
            assert!(!session.step_in());
            assert_eq!(*log.borrow(), vec!["a", "b", "c"]);

            settle().await;
            assert_eq!(session.outcome(), Some(Ok(Value::Undefined)));
        })
        .await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_step_in_enters_nested_call() {
    LocalSet::new()
        .run_until(async {
            let (session, canvas) = session();
            define_nested(&session);
            session.start();
            settle().await;

            session.step_in(); // before
            settle().await;
            assert_eq!(highlighted(&canvas).as_deref(), Some("call"));

            session.step_in(); // call
            settle().await;
            assert_eq!(session.depth(), 2);
            assert_eq!(session.frame_names(), vec!["f", "g"]);
            assert_eq!(highlighted(&canvas).as_deref(), Some("p1"));

            // Each of g's points takes its own step
            for expected in ["p2", "p3"] {
                session.step_in();
                settle().await;
                assert_eq!(highlighted(&canvas).as_deref(), Some(expected));
                assert_eq!(session.depth(), 2);
            }

            session.step_in(); // p3
            settle().await;
            assert_eq!(session.depth(), 1);
            assert_eq!(highlighted(&canvas).as_deref(), Some("after"));
        })
        .await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_step_over_skips_nested_call() {
    LocalSet::new()
        .run_until(async {
            let (session, canvas) = session();
            define_nested(&session);
            session.start();
            settle().await;

            session.step_in(); // before
            settle().await;
            assert_eq!(highlighted(&canvas).as_deref(), Some("call"));

            assert!(session.step_over());
            assert_eq!(session.skip_marker(), Some(1));
            settle().await;

            // All three of g's points ran without pausing
            assert_eq!(session.depth(), 1);
            assert_eq!(session.pending_steps(), 1);
            assert_eq!(highlighted(&canvas).as_deref(), Some("after"));
            assert_eq!(session.skip_marker(), None);

            session.step_in();
            settle().await;
            assert_eq!(session.outcome(), Some(Ok(Value::Int(7))));
        })
        .await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_step_over_without_call_is_a_step() {
    LocalSet::new()
        .run_until(async {
            let (session, canvas) = session();
            define_nested(&session);
            session.start();
            settle().await;

            session.step_over(); // before
            settle().await;
            assert_eq!(highlighted(&canvas).as_deref(), Some("call"));
            assert_eq!(session.skip_marker(), None);
        })
        .await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_at_most_one_highlight() {
    LocalSet::new()
        .run_until(async {
            let (session, canvas) = session();
            define_nested(&session);
            session.start();
            settle().await;

            while session.outcome().is_none() {
                assert!(canvas.borrow().highlighted_regions().len() <= 1);
                session.step_in();
                settle().await;
            }
            assert!(canvas.borrow().highlighted_regions().is_empty());
        })
        .await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_reset_clears_state() {
    LocalSet::new()
        .run_until(async {
            let (session, canvas) = session();
            define_nested(&session);
            session.start();
            settle().await;
            session.step_in();
            settle().await;
            session.step_in();
            settle().await;
            assert_eq!(session.depth(), 2);
            session.push(Value::Int(1));

            session.run();
            assert!(session.is_running());
            session.reset();

            assert_eq!(session.depth(), 0);
            assert_eq!(session.pending_steps(), 0);
            assert_eq!(session.skip_marker(), None);
            assert_eq!(session.peek(), Value::Undefined);
            assert!(!session.is_running());
            assert_eq!(canvas.borrow().live_frames(), 0);
            assert_eq!(session.active_highlight(), None);

            // A second reset leaves the same state behind
            session.reset();
            assert_eq!(session.depth(), 0);
            assert_eq!(session.pending_steps(), 0);

            // The entry point starts over
            settle().await;
            assert_eq!(session.depth(), 1);
            assert_eq!(session.pending_steps(), 1);
            assert_eq!(highlighted(&canvas).as_deref(), Some("before"));
        })
        .await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_run_to_completion() {
    LocalSet::new()
        .run_until(async {
            let (session, _canvas) = session();
            define_nested(&session);
            session.start();
            settle().await;

            session.control(Control::Run);
            assert!(!session.is_tracing());
            for _ in 0..20 {
                if session.outcome().is_some() {
                    break;
                }
                settle().await;
            }
            assert_eq!(session.outcome(), Some(Ok(Value::Int(7))));
            settle().await;
            assert!(!session.is_running());
        })
        .await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_step_stops_run() {
    LocalSet::new()
        .run_until(async {
            let (session, _canvas) = session();
            define_nested(&session);
            session.start();
            settle().await;

            session.control(Control::Run);
            assert!(session.is_running());
            session.control(Control::StepIn);
            assert!(!session.is_running());
            assert!(session.is_tracing());
        })
        .await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_ambiguous_tag_fails_step() {
    LocalSet::new()
        .run_until(async {
            let (session, _canvas) = session();
            session.define(
                info("f", "[[a|x]] [[a|y]]"),
                |s| async move {
                    s.pause("a").await?;
                    Ok(Value::Undefined)
                },
            );
            session.set_entry_call("f", vec![]);
            session.start();
            settle().await;

            assert_eq!(session.pending_steps(), 0);
            assert_eq!(
                session.outcome(),
                Some(Err(TraceError::AmbiguousTag {
                    tag: "a".to_string(),
                    function: "f".to_string()
                }))
            );
        })
        .await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_untraced_steps_still_pause() {
    LocalSet::new()
        .run_until(async {
            let (session, canvas) = session();
            session.set_trace_mode(false);
            define_nested(&session);
            session.start();
            settle().await;

            assert_eq!(session.pending_steps(), 1);
            assert_eq!(highlighted(&canvas), None);
            assert_eq!(canvas.borrow().attached_frames().count(), 0);
        })
        .await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_reset_interrupts_pending_step() {
    LocalSet::new()
        .run_until(async {
            let (session, _canvas) = session();
            let step = session.pause("a");
            assert!(!step.is_ready());
            assert_eq!(session.pending_steps(), 1);

            session.reset();
            assert_eq!(session.pending_steps(), 0);
            assert_eq!(
                step.await,
                Err(TraceError::Interrupted {
                    key: "a".to_string()
                })
            );
        })
        .await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_failed_highlight_clears_skip_marker() {
    LocalSet::new()
        .run_until(async {
            let (session, _canvas) = session();
            session.define(
                info("f", "[[a|x]] [[b|y]] [[b|z]]"),
                |s| async move {
                    s.pause("a").await?;
                    s.pause("b").await?;
                    Ok(Value::Undefined)
                },
            );
            session.set_entry_call("f", vec![]);
            session.start();
            settle().await;

            assert!(session.step_over());
            assert_eq!(session.skip_marker(), Some(1));
            settle().await;

            assert!(matches!(
                session.outcome(),
                Some(Err(TraceError::AmbiguousTag { .. }))
            ));
            assert_eq!(session.skip_marker(), None);
        })
        .await;
}

async fn pause_then_panic(s: TraceSession) -> calltrace::Result<Value> {
    s.pause("a").await?;
    panic!("body died");
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_run_stops_when_entry_task_dies() {
    LocalSet::new()
        .run_until(async {
            let (session, _canvas) = session();
            session.define(info("f", "[[a|x]]"), pause_then_panic);
            session.set_entry_call("f", vec![]);
            session.start();
            settle().await;
            assert!(!session.is_finished());

            session.control(Control::Run);
            settle().await;

            assert_eq!(session.outcome(), None);
            assert!(session.is_finished());
            assert!(!session.is_running());
            assert_eq!(session.depth(), 1);
        })
        .await;
}
