// Invocation protocol: lookup, value stack, frames and value tags

mod common;

use calltrace::config::TraceConfig;
use calltrace::model::function::FunctionInfo;
use calltrace::model::value::Value;
use calltrace::trace::TracedFunction;
use calltrace::TraceError;
use common::{info, session, session_with, settle};
use tokio::task::LocalSet;

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_unknown_function() {
    LocalSet::new()
        .run_until(async {
            let (session, _canvas) = session();
            assert_eq!(
                session.call("nope", vec![]).await,
                Err(TraceError::FunctionNotFound {
                    name: "nope".to_string()
                })
            );
            assert_eq!(session.depth(), 0);
        })
        .await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_arguments_pass_through_value_stack() {
    LocalSet::new()
        .run_until(async {
            let (session, _canvas) = session();
            session.define(info("sub", "return a - b"), |s| async move {
                let b = s.pop().as_int().unwrap_or(0);
                let a = s.pop().as_int().unwrap_or(0);
                Ok(Value::Int(a - b))
            });

            let result = session
                .call("sub", vec![Value::Int(10), Value::Int(3)])
                .await;
            assert_eq!(result, Ok(Value::Int(7)));
            assert_eq!(session.pop(), Value::Undefined);
        })
        .await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_value_stack_peek_and_pop() {
    LocalSet::new()
        .run_until(async {
            let (session, _canvas) = session();
            session.push(Value::from("x"));
            session.push(Value::Int(2));
            assert_eq!(session.peek(), Value::Int(2));
            assert_eq!(session.pop(), Value::Int(2));
            assert_eq!(session.pop(), Value::from("x"));
            assert_eq!(session.pop(), Value::Undefined);
            assert_eq!(session.peek(), Value::Undefined);
        })
        .await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_missing_variable() {
    LocalSet::new()
        .run_until(async {
            let (session, _canvas) = session();
            session.define(info("f", "return x"), |s| async move { s.get("x") });
            assert_eq!(
                session.call("f", vec![]).await,
                Err(TraceError::NameNotFound {
                    name: "x".to_string()
                })
            );
        })
        .await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_frame_operations_need_a_frame() {
    LocalSet::new()
        .run_until(async {
            let (session, _canvas) = session();
            assert_eq!(session.declare("x"), Err(TraceError::NoActiveFrame));
            assert_eq!(session.current_frame_handle(), Err(TraceError::NoActiveFrame));
        })
        .await;
}

struct Bare(FunctionInfo);

impl TracedFunction for Bare {
    fn info(&self) -> &FunctionInfo {
        &self.0
    }
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_run_without_body() {
    LocalSet::new()
        .run_until(async {
            let (session, _canvas) = session();
            session.define_function(Bare(info("bare", "")));
            assert_eq!(
                session.call("bare", vec![]).await,
                Err(TraceError::UnimplementedOperation {
                    operation: "bare::run".to_string()
                })
            );
        })
        .await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_keep_last_frame() {
    LocalSet::new()
        .run_until(async {
            let (session, canvas) = session_with(TraceConfig::default().with_keep_last_frame(true));
            session.define(info("f", "[[a|return 1]]"), |s| async move {
                s.pause("a").await?;
                Ok(Value::Int(1))
            });
            session.set_entry_call("f", vec![]);
            session.start();
            settle().await;
            session.step_in();
            settle().await;

            assert_eq!(session.outcome(), Some(Ok(Value::Int(1))));
            assert_eq!(session.depth(), 1);
            assert_eq!(session.with_current_frame(|f| f.is_kept()), Ok(true));
            assert_eq!(canvas.borrow().attached_frames().count(), 1);
        })
        .await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_nested_frames_are_offset() {
    LocalSet::new()
        .run_until(async {
            let config = TraceConfig::default()
                .with_frame_deltas(5.0, 3.0)
                .with_max_depth(2);
            let (session, canvas) = session_with(config);
            session.define(info("g", "[[in|pass]]"), |s| async move {
                let caller = s.with_caller_frame(|f| f.name().to_string())?;
                s.pause("in").await?;
                Ok(Value::from(caller))
            });
            session.define(info("f", "[[call|g()]]"), |s| async move {
                s.request_async_step("call", |s| async move { s.call("g", vec![]).await })
                    .await
            });
            session.set_entry_call("f", vec![]);
            session.start();
            settle().await;
            session.step_in();
            settle().await;

            let canvas = canvas.borrow();
            let frames: Vec<_> = canvas.attached_frames().collect();
            assert_eq!(frames.len(), 2);
            assert_eq!((frames[0].x, frames[0].y), (1.0, 1.0));
            // The fly-in has brought g back to its slot
            assert!((frames[1].x - 6.0).abs() < 1e-9);
            assert!((frames[1].y - 4.0).abs() < 1e-9);
            // 80 - 2 margins - 2 borders - 2 levels * 5
            assert_eq!(frames[1].width, 66.0);
            drop(canvas);

            session.step_in();
            settle().await;
            assert_eq!(session.outcome(), Some(Ok(Value::from("f"))));
        })
        .await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_function_frame_size_override() {
    LocalSet::new()
        .run_until(async {
            let (session, canvas) = session();
            session.define(
                info("f", "[[a|pass]]")
                    .with_frame_width(30.0)
                    .with_frame_height(6.0),
                |s| async move {
                    s.pause("a").await?;
                    Ok(Value::Undefined)
                },
            );
            session.set_entry_call("f", vec![]);
            session.start();
            settle().await;

            let canvas = canvas.borrow();
            let frame = canvas.attached_frames().next().unwrap();
            assert_eq!((frame.width, frame.height), (30.0, 6.0));
        })
        .await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_step_result_is_tagged() {
    LocalSet::new()
        .run_until(async {
            let (session, canvas) = session();
            session.define(
                info("f", "x = [[sum|2 + 3]]\n[[done|return x]]"),
                |s| async move {
                    let x = s.request_step_and_tag("sum", |_| Value::Int(5)).await?;
                    s.pause("done").await?;
                    Ok(x)
                },
            );
            session.set_entry_call("f", vec![]);
            session.start();
            settle().await;
            session.step_in();
            settle().await;

            {
                let canvas = canvas.borrow();
                let frame = canvas.attached_frames().next().unwrap();
                assert_eq!(frame.tags.len(), 1);
                assert_eq!(frame.tags[0].text, "5");
                assert_eq!((frame.tags[0].line, frame.tags[0].column), (1, 4));
            }

            assert_eq!(session.remove_value_tag("sum"), Ok(true));
            assert_eq!(session.remove_value_tag("sum"), Ok(false));
        })
        .await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_variables_follow_assignments() {
    LocalSet::new()
        .run_until(async {
            let (session, canvas) = session();
            session.define(info("f", "[[a|x = 3]]"), |s| async move {
                s.declare("x")?;
                s.layout_variables()?;
                s.request_step("a", |s| s.set("x", Value::Int(3))).await??;
                s.pause("a").await?;
                Ok(Value::Undefined)
            });
            session.set_entry_call("f", vec![]);
            session.start();
            settle().await;
            {
                let canvas = canvas.borrow();
                let frame = canvas.attached_frames().next().unwrap();
                assert_eq!(frame.variable("x").unwrap().text, "");
            }

            session.step_in();
            settle().await;
            assert_eq!(session.get("x"), Ok(Value::Int(3)));
            let canvas = canvas.borrow();
            let frame = canvas.attached_frames().next().unwrap();
            assert_eq!(frame.variable("x").unwrap().text, "3");
        })
        .await;
}
