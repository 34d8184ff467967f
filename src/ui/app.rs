//! Main TUI application state and logic
//!
//! The app runs as a task on the same `LocalSet` as the traced program: each
//! tick it draws, handles at most one pending key, then sleeps so traced
//! bodies, animations and the run timer get to make progress.

use crate::surface::Canvas;
use crate::trace::{Control, TraceSession};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Duration;
use tracing::debug;

/// Time between two redraws
const TICK: Duration = Duration::from_millis(16);

/// The main application state
pub struct App {
    /// The session being visualized
    pub session: TraceSession,

    /// The canvas the session draws on
    pub canvas: Rc<RefCell<Canvas>>,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,
}

impl App {
    /// Create a new app; `canvas` must be the surface `session` was built with
    pub fn new(session: TraceSession, canvas: Rc<RefCell<Canvas>>) -> Self {
        App {
            session,
            canvas,
            should_quit: false,
            status_message: String::from("Ready!"),
        }
    }

    /// Run the TUI application until the user quits
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::ZERO)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }

            tokio::time::sleep(TICK).await;
        }

        Ok(())
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        let inner = super::panes::canvas_area(chunks[0]);
        self.canvas
            .borrow_mut()
            .resize(inner.width as f64, inner.height as f64);

        super::panes::render_canvas_pane(
            frame,
            chunks[0],
            self.session.title(),
            &self.canvas.borrow(),
        );

        let outcome = self.session.outcome();
        let finished = self.session.is_finished();
        let message = match &outcome {
            Some(Ok(value)) if !self.session.is_running() => format!("Returned {}", value),
            Some(Err(err)) => format!("Error: {}", err),
            None if finished => "Trace ended without a result".to_string(),
            _ => self.status_message.clone(),
        };
        super::panes::render_status_bar(
            frame,
            chunks[1],
            super::panes::StatusRenderData {
                message: &message,
                depth: self.session.depth(),
                pending: self.session.pending_steps(),
                running: self.session.is_running(),
                finished,
                failed: finished && !matches!(outcome, Some(Ok(_))),
            },
        );
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            KeyCode::Right => {
                self.session.control(Control::StepIn);
                self.status_message = "Stepped in".to_string();
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.session.control(Control::StepOver);
                self.status_message = "Stepped over".to_string();
            }
            KeyCode::Char(' ') => {
                if self.session.stop() {
                    self.session.set_trace_mode(true);
                    self.status_message = "Paused".to_string();
                } else {
                    self.session.control(Control::Run);
                    self.status_message = "Running...".to_string();
                }
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.session.control(Control::Reset);
                self.status_message = "Reset".to_string();
            }
            other => debug!(?other, "unbound key"),
        }
    }
}
