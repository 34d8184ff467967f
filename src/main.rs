// calltrace: step-through call stack animator

use std::cell::RefCell;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::task::LocalSet;
use tracing_subscriber::EnvFilter;

use calltrace::config::TraceConfig;
use calltrace::programs::Program;
use calltrace::surface::{Canvas, SharedSurface};
use calltrace::trace::{Control, TraceSession};
use calltrace::ui::App;

/// Canvas size used when no terminal is attached
const HEADLESS_SIZE: (f64, f64) = (80.0, 24.0);

/// calltrace - step through traced function calls
#[derive(Parser, Debug)]
#[command(name = "calltrace")]
#[command(version = "0.1.0")]
#[command(about = "Step-through call stack animator", long_about = None)]
struct Cli {
    /// Demo program to trace
    #[arg(short, long, value_enum, default_value_t = Program::Factorial)]
    demo: Program,

    /// Argument passed to the demo's entry function
    #[arg(short = 'n', long, default_value_t = 4)]
    arg: i64,

    /// Fixed frame width; derived from the maximum depth when unset
    #[arg(long)]
    frame_width: Option<f64>,

    /// Frame height
    #[arg(long)]
    frame_height: Option<f64>,

    /// Delay between automatic steps in run mode, in milliseconds
    #[arg(long, default_value_t = 100)]
    run_delay_ms: u64,

    /// Deepest call nesting to leave room for; defaults to the demo's own
    #[arg(long)]
    max_depth: Option<usize>,

    /// Leave the outermost frame on screen after it returns
    #[arg(long)]
    keep_last_frame: bool,

    /// Run the demo to completion without a terminal and print the result
    #[arg(long)]
    headless: bool,

    /// Write logs to this file (TUI mode logs nowhere otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn trace_config(&self) -> TraceConfig {
        let mut config = TraceConfig::default()
            .with_max_depth(self.max_depth.unwrap_or(self.demo.max_depth(self.arg)))
            .with_run_delay(Duration::from_millis(self.run_delay_ms))
            .with_keep_last_frame(self.keep_last_frame);
        if let Some(width) = self.frame_width {
            config = config.with_frame_width(width);
        }
        if let Some(height) = self.frame_height {
            config = config.with_frame_height(height);
        }
        config
    }
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Some(path) = &cli.log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if cli.headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let local = LocalSet::new();
    local
        .run_until(async move {
            if cli.headless {
                run_headless(&cli).await
            } else {
                run_tui(&cli).await
            }
        })
        .await
}

fn build_session(cli: &Cli, canvas: &Rc<RefCell<Canvas>>) -> TraceSession {
    let surface: SharedSurface = canvas.clone();
    let session = TraceSession::new(cli.demo.title(), surface, cli.trace_config());
    cli.demo.install(&session, cli.arg);
    session
}

async fn run_headless(cli: &Cli) -> anyhow::Result<()> {
    let canvas = Rc::new(RefCell::new(Canvas::new(HEADLESS_SIZE.0, HEADLESS_SIZE.1)));
    let session = build_session(cli, &canvas);
    session.start();
    session.control(Control::Run);

    while !session.is_finished() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    session.stop();
    let Some(outcome) = session.outcome() else {
        bail!("trace of {} ended without a result", cli.demo.title());
    };

    match outcome {
        Ok(value) => {
            println!("{}({}) = {}", cli.demo.title(), cli.arg, value);
            Ok(())
        }
        Err(err) => bail!("trace of {} failed: {}", cli.demo.title(), err),
    }
}

async fn run_tui(cli: &Cli) -> anyhow::Result<()> {
    let canvas = Rc::new(RefCell::new(Canvas::new(HEADLESS_SIZE.0, HEADLESS_SIZE.1)));

    // Set up terminal
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    // Size the canvas before the first frame is created
    if let Ok(size) = terminal.size() {
        let area = calltrace::ui::panes::canvas_area(ratatui::layout::Rect::new(
            0,
            0,
            size.width,
            size.height.saturating_sub(1),
        ));
        canvas
            .borrow_mut()
            .resize(area.width as f64, area.height as f64);
    }

    let session = build_session(cli, &canvas);
    session.start();

    // Create and run app
    let mut app = App::new(session, canvas);
    let res = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("terminal UI failed")
}
