use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use threadview::app::App;
use threadview::config::Config;
use threadview::logging;
use threadview::mail::{DirSource, ThreadSource};
use threadview::ui::{render_help, render_reader, render_thread};

#[derive(Parser)]
#[command(name = "threadview", about = "Browse an email thread as a conversation")]
struct Cli {
    /// Thread to open (a `<id>.json` file or `<id>/` directory under the root)
    thread_id: Option<String>,
    /// Path to config file (default: ~/.config/threadview/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Thread root directory, overriding the config
    #[arg(long)]
    root: Option<String>,
    /// Print the available thread ids and exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = logging::init()?;
    let config = Arc::new(Config::load(cli.config.as_deref()));
    let root = cli.root.unwrap_or_else(|| config.source.root.clone());
    let source = DirSource::new(&root);
    tracing::info!(root = %source.root().display(), log = ?log_path, "starting");

    if cli.list {
        for id in source.list_threads().context("listing threads")? {
            println!("{}", id);
        }
        return Ok(());
    }

    let Some(thread_id) = cli.thread_id else {
        anyhow::bail!("no thread given; use --list to see available threads");
    };
    let messages = source
        .fetch_thread(&thread_id)
        .with_context(|| format!("loading thread {}", thread_id))?;
    tracing::info!(thread = %thread_id, messages = messages.len(), "thread loaded");

    let mut app = App::new(thread_id, messages, config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| render(app, f))?;

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key.code),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(_) => {
                    app.handle_click(mouse.column, mouse.row);
                }
                MouseEventKind::ScrollDown => app.reader_scroll = app.reader_scroll.saturating_add(3),
                MouseEventKind::ScrollUp => app.reader_scroll = app.reader_scroll.saturating_sub(3),
                _ => {}
            },
            _ => {}
        }

        if app.should_quit {
            tracing::info!("quit");
            return Ok(());
        }
    }
}

fn render(app: &mut App, f: &mut Frame) {
    let config = app.config.clone();

    // Split into main area and help bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(f.area());

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[0]);

    let replying = app.reply.is_some();
    render_thread(f, panes[0], app, !replying);
    render_reader(f, panes[1], app, replying);
    render_help(
        f,
        chunks[1],
        replying,
        app.status_message.as_deref(),
        &config.theme,
    );
}
