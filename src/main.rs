use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use smart_todo::{
    app::App,
    cli::{self, Cli},
    config::{Config, CONFIG_FILE},
    csv_io, TaskStore,
};
use std::io;

fn main() -> Result<()> {
    if std::env::var("SMART_TODO_DEBUG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter("smart_todo=debug")
            .with_writer(io::stderr)
            .init();
    }

    let cli = Cli::parse();

    if let Some(command) = cli.command {
        let file = cli
            .file
            .context("--file <CSV> is required for this command")?;
        return cli::run(command, &file);
    }

    let config = Config::load(cli.config.unwrap_or_else(|| CONFIG_FILE.into()));
    let mut store = TaskStore::new();
    if let Some(file) = &cli.file {
        csv_io::import_from_path(&mut store, file)
            .with_context(|| format!("Failed to import tasks from {:?}", file))?;
    }
    let mut app = App::new(store, config);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = smart_todo::ui::run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.context("UI loop failed")
}
