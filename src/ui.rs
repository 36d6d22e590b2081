use crate::app::{App, FormField, Message, Mode, TaskForm};
use crate::task::TaskStatus;
use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::{fmt::Write as _, io};

const HELP: &str = "a add | d mark done | i import | e export | \u{2191}\u{2193} select | q quit";
const CHART_ROWS: usize = 8;
const NAME_WIDTH: usize = 16;

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        app.today = Local::now().date_naive();
        terminal.draw(|f| render(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                app.handle_key(key);
            }
        }
        if app.should_quit {
            return Ok(());
        }
    }
}

pub fn render(f: &mut Frame, app: &App) {
    let chart_height = app.store.len().clamp(1, CHART_ROWS) as u16 + 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(chart_height),
            Constraint::Length(2),
        ])
        .split(f.area());

    render_header(f, chunks[0], app);
    render_table(f, chunks[1], app);
    render_suggestion(f, chunks[2], app);
    render_chart(f, chunks[3], app);
    render_footer(f, chunks[4], app);

    if let Mode::AddTask(form) = &app.mode {
        render_form(f, form);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let summary = Line::from(vec![
        Span::styled(
            "Smart To-Do Assistant",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "  {} tasks, {} pending, {} done",
            app.store.len(),
            app.store.pending_count(),
            app.store.done_count()
        )),
    ]);
    f.render_widget(
        Paragraph::new(summary).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn render_table(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().title("All Tasks").borders(Borders::ALL);
    if app.store.is_empty() {
        f.render_widget(
            Paragraph::new("No tasks available yet. Press 'a' to add one or 'i' to import a CSV.")
                .block(block),
            area,
        );
        return;
    }

    let rows: Vec<Row> = app
        .store
        .display_order()
        .into_iter()
        .map(|(index, task)| {
            let status_style = match task.status {
                TaskStatus::Pending => Style::default().fg(Color::Yellow),
                TaskStatus::Done => Style::default().fg(Color::Green),
            };
            Row::new(vec![
                Cell::from(index.to_string()),
                Cell::from(task.name.clone()),
                Cell::from(format_date(task.deadline, &app.config.date_format)),
                Cell::from(format!("{} ({})", task.priority, task.priority.label())),
                Cell::from(task.status.label()).style(status_style),
                Cell::from(task.days_left(app.today).to_string()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(16),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Length(9),
        ],
    )
    .header(
        Row::new(vec!["#", "Task", "Deadline", "Priority", "Status", "Days Left"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(block)
    .row_highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    .highlight_symbol("> ");

    let mut state = TableState::default().with_selected(Some(app.selected));
    f.render_stateful_widget(table, area, &mut state);
}

fn render_suggestion(f: &mut Frame, area: Rect, app: &App) {
    let text = app.store.suggest_task_on(app.today).to_string();
    f.render_widget(
        Paragraph::new(text).block(
            Block::default()
                .title("Suggested Next Task")
                .borders(Borders::ALL),
        ),
        area,
    );
}

fn render_chart(f: &mut Frame, area: Rect, app: &App) {
    let report = app.store.days_left_report(app.today);
    let max_abs = report.iter().map(|(_, d)| d.abs()).max().unwrap_or(0);
    let lines: Vec<Line> = report
        .iter()
        .take(CHART_ROWS)
        .map(|&(name, days)| {
            let color = if days < 0 { Color::Red } else { Color::Cyan };
            Line::from(vec![
                Span::raw(format!("{:<width$} ", truncate(name, NAME_WIDTH), width = NAME_WIDTH)),
                Span::styled(
                    "\u{2588}".repeat(bar_len(days, max_abs, app.config.chart_width)),
                    Style::default().fg(color),
                ),
                Span::raw(format!(" {days}")),
            ])
        })
        .collect();

    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title("Days Left Until Deadline")
                .borders(Borders::ALL),
        ),
        area,
    );
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let message = match &app.message {
        Some(Message::Info(m)) => Line::styled(m.as_str(), Style::default().fg(Color::Green)),
        Some(Message::Error(m)) => Line::styled(m.as_str(), Style::default().fg(Color::Red)),
        None => Line::raw(""),
    };
    let prompt = match &app.mode {
        Mode::Normal => Line::raw(HELP),
        Mode::AddTask(_) => Line::raw("Tab next field | Enter add | Esc cancel"),
        Mode::MarkDone(input) => prompt_line("Task index to mark as done: ", input),
        Mode::Import(input) => prompt_line("Import CSV (Task, Deadline, Priority): ", input),
        Mode::Export(input) => prompt_line("Export CSV to: ", input),
    };
    f.render_widget(Paragraph::new(vec![message, prompt]), area);
}

fn prompt_line<'a>(label: &'a str, input: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(label, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(input),
        Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED)),
    ])
}

fn render_form(f: &mut Frame, form: &TaskForm) {
    let area = centered_rect(60, 7, f.area());
    let field_style = |field: FormField| {
        if form.focus == field {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED)
        } else {
            Style::default()
        }
    };
    let lines = vec![
        Line::from(vec![
            Span::styled("Task Name: ", field_style(FormField::Name)),
            Span::raw(form.name.as_str()),
        ]),
        Line::from(vec![
            Span::styled("Deadline:  ", field_style(FormField::Deadline)),
            Span::raw(form.deadline.as_str()),
        ]),
        Line::from(vec![
            Span::styled("Priority:  ", field_style(FormField::Priority)),
            Span::raw(format!("< {} = {} >", form.priority, form.priority.label())),
        ]),
    ];

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title("Add a New Task")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        area,
    );
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Bar length for `days`, scaled so the largest magnitude fills `width`.
/// Any nonzero value gets at least one cell.
fn bar_len(days: i64, max_abs: i64, width: u16) -> usize {
    if days == 0 || max_abs == 0 {
        return 0;
    }
    let len = days.unsigned_abs() * u64::from(width) / max_abs.unsigned_abs();
    len.max(1) as usize
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('\u{2026}');
    out
}

// A bad user-supplied format string makes chrono's Display fail.
fn format_date(date: NaiveDate, fmt: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(fmt)).is_err() {
        return date.format("%Y-%m-%d").to_string();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::task::Priority;
    use crate::task_store::TaskStore;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app_with_tasks() -> App {
        let mut app = App::new(TaskStore::new(), Config::default());
        app.today = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        app.store.add_task("Renew passport", "2026-04-11", Priority::MEDIUM).unwrap();
        app.store.add_task("File taxes", "2026-03-30", Priority::HIGH).unwrap();
        app
    }

    #[test]
    fn test_render_shows_table_and_suggestion() {
        let out = screen(&app_with_tasks());
        assert!(out.contains("All Tasks"));
        assert!(out.contains("Renew passport"));
        assert!(out.contains("Next Task: File taxes | Deadline: 2026-03-30 | Priority: 1"));
        assert!(out.contains("Days Left Until Deadline"));
        assert!(out.contains("2 tasks, 2 pending, 0 done"));
    }

    #[test]
    fn test_render_empty_store() {
        let app = App::new(TaskStore::new(), Config::default());
        let out = screen(&app);
        assert!(out.contains("No tasks available yet"));
        assert!(out.contains("All tasks completed!"));
    }

    #[test]
    fn test_render_form_popup() {
        let mut app = app_with_tasks();
        app.handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE));
        let out = screen(&app);
        assert!(out.contains("Add a New Task"));
        assert!(out.contains("< 1 = High >"));
    }

    #[test]
    fn test_bar_len() {
        assert_eq!(bar_len(10, 10, 40), 40);
        assert_eq!(bar_len(-5, 10, 40), 20);
        assert_eq!(bar_len(1, 1000, 40), 1);
        assert_eq!(bar_len(0, 10, 40), 0);
    }

    #[test]
    fn test_format_date_falls_back() {
        let d = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        assert_eq!(format_date(d, "%d.%m.%Y"), "01.04.2026");
        assert_eq!(format_date(d, "%Q"), "2026-04-01");
        assert_eq!(truncate("abcdef", 4), "abc\u{2026}");
    }
}
