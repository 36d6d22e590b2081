//! Front-end state: the add form, the index/path prompts and key handling.
//! Kept free of terminal I/O so it can be driven from tests.

use crate::config::Config;
use crate::csv_io;
use crate::task::Priority;
use crate::task_store::TaskStore;
use chrono::{Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Deadline,
    Priority,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    pub name: String,
    pub deadline: String,
    pub priority: Priority,
    pub focus: FormField,
}

impl TaskForm {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            name: String::new(),
            deadline: today.format("%Y-%m-%d").to_string(),
            priority: Priority::HIGH,
            focus: FormField::Name,
        }
    }

    fn focus_next(&mut self) {
        self.focus = match self.focus {
            FormField::Name => FormField::Deadline,
            FormField::Deadline => FormField::Priority,
            FormField::Priority => FormField::Name,
        };
    }

    fn focus_prev(&mut self) {
        self.focus = match self.focus {
            FormField::Name => FormField::Priority,
            FormField::Deadline => FormField::Name,
            FormField::Priority => FormField::Deadline,
        };
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Name => Some(&mut self.name),
            FormField::Deadline => Some(&mut self.deadline),
            FormField::Priority => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    AddTask(TaskForm),
    MarkDone(String),
    Import(String),
    Export(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Info(String),
    Error(String),
}

pub struct App {
    pub store: TaskStore,
    pub config: Config,
    pub mode: Mode,
    /// Row in the display-ordered table.
    pub selected: usize,
    pub message: Option<Message>,
    /// The open prompt still holds its suggested value; the first typed
    /// character replaces it instead of appending.
    pub prefilled: bool,
    pub today: NaiveDate,
    pub should_quit: bool,
}

impl App {
    pub fn new(store: TaskStore, config: Config) -> Self {
        Self {
            store,
            config,
            mode: Mode::Normal,
            selected: 0,
            message: None,
            prefilled: false,
            today: Local::now().date_naive(),
            should_quit: false,
        }
    }

    /// Storage index of the highlighted table row.
    pub fn selected_index(&self) -> Option<usize> {
        self.store
            .display_order()
            .get(self.selected)
            .map(|(index, _)| *index)
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        let mode = std::mem::replace(&mut self.mode, Mode::Normal);
        self.mode = match mode {
            Mode::Normal => self.handle_normal(key),
            Mode::AddTask(form) => self.handle_form(form, key),
            Mode::MarkDone(input) => {
                self.handle_prompt(input, key, App::submit_mark_done, Mode::MarkDone)
            }
            Mode::Import(input) => {
                self.handle_prompt(input, key, App::submit_import, Mode::Import)
            }
            Mode::Export(input) => {
                self.handle_prompt(input, key, App::submit_export, Mode::Export)
            }
        };
    }

    fn handle_normal(&mut self, key: KeyEvent) -> Mode {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                Mode::Normal
            }
            KeyCode::Char('a') => Mode::AddTask(TaskForm::new(self.today)),
            KeyCode::Char('d') => {
                let input = self
                    .selected_index()
                    .map(|i| i.to_string())
                    .unwrap_or_default();
                self.prefilled = !input.is_empty();
                Mode::MarkDone(input)
            }
            KeyCode::Char('i') => Mode::Import(String::new()),
            KeyCode::Char('e') => {
                self.prefilled = true;
                Mode::Export(self.config.export_path.clone())
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                Mode::Normal
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.store.len() {
                    self.selected += 1;
                }
                Mode::Normal
            }
            _ => Mode::Normal,
        }
    }

    fn handle_form(&mut self, mut form: TaskForm, key: KeyEvent) -> Mode {
        match key.code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Enter => return self.submit_form(form),
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')
                if form.focus == FormField::Priority =>
            {
                form.priority = form.priority.next();
            }
            KeyCode::Char(c @ '1'..='3') if form.focus == FormField::Priority => {
                if let Some(p) = c.to_digit(10).and_then(|d| Priority::new(d as u8).ok()) {
                    form.priority = p;
                }
            }
            KeyCode::Char(c) => {
                if let Some(text) = form.focused_text() {
                    text.push(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(text) = form.focused_text() {
                    text.pop();
                }
            }
            _ => {}
        }
        Mode::AddTask(form)
    }

    fn submit_form(&mut self, form: TaskForm) -> Mode {
        if form.name.trim().is_empty() {
            self.message = Some(Message::Error("Please enter a task name.".to_string()));
            return Mode::AddTask(form);
        }
        match self
            .store
            .add_task(form.name.as_str(), form.deadline.as_str(), form.priority)
        {
            Ok(()) => {
                self.message = Some(Message::Info(format!(
                    "Task '{}' added successfully!",
                    form.name
                )));
                Mode::Normal
            }
            Err(err) => {
                self.message = Some(Message::Error(err.to_string()));
                Mode::AddTask(form)
            }
        }
    }

    fn handle_prompt(
        &mut self,
        mut input: String,
        key: KeyEvent,
        submit: fn(&mut App, &str) -> Message,
        resume: fn(String) -> Mode,
    ) -> Mode {
        let prefilled = std::mem::take(&mut self.prefilled);
        match key.code {
            KeyCode::Esc => Mode::Normal,
            KeyCode::Enter => {
                self.message = Some(submit(self, input.trim()));
                Mode::Normal
            }
            KeyCode::Backspace => {
                input.pop();
                resume(input)
            }
            KeyCode::Char(c) => {
                if prefilled {
                    input.clear();
                }
                input.push(c);
                resume(input)
            }
            _ => {
                self.prefilled = prefilled;
                resume(input)
            }
        }
    }

    fn submit_mark_done(&mut self, input: &str) -> Message {
        let Ok(index) = input.parse::<usize>() else {
            return Message::Error(format!("'{input}' is not a task index"));
        };
        match self.store.mark_done(index) {
            Ok(()) => {
                // the task moved in display order; keep it highlighted
                if let Some(row) = self
                    .store
                    .display_order()
                    .iter()
                    .position(|(i, _)| *i == index)
                {
                    self.selected = row;
                }
                Message::Info(format!("Task #{index} marked as done!"))
            }
            Err(err) => Message::Error(err.to_string()),
        }
    }

    fn submit_import(&mut self, path: &str) -> Message {
        if path.is_empty() {
            return Message::Error("Enter a CSV path to import.".to_string());
        }
        match csv_io::import_from_path(&mut self.store, path) {
            Ok(count) => Message::Info(format!("Imported {count} tasks from {path}.")),
            Err(err) => Message::Error(format!("Import failed: {err}")),
        }
    }

    fn submit_export(&mut self, path: &str) -> Message {
        if path.is_empty() {
            return Message::Error("Enter a CSV path to export to.".to_string());
        }
        match csv_io::export_to_path(&self.store, path) {
            Ok(()) => Message::Info(format!("Exported {} tasks to {path}.", self.store.len())),
            Err(err) => Message::Error(format!("Export failed: {err}")),
        }
    }
}
