use serde::Deserialize;
use std::{fs, path::Path};
use tracing::{debug, warn};

pub const CONFIG_FILE: &str = "smart_todo_config.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where `e` in the UI offers to write the task list.
    pub export_path: String,
    /// chrono format string used for deadlines in the table.
    pub date_format: String,
    /// Widest bar in the days-left chart, in cells.
    pub chart_width: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            export_path: "updated_tasks.csv".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            chart_width: 40,
        }
    }
}

impl Config {
    /// Reads the config file, falling back to defaults when it is missing or
    /// unreadable.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Self::default();
        }
        match fs::read_to_string(path).map(|data| serde_json::from_str::<Config>(&data)) {
            Ok(Ok(config)) => config,
            Ok(Err(err)) => {
                warn!(path = %path.display(), %err, "invalid config, using defaults");
                Self::default()
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "failed to read config, using defaults");
                Self::default()
            }
        }
    }
}
