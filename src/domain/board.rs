use crate::domain::task::Status;
use serde::{Deserialize, Serialize};

/// Configuration for one board column
///
/// Columns map one-to-one onto task statuses; the set of statuses is closed,
/// so a board always has exactly one column per status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub status: Status,
    pub color: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, status: Status) -> Self {
        Self {
            name: name.into(),
            status,
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Board configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            name: "Kanvas Board".to_string(),
            columns: vec![
                Column::new("Backlog", Status::Backlog).with_color("purple"),
                Column::new("To Do", Status::Todo).with_color("yellow"),
                Column::new("In Progress", Status::InProgress).with_color("indigo"),
                Column::new("Done", Status::Done).with_color("green"),
            ],
        }
    }
}

/// Board state persisted alongside the tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub config: BoardConfig,
}

impl Board {
    pub fn new(config: BoardConfig) -> Self {
        Self { config }
    }

    /// Gets the column configuration for a status
    pub fn column_for_status(&self, status: Status) -> Option<&Column> {
        self.config.columns.iter().find(|col| col.status == status)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}
