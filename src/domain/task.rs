use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Maximum accepted title length, in characters.
pub const MAX_TITLE_LEN: usize = 100;

/// Unique identifier for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for TaskId {
    type Err = crate::error::KanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| crate::error::KanvasError::InvalidTaskId(s.to_string()))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a task on the board; each status is one ordering group (column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Backlog,
    Todo,
    InProgress,
    Done,
}

impl Status {
    /// All statuses in workflow order
    pub const ALL: [Status; 4] = [Status::Backlog, Status::Todo, Status::InProgress, Status::Done];

    /// Position of the status in the workflow, used for status sorting
    pub fn workflow_rank(&self) -> u8 {
        match self {
            Self::Backlog => 0,
            Self::Todo => 1,
            Self::InProgress => 2,
            Self::Done => 3,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backlog => write!(f, "backlog"),
            Self::Todo => write!(f, "todo"),
            Self::InProgress => write!(f, "in-progress"),
            Self::Done => write!(f, "done"),
        }
    }
}

impl FromStr for Status {
    type Err = crate::error::KanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "backlog" => Ok(Self::Backlog),
            "todo" => Ok(Self::Todo),
            "in-progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(crate::error::KanvasError::UnknownStatus(s.to_string())),
        }
    }
}

/// Task priority; used as the ordering fallback for tasks without an order key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Display rank: high sorts before medium, medium before low
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl FromStr for Priority {
    type Err = crate::error::KanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(crate::error::KanvasError::UnknownPriority(s.to_string())),
        }
    }
}

/// Validates a task title: non-blank, at most [`MAX_TITLE_LEN`] characters
pub fn validate_title(title: &str) -> Result<(), crate::error::KanvasError> {
    if title.trim().is_empty() {
        return Err(crate::error::KanvasError::InvalidTitle(
            "title must not be empty".to_string(),
        ));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(crate::error::KanvasError::InvalidTitle(format!(
            "title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(())
}

/// A task on the board
///
/// `completed` is kept in lockstep with `status`: a task is completed exactly
/// when it sits in the done column. `order` is the fractional sort key within
/// the task's status group; `None` means the task has no explicit position
/// and sorts after every keyed task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub status: Status,
    pub priority: Priority,
    pub completed: bool,
    pub order: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task with a validated title
    pub fn new(title: impl Into<String>) -> Result<Self, crate::error::KanvasError> {
        let title = title.into();
        validate_title(&title)?;
        let now = Utc::now();
        Ok(Self {
            id: TaskId::new(),
            title,
            description: None,
            status: Status::Todo,
            priority: Priority::Medium,
            completed: false,
            order: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Sets the title after validation
    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), crate::error::KanvasError> {
        let title = title.into();
        validate_title(&title)?;
        self.title = title;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Sets the description
    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
        self.updated_at = Utc::now();
    }

    /// Sets the priority
    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
        self.updated_at = Utc::now();
    }

    /// Moves the task to a status group, deriving `completed` from it
    ///
    /// Every status is reachable from every other in one step; entering done
    /// marks the task completed, leaving done clears the flag.
    pub fn set_status(&mut self, status: Status) {
        self.status = status;
        self.completed = status.is_done();
        self.updated_at = Utc::now();
    }

    /// Sets the completed flag, driving status in lockstep
    ///
    /// Completing a task moves it to done; un-completing a done task sends it
    /// back to todo, while a task in any other column keeps its column.
    pub fn set_completed(&mut self, completed: bool) {
        if completed {
            self.status = Status::Done;
        } else if self.status.is_done() {
            self.status = Status::Todo;
        }
        self.completed = completed;
        self.updated_at = Utc::now();
    }

    /// Flips the completed flag through [`Task::set_completed`]
    pub fn toggle_completed(&mut self) {
        self.set_completed(!self.completed);
    }

    /// Sets the order key without touching status
    pub fn set_order(&mut self, order: Option<f64>) {
        self.order = order;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_defaults() {
        let task = Task::new("Write report").unwrap();
        assert_eq!(task.title, "Write report");
        assert_eq!(task.status, Status::Todo);
        assert_eq!(task.priority, Priority::Medium);
        assert!(!task.completed);
        assert!(task.order.is_none());
    }

    #[test]
    fn test_title_validation() {
        assert!(Task::new("").is_err());
        assert!(Task::new("   ").is_err());
        assert!(Task::new("a".repeat(MAX_TITLE_LEN)).is_ok());
        assert!(Task::new("a".repeat(MAX_TITLE_LEN + 1)).is_err());
    }

    #[test]
    fn test_set_title_rejects_blank() {
        let mut task = Task::new("Original").unwrap();
        assert!(task.set_title("  ").is_err());
        assert_eq!(task.title, "Original");

        task.set_title("Updated").unwrap();
        assert_eq!(task.title, "Updated");
    }

    #[test]
    fn test_status_parsing_round_trip() {
        for status in Status::ALL {
            let parsed: Status = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("doing".parse::<Status>().is_err());
    }

    #[test]
    fn test_status_serde_kebab_case() {
        let json = serde_json::to_string(&Status::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");

        let status: Status = serde_json::from_str("\"backlog\"").unwrap();
        assert_eq!(status, Status::Backlog);
    }

    #[test]
    fn test_entering_done_sets_completed() {
        let mut task = Task::new("Test").unwrap();
        task.set_status(Status::Done);
        assert!(task.completed);
    }

    #[test]
    fn test_leaving_done_clears_completed() {
        let mut task = Task::new("Test").unwrap();
        task.set_status(Status::Done);
        task.set_status(Status::InProgress);
        assert!(!task.completed);
    }

    #[test]
    fn test_all_transitions_allowed() {
        for from in Status::ALL {
            for to in Status::ALL {
                let mut task = Task::new("Test").unwrap();
                task.set_status(from);
                task.set_status(to);
                assert_eq!(task.status, to);
                assert_eq!(task.completed, to.is_done());
            }
        }
    }

    #[test]
    fn test_toggle_completed_moves_to_done_and_back() {
        let mut task = Task::new("Test").unwrap();
        task.set_status(Status::InProgress);

        task.toggle_completed();
        assert!(task.completed);
        assert_eq!(task.status, Status::Done);

        task.toggle_completed();
        assert!(!task.completed);
        assert_eq!(task.status, Status::Todo);
    }

    #[test]
    fn test_uncomplete_outside_done_keeps_column() {
        let mut task = Task::new("Test").unwrap();
        task.set_status(Status::Backlog);
        task.set_completed(false);
        assert_eq!(task.status, Status::Backlog);
    }

    #[test]
    fn test_priority_rank() {
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
    }

    #[test]
    fn test_task_id_parsing() {
        let id = TaskId::new();
        let parsed = TaskId::from_str(&id.to_string()).unwrap();
        assert_eq!(parsed, id);

        assert!(TaskId::from_str("not-a-uuid").is_err());
    }

    #[test]
    fn test_task_serialization_round_trip() {
        let mut task = Task::new("Serialize me").unwrap();
        task.set_order(Some(1.5));
        task.set_status(Status::InProgress);

        let json = serde_json::to_string(&task).unwrap();
        let back: Task = serde_json::from_str(&json).unwrap();

        assert_eq!(back.id, task.id);
        assert_eq!(back.status, Status::InProgress);
        assert_eq!(back.order, Some(1.5));
    }
}
