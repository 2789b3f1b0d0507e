use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures surfaced to the user by the interpreter and the task list.
///
/// Every variant carries a message that is shown as-is; the interpreter loop
/// displays it and keeps reading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The line matched no command and could not be read as a task.
    #[error("{0}")]
    InvalidCommand(String),

    /// A required index or keyword was missing or malformed.
    #[error("{0}")]
    InvalidArgument(String),

    /// A well-formed index outside `1..=len`.
    #[error("Task {index} does not exist. {}", range_hint(.len))]
    OutOfRange { index: i64, len: usize },

    /// An add with a blank description.
    #[error("{0}")]
    InvalidTask(String),
}

fn range_hint(len: &usize) -> String {
    match *len {
        0 => "Your list is empty.".to_string(),
        1 => "The only valid number is 1.".to_string(),
        n => format!("Please pick a number from 1 to {}.", n),
    }
}

/// Kind of a task, with the payload dated kinds carry.
///
/// The `at`/`by` payloads are free text; they are never interpreted as dates.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskKind {
    #[default]
    None,
    Todo,
    Event {
        at: String,
    },
    Deadline {
        by: String,
    },
}

/// Discriminant of [`TaskKind`] without its payload
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskKindTag {
    None,
    Todo,
    Event,
    Deadline,
}

impl TaskKind {
    pub fn tag(&self) -> TaskKindTag {
        match self {
            TaskKind::None => TaskKindTag::None,
            TaskKind::Todo => TaskKindTag::Todo,
            TaskKind::Event { .. } => TaskKindTag::Event,
            TaskKind::Deadline { .. } => TaskKindTag::Deadline,
        }
    }

    /// Text appended after the description when the task is rendered
    pub fn decoration(&self) -> Option<String> {
        match self {
            TaskKind::None | TaskKind::Todo => None,
            TaskKind::Event { at } => Some(format!("(at: {})", at)),
            TaskKind::Deadline { by } => Some(format!("(by: {})", by)),
        }
    }
}

/// A single entry of the task list.
///
/// Tasks have no identity of their own: they are addressed by their 1-based
/// position in the list, which shifts when an earlier task is deleted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    description: String,
    kind: TaskKind,
    done: bool,
}

impl Task {
    /// Create a new, not yet done task
    pub fn new(description: impl AsRef<str>, kind: TaskKind) -> Result<Self, CommandError> {
        Self::restore(description, kind, false)
    }

    /// Rebuild a task from saved state, applying the same validation as [`Task::new`]
    pub fn restore(
        description: impl AsRef<str>,
        kind: TaskKind,
        done: bool,
    ) -> Result<Self, CommandError> {
        let description = description.as_ref().trim();
        if description.is_empty() {
            return Err(CommandError::InvalidTask(
                "The description of a task cannot be empty.".to_string(),
            ));
        }

        Ok(Self {
            description: description.to_string(),
            kind,
            done,
        })
    }

    /// Mark the task as finished. Marking a finished task again is a no-op.
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> &TaskKind {
        &self.kind
    }

    /// Description followed by the kind decoration, if any
    pub fn display_text(&self) -> String {
        match self.kind.decoration() {
            Some(decoration) => format!("{} {}", self.description, decoration),
            None => self.description.clone(),
        }
    }

    /// One-line form used everywhere a task is shown: `[X] text` or `[ ] text`
    pub fn render_line(&self) -> String {
        let checkbox = if self.done { "[X]" } else { "[ ]" };
        format!("{} {}", checkbox, self.display_text())
    }
}

/// Result of a read-only query over the list
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Listing {
    /// Nothing to show: the list is empty, or no task matched
    Empty,
    /// Rendered lines, each prefixed with the task's 1-based index
    Entries(Vec<String>),
}

impl Listing {
    pub fn lines(&self) -> &[String] {
        match self {
            Listing::Empty => &[],
            Listing::Entries(lines) => lines,
        }
    }
}
