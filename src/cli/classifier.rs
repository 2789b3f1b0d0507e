//! Command classification
//!
//! Maps a raw input line to the command it names. Classification is pure:
//! it never touches the task list. Arguments are pulled out separately with
//! [`argument`], and validated by [`parse_index`] or by the task list itself.
//!
//! Recognized forms (keywords are case-sensitive):
//! - `bye`, `list` (the whole line)
//! - `done <n>`, `delete <n>`, `find <keyword>`
//! - `todo <description>`
//! - `deadline <description> /by <when>`
//! - `event <description> /at <when>`
//! - anything else non-empty is a plain task

use crate::task::{CommandError, TaskKind, TaskKindTag};
use regex::Regex;
use std::sync::OnceLock;

pub const EXIT_KEYWORD: &str = "bye";
pub const LIST_KEYWORD: &str = "list";
pub const DONE_KEYWORD: &str = "done";
pub const DELETE_KEYWORD: &str = "delete";
pub const FIND_KEYWORD: &str = "find";
pub const TODO_KEYWORD: &str = "todo";
pub const EVENT_KEYWORD: &str = "event";
pub const DEADLINE_KEYWORD: &str = "deadline";

/// Intent of one input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Exit,
    List,
    MarkDone,
    Delete,
    Add(TaskKindTag),
    Find,
    Unknown,
}

impl Command {
    /// Keyword token the command starts with, if it has one
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Command::Exit => Some(EXIT_KEYWORD),
            Command::List => Some(LIST_KEYWORD),
            Command::MarkDone => Some(DONE_KEYWORD),
            Command::Delete => Some(DELETE_KEYWORD),
            Command::Find => Some(FIND_KEYWORD),
            Command::Add(TaskKindTag::Todo) => Some(TODO_KEYWORD),
            Command::Add(TaskKindTag::Event) => Some(EVENT_KEYWORD),
            Command::Add(TaskKindTag::Deadline) => Some(DEADLINE_KEYWORD),
            Command::Add(TaskKindTag::None) | Command::Unknown => None,
        }
    }
}

fn deadline_form() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^deadline\s+(?P<desc>.*?)\s+/by\s+(?P<when>\S.*)$").unwrap())
}

fn event_form() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^event\s+(?P<desc>.*?)\s+/at\s+(?P<when>\S.*)$").unwrap())
}

/// Classify one raw input line
pub fn classify(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Unknown;
    }

    match line {
        EXIT_KEYWORD => return Command::Exit,
        LIST_KEYWORD => return Command::List,
        _ => {}
    }

    let head = line.split_whitespace().next().unwrap_or_default();
    match head {
        DONE_KEYWORD => Command::MarkDone,
        DELETE_KEYWORD => Command::Delete,
        FIND_KEYWORD => Command::Find,
        TODO_KEYWORD => Command::Add(TaskKindTag::Todo),
        DEADLINE_KEYWORD if deadline_form().is_match(line) => {
            Command::Add(TaskKindTag::Deadline)
        }
        EVENT_KEYWORD if event_form().is_match(line) => Command::Add(TaskKindTag::Event),
        DEADLINE_KEYWORD | EVENT_KEYWORD => Command::Unknown,
        _ => Command::Add(TaskKindTag::None),
    }
}

/// Text following the command's keyword and the one separator after it.
///
/// Any further leading whitespace belongs to the argument, so `find  book`
/// searches for `" book"`. Returns `None` when the line is too short to carry
/// an argument.
pub fn argument<'a>(line: &'a str, command: Command) -> Option<&'a str> {
    let line = line.trim();
    let rest = match command.keyword() {
        Some(keyword) => {
            let rest = line.strip_prefix(keyword)?;
            rest.strip_prefix(char::is_whitespace).unwrap_or(rest)
        }
        None => line,
    };
    (!rest.trim().is_empty()).then_some(rest)
}

/// Parse a task number given to `done` or `delete`.
///
/// Only the syntax is checked here; whether the index exists is up to the
/// task list.
pub fn parse_index(command: Command, argument: Option<&str>) -> Result<i64, CommandError> {
    let Some(raw) = argument else {
        let action = match command {
            Command::Delete => "delete",
            _ => "set as done",
        };
        return Err(CommandError::InvalidArgument(format!(
            "You need to specify a task to {}.",
            action
        )));
    };

    raw.trim().parse::<i64>().map_err(|_| {
        CommandError::InvalidArgument(format!("Please enter an integer, not {:?}.", raw))
    })
}

/// Split an add line into the description and the task kind
pub fn parse_task(line: &str, tag: TaskKindTag) -> Result<(String, TaskKind), CommandError> {
    let line = line.trim();
    match tag {
        TaskKindTag::None => Ok((line.to_string(), TaskKind::None)),
        TaskKindTag::Todo => {
            let description = argument(line, Command::Add(tag)).unwrap_or_default();
            Ok((description.trim().to_string(), TaskKind::Todo))
        }
        TaskKindTag::Deadline => {
            let caps = deadline_form()
                .captures(line)
                .ok_or_else(|| malformed("deadline <description> /by <when>"))?;
            Ok((
                caps["desc"].to_string(),
                TaskKind::Deadline {
                    by: caps["when"].trim().to_string(),
                },
            ))
        }
        TaskKindTag::Event => {
            let caps = event_form()
                .captures(line)
                .ok_or_else(|| malformed("event <description> /at <when>"))?;
            Ok((
                caps["desc"].to_string(),
                TaskKind::Event {
                    at: caps["when"].trim().to_string(),
                },
            ))
        }
    }
}

fn malformed(usage: &str) -> CommandError {
    CommandError::InvalidCommand(format!("Please use the form: {}", usage))
}
