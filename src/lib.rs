//! # tdl
//!
//! An interactive, line-oriented task list. Commands are read from standard
//! input one line at a time, applied to an ordered in-memory list of tasks,
//! and the list is saved to a file so it survives between runs.
//!
//! ## Architecture Overview
//!
//! - **[`task`]**: the task entity and the list manager that owns all tasks
//! - **[`cli`]**: command classification, the interpreter loop, console output,
//!   argument parsing and configuration discovery
//! - **[`session`]**: the save file (atomic writes, all-or-nothing reload)
//! - **[`env`]**: file and directory names
//!
//! ## Commands
//!
//! | Input                              | Effect                           |
//! |------------------------------------|----------------------------------|
//! | `list`                             | show every task, numbered from 1 |
//! | `done <n>`                         | mark task `n` as done            |
//! | `delete <n>`                       | remove task `n`                  |
//! | `find <keyword>`                   | show tasks containing `keyword`  |
//! | `todo <text>`                      | add a todo                       |
//! | `deadline <text> /by <when>`       | add a task with a deadline       |
//! | `event <text> /at <when>`          | add an event                     |
//! | `bye`                              | save and quit                    |
//!
//! Any other non-empty line is added as a plain task.
//!
//! ## Quick Start
//!
//! ```rust
//! use tdl::{Listing, TaskKind, TaskListManager};
//!
//! let mut tasks = TaskListManager::new();
//! tasks.add("read book", TaskKind::None).unwrap();
//! tasks.mark_done(1).unwrap();
//!
//! assert_eq!(tasks.list_all(), Listing::Entries(vec!["1.[X] read book".to_string()]));
//! ```

/// Task entity and task-list management.
pub mod task;

/// Persistence of the task list between runs.
pub mod session;

/// Command line interface and the interactive loop.
pub mod cli;

/// Path constants and helpers.
pub mod env;

pub use task::{CommandError, Listing, Task, TaskKind, TaskKindTag, TaskListManager};

pub use session::{Storage, StorageConfig};

pub use cli::{Command, Console, ConsoleUi, Interpreter, TdlConfig, classify};
