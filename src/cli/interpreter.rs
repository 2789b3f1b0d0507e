//! Read / classify / dispatch loop
//!
//! The interpreter owns the task list, the console and (optionally) the
//! storage for one session. It is the single place where [`CommandError`]s
//! are caught: each one is shown to the user and the loop keeps reading.

use crate::cli::classifier::{self, Command};
use crate::cli::ui::Console;
use crate::session::Storage;
use crate::task::{CommandError, Listing, TaskListManager};
use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

pub const EXIT_MESSAGE: &str = "Bye. Hope to see you soon!";
pub const UNKNOWN_COMMAND_MESSAGE: &str = "Please enter something valid!";

/// Whether the loop keeps going after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Successful response to one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub message: String,
    pub flow: Flow,
}

impl Reply {
    fn say(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            flow: Flow::Continue,
        }
    }
}

pub struct Interpreter<C: Console> {
    manager: TaskListManager,
    console: C,
    storage: Option<Storage>,
}

impl<C: Console> Interpreter<C> {
    pub fn new(manager: TaskListManager, console: C) -> Self {
        Self {
            manager,
            console,
            storage: None,
        }
    }

    /// Persist the list through `storage` after each change
    pub fn with_storage(mut self, storage: Storage) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn manager(&self) -> &TaskListManager {
        &self.manager
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn into_console(self) -> C {
        self.console
    }

    /// Process lines from `reader` until the exit command or end of input.
    ///
    /// Nothing past the exit command is read. Bytes that are not valid UTF-8
    /// are replaced, and the line is handled like any other. Pending changes
    /// are written on the way out even when autosave is off.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, mut reader: R) -> Result<()> {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .await
                .context("Failed to read from input")?;
            if read == 0 {
                info!("Input closed without an exit command");
                break;
            }

            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\n', '\r']);
            if self.step(line).await? == Flow::Exit {
                info!("Exit command received");
                break;
            }
        }

        self.flush().await
    }

    /// Handle one line end to end: dispatch, respond, persist
    pub async fn step(&mut self, line: &str) -> Result<Flow> {
        let flow = match self.handle_line(line) {
            Ok(reply) => {
                self.console.say(&reply.message)?;
                reply.flow
            }
            Err(e) => {
                debug!("Command {:?} failed: {}", line, e);
                self.console.say(&e.to_string())?;
                Flow::Continue
            }
        };

        if let Some(storage) = self.storage.as_mut()
            && let Err(e) = storage.sync(&self.manager).await
        {
            warn!("Task list not saved: {:#}", e);
            self.console
                .say(&format!("I couldn't save your tasks: {:#}", e))?;
        }

        Ok(flow)
    }

    /// Write any change not saved yet, regardless of autosave
    async fn flush(&mut self) -> Result<()> {
        if let Some(storage) = self.storage.as_mut()
            && let Err(e) = storage.flush(&self.manager).await
        {
            warn!("Task list not saved on exit: {:#}", e);
            self.console
                .say(&format!("I couldn't save your tasks: {:#}", e))?;
        }

        Ok(())
    }

    /// Classify `line` and apply it to the task list
    pub fn handle_line(&mut self, line: &str) -> Result<Reply, CommandError> {
        let command = classifier::classify(line);
        debug!("Classified {:?} as {:?}", line, command);

        match command {
            Command::Exit => Ok(Reply {
                message: EXIT_MESSAGE.to_string(),
                flow: Flow::Exit,
            }),
            Command::List => Ok(Reply::say(match self.manager.list_all() {
                Listing::Empty => "Your list is empty!".to_string(),
                Listing::Entries(lines) => {
                    format!("Here are the tasks in your list:\n{}", lines.join("\n"))
                }
            })),
            Command::MarkDone => {
                let index = classifier::parse_index(command, classifier::argument(line, command))?;
                self.manager.mark_done(index).map(Reply::say)
            }
            Command::Delete => {
                let index = classifier::parse_index(command, classifier::argument(line, command))?;
                self.manager.delete(index).map(Reply::say)
            }
            Command::Find => {
                let keyword = classifier::argument(line, command).unwrap_or_default();
                Ok(Reply::say(match self.manager.find(keyword)? {
                    Listing::Empty => format!("No tasks match \"{}\".", keyword),
                    Listing::Entries(lines) => format!(
                        "Here are the matching tasks in your list:\n{}",
                        lines.join("\n")
                    ),
                }))
            }
            Command::Add(tag) => {
                let (description, kind) = classifier::parse_task(line, tag)?;
                self.manager.add(description, kind).map(Reply::say)
            }
            Command::Unknown => Err(CommandError::InvalidCommand(
                UNKNOWN_COMMAND_MESSAGE.to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::StorageConfig;
    use crate::task::TaskKind;
    use std::io;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;

    /// Console keeping every released message
    #[derive(Default)]
    struct RecordingConsole {
        pending: Vec<String>,
        released: Vec<String>,
    }

    impl Console for RecordingConsole {
        fn say_later(&mut self, message: &str) {
            self.pending.push(message.to_string());
        }

        fn release(&mut self) -> io::Result<()> {
            self.released.append(&mut self.pending);
            Ok(())
        }
    }

    fn interpreter() -> Interpreter<RecordingConsole> {
        Interpreter::new(TaskListManager::new(), RecordingConsole::default())
    }

    fn lines(interpreter: &Interpreter<RecordingConsole>) -> Vec<String> {
        interpreter.manager().list_all().lines().to_vec()
    }

    #[test]
    fn test_handle_add_forms() {
        let mut interp = interpreter();

        interp.handle_line("read book").unwrap();
        interp.handle_line("todo write report").unwrap();
        interp.handle_line("deadline return book /by Sunday").unwrap();
        interp.handle_line("event meeting /at Mon 2pm").unwrap();

        assert_eq!(
            lines(&interp),
            vec![
                "1.[ ] read book",
                "2.[ ] write report",
                "3.[ ] return book (by: Sunday)",
                "4.[ ] meeting (at: Mon 2pm)",
            ]
        );
        assert_eq!(interp.manager().tasks()[1].kind(), &TaskKind::Todo);
    }

    #[test]
    fn test_handle_errors_by_kind() {
        let mut interp = interpreter();
        interp.handle_line("read book").unwrap();

        assert!(matches!(
            interp.handle_line(""),
            Err(CommandError::InvalidCommand(_))
        ));
        assert!(matches!(
            interp.handle_line("deadline no date"),
            Err(CommandError::InvalidCommand(_))
        ));
        assert!(matches!(
            interp.handle_line("todo   "),
            Err(CommandError::InvalidTask(_))
        ));
        assert!(matches!(
            interp.handle_line("done"),
            Err(CommandError::InvalidArgument(_))
        ));
        assert!(matches!(
            interp.handle_line("delete first"),
            Err(CommandError::InvalidArgument(_))
        ));
        assert!(matches!(
            interp.handle_line("find"),
            Err(CommandError::InvalidArgument(_))
        ));
        assert_eq!(
            interp.handle_line("done 2"),
            Err(CommandError::OutOfRange { index: 2, len: 1 })
        );
        assert_eq!(
            interp.handle_line("delete 0"),
            Err(CommandError::OutOfRange { index: 0, len: 1 })
        );

        assert_eq!(lines(&interp), vec!["1.[ ] read book"]);
    }

    #[test]
    fn test_handle_list_and_find_messages() {
        let mut interp = interpreter();

        assert_eq!(
            interp.handle_line("list").unwrap().message,
            "Your list is empty!"
        );

        interp.handle_line("read book").unwrap();
        interp.handle_line("write report").unwrap();

        assert_eq!(
            interp.handle_line("list").unwrap().message,
            "Here are the tasks in your list:\n1.[ ] read book\n2.[ ] write report"
        );
        assert_eq!(
            interp.handle_line("find report").unwrap().message,
            "Here are the matching tasks in your list:\n2.[ ] write report"
        );
        assert_eq!(
            interp.handle_line("find cake").unwrap().message,
            "No tasks match \"cake\"."
        );
    }

    #[test]
    fn test_find_keeps_leading_space_in_keyword() {
        let mut interp = interpreter();
        interp.handle_line("bookshelf").unwrap();
        interp.handle_line("read book").unwrap();

        assert_eq!(
            interp.handle_line("find  book").unwrap().message,
            "Here are the matching tasks in your list:\n2.[ ] read book"
        );
        assert_eq!(
            interp.handle_line("find book").unwrap().message,
            "Here are the matching tasks in your list:\n1.[ ] bookshelf\n2.[ ] read book"
        );

        interp.handle_line("done  2").unwrap();
        assert_eq!(lines(&interp), vec!["1.[ ] bookshelf", "2.[X] read book"]);
    }

    #[test]
    fn test_exit_reply() {
        let mut interp = interpreter();
        let reply = interp.handle_line("bye").unwrap();

        assert_eq!(reply.flow, Flow::Exit);
        assert_eq!(reply.message, EXIT_MESSAGE);
    }

    #[tokio::test]
    async fn test_run_stops_reading_after_exit() {
        let mut interp = interpreter();
        let mut input: &[u8] = b"todo a\nbye\ntodo b\n";

        interp.run(&mut input).await.unwrap();

        assert_eq!(lines(&interp), vec!["1.[ ] a"]);
        let mut rest = String::new();
        input.read_to_string(&mut rest).await.unwrap();
        assert_eq!(rest, "todo b\n");
        assert_eq!(
            interp.console().released.last().map(String::as_str),
            Some(EXIT_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_run_recovers_from_errors() {
        let mut interp = interpreter();
        let input: &[u8] = b"done 1\n\nread book\ndone x\ndone 1\nlist\n";

        interp.run(input).await.unwrap();

        let console = interp.into_console();
        assert_eq!(console.released.len(), 6);
        assert!(console.released[0].starts_with("Task 1 does not exist."));
        assert_eq!(console.released[1], UNKNOWN_COMMAND_MESSAGE);
        assert!(console.released[3].starts_with("Please enter an integer"));
        assert_eq!(
            console.released[5],
            "Here are the tasks in your list:\n1.[X] read book"
        );
    }

    #[tokio::test]
    async fn test_run_survives_invalid_utf8() {
        let mut interp = interpreter();
        let input: &[u8] = b"read book\n\xff\xfe bad\nwrite report\nbye\n";

        interp.run(input).await.unwrap();

        let tasks = interp.manager().tasks();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].description(), "read book");
        assert!(tasks[1].description().ends_with(" bad"));
        assert_eq!(tasks[2].description(), "write report");
        assert_eq!(
            interp.console().released.last().map(String::as_str),
            Some(EXIT_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_run_handles_crlf_lines() {
        let mut interp = interpreter();
        let input: &[u8] = b"read book\r\nlist\r\nbye\r\n";

        interp.run(input).await.unwrap();

        assert_eq!(lines(&interp), vec!["1.[ ] read book"]);
        assert_eq!(
            interp.console().released.last().map(String::as_str),
            Some(EXIT_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_exit_saves_with_autosave_off() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");
        let storage = Storage::new(&path, StorageConfig { autosave: false });
        let mut interp = interpreter().with_storage(storage);

        interp.step("read book").await.unwrap();
        assert!(!path.exists());

        let input: &[u8] = b"write report\nbye\n";
        interp.run(input).await.unwrap();

        let reloaded = Storage::new(&path, StorageConfig::default()).load().await;
        assert_eq!(reloaded, interp.manager().tasks());
        assert_eq!(reloaded.len(), 2);
    }

    #[tokio::test]
    async fn test_end_of_input_saves_with_autosave_off() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");
        let storage = Storage::new(&path, StorageConfig { autosave: false });
        let mut interp = interpreter().with_storage(storage);

        let input: &[u8] = b"read book\n";
        interp.run(input).await.unwrap();

        let reloaded = Storage::new(&path, StorageConfig::default()).load().await;
        assert_eq!(reloaded.len(), 1);
    }

    #[tokio::test]
    async fn test_step_saves_changes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");
        let mut interp = interpreter().with_storage(Storage::new(&path, StorageConfig::default()));

        interp.step("list").await.unwrap();
        assert!(!path.exists());

        interp.step("read book").await.unwrap();
        assert!(path.exists());

        let reloaded = Storage::new(&path, StorageConfig::default()).load().await;
        assert_eq!(reloaded, interp.manager().tasks());
    }
}
