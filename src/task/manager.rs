use crate::task::types::*;
use tracing::{debug, info};

/// Owner of the ordered task list.
///
/// All reads and writes of tasks go through this type. Indices taken by the
/// mutating operations are the 1-based positions shown to the user, and every
/// operation validates before it mutates, so a failed call leaves the list
/// untouched.
#[derive(Debug, Default)]
pub struct TaskListManager {
    tasks: Vec<Task>,
    revision: u64,
}

impl TaskListManager {
    /// Create an empty task list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append previously saved tasks, keeping their order.
    ///
    /// Used once at startup; it does not count as a change that needs saving.
    pub fn extend(&mut self, tasks: impl IntoIterator<Item = Task>) {
        let before = self.tasks.len();
        self.tasks.extend(tasks);
        info!("Reloaded {} tasks", self.tasks.len() - before);
    }

    /// Add a new task built from `description` and `kind`
    pub fn add(
        &mut self,
        description: impl AsRef<str>,
        kind: TaskKind,
    ) -> Result<String, CommandError> {
        let task = Task::new(description, kind)?;
        let line = task.render_line();
        self.tasks.push(task);
        self.touch();

        debug!("Added task {}: {}", self.tasks.len(), line);
        Ok(format!(
            "Got it. I've added this task:\n  {}\n{}",
            line,
            self.count_message()
        ))
    }

    /// Every task, rendered and numbered in list order
    pub fn list_all(&self) -> Listing {
        if self.tasks.is_empty() {
            return Listing::Empty;
        }

        Listing::Entries(
            self.tasks
                .iter()
                .enumerate()
                .map(|(i, task)| numbered(i, task))
                .collect(),
        )
    }

    /// Mark the task at `index` as done
    pub fn mark_done(&mut self, index: i64) -> Result<String, CommandError> {
        let position = self.position(index)?;
        let task = &mut self.tasks[position];
        let already_done = task.is_done();
        task.mark_done();
        let line = task.render_line();

        if !already_done {
            self.touch();
        }

        debug!("Marked task {} as done", index);
        Ok(format!("Nice! I've marked this task as done:\n  {}", line))
    }

    /// Remove the task at `index`; later tasks move up by one
    pub fn delete(&mut self, index: i64) -> Result<String, CommandError> {
        let position = self.position(index)?;
        let removed = self.tasks.remove(position);
        self.touch();

        debug!("Deleted task {}: {}", index, removed.render_line());
        Ok(format!(
            "Noted. I've removed this task:\n  {}\n{}",
            removed.render_line(),
            self.count_message()
        ))
    }

    /// Tasks whose rendered text contains `keyword`, with their list indices.
    ///
    /// Matching is case-sensitive and includes the kind decoration.
    pub fn find(&self, keyword: &str) -> Result<Listing, CommandError> {
        if keyword.is_empty() {
            return Err(CommandError::InvalidArgument(
                "You need to specify a keyword to find.".to_string(),
            ));
        }

        let matches: Vec<String> = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| task.display_text().contains(keyword))
            .map(|(i, task)| numbered(i, task))
            .collect();

        debug!("Found {} tasks matching {:?}", matches.len(), keyword);
        if matches.is_empty() {
            Ok(Listing::Empty)
        } else {
            Ok(Listing::Entries(matches))
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Counter bumped by every change to the list contents
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Map a 1-based user index to a vector position
    fn position(&self, index: i64) -> Result<usize, CommandError> {
        let len = self.tasks.len();
        match usize::try_from(index) {
            Ok(i) if (1..=len).contains(&i) => Ok(i - 1),
            _ => Err(CommandError::OutOfRange { index, len }),
        }
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn count_message(&self) -> String {
        match self.tasks.len() {
            1 => "Now you have 1 task in the list.".to_string(),
            n => format!("Now you have {} tasks in the list.", n),
        }
    }
}

fn numbered(i: usize, task: &Task) -> String {
    format!("{}.{}", i + 1, task.render_line())
}
