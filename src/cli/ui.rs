//! Console output
//!
//! Responses are queued and then released as one block framed between two
//! separator lines.

use std::io::{self, Write};

const SEPARATOR: &str =
    "    ____________________________________________________________";
const INDENT: &str = "     ";

/// Destination for every message the interpreter produces
pub trait Console {
    /// Queue a message to be shown on the next [`Console::release`]
    fn say_later(&mut self, message: &str);

    /// Show everything queued so far as one framed block
    fn release(&mut self) -> io::Result<()>;

    /// Queue `message` and release immediately
    fn say(&mut self, message: &str) -> io::Result<()> {
        self.say_later(message);
        self.release()
    }
}

/// Console writing framed blocks to any [`Write`] sink
pub struct ConsoleUi<W: Write> {
    out: W,
    buffer: Vec<String>,
}

impl ConsoleUi<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleUi<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            buffer: Vec::new(),
        }
    }

    /// Greeting shown once at startup
    pub fn welcome(&mut self) -> io::Result<()> {
        self.say("Hello! I'm tdl, your task list.\nWhat can I do for you?")
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Console for ConsoleUi<W> {
    fn say_later(&mut self, message: &str) {
        self.buffer.push(message.to_string());
    }

    fn release(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        writeln!(self.out, "{}", SEPARATOR)?;
        for message in self.buffer.drain(..) {
            for line in message.lines() {
                writeln!(self.out, "{}{}", INDENT, line)?;
            }
        }
        writeln!(self.out, "{}", SEPARATOR)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}
