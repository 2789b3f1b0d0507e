//! CLI-specific functionality for tdl
//!
//! This module contains argument parsing, configuration discovery, the
//! command classifier, the interpreter loop and the console front-end.

pub mod args;
pub mod classifier;
pub mod config;
pub mod interpreter;
pub mod ui;

pub use args::{Args, ExecutionMode, InteractiveConfig};
pub use classifier::{Command, classify};
pub use config::{ConfigDiscovery, ConfigError, TdlConfig};
pub use interpreter::{Flow, Interpreter, Reply};
pub use ui::{Console, ConsoleUi};
