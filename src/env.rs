//! Path constants for tdl.
//!
//! Centralizes the file and directory names used for the save file and the
//! configuration lookup.

use std::path::{Path, PathBuf};

/// Application directory name (hidden directory like .git, .vscode)
pub const TDL_DIR_NAME: &str = ".tdl";

/// Configuration file name inside the application directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration file name when placed directly in the working directory
pub const LOCAL_CONFIG_FILE_NAME: &str = "tdl.toml";

/// Save file name inside the application directory
pub const TASKS_FILE_NAME: &str = "tasks.json";

/// Suffix of the temporary file a save is written to before the rename
pub const TEMP_SUFFIX: &str = "tmp";

/// Build the .tdl directory path from a workspace root
pub fn tdl_dir_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(TDL_DIR_NAME)
}

/// Build the default save file path from a workspace root
pub fn tasks_file_path(workspace_root: &Path) -> PathBuf {
    tdl_dir_path(workspace_root).join(TASKS_FILE_NAME)
}

/// Build the temporary path used while saving `target`
pub fn temp_file_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(TEMP_SUFFIX);
    target.with_file_name(name)
}

/// Build config file path in user's home directory
pub fn user_config_file_path(home_dir: &Path) -> PathBuf {
    tdl_dir_path(home_dir).join(CONFIG_FILE_NAME)
}

/// Build config file path inside the current directory's .tdl directory
pub fn local_config_file_path(current_dir: &Path) -> PathBuf {
    tdl_dir_path(current_dir).join(CONFIG_FILE_NAME)
}
