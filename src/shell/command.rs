//! Running shell commands.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;

use crate::error::{Result, StepgateError};

/// Captured outcome of a shell command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Whether the command exited with status 0.
    pub success: bool,
}

/// Where a command runs.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory; the current directory when unset.
    pub cwd: Option<PathBuf>,

    /// Extra environment variables on top of the inherited environment.
    pub env: HashMap<String, String>,
}

/// Run `command` through `/bin/sh -c` (`cmd /C` on Windows), capturing
/// both output streams.
///
/// A non-zero exit is reported in the result. Only a shell that cannot be
/// started is an error.
pub fn execute(command: &str, options: &CommandOptions) -> Result<CommandResult> {
    let (shell, flag) = shell();
    let mut cmd = Command::new(shell);
    cmd.arg(flag).arg(command).envs(&options.env);

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    let output = cmd.output().map_err(|source| StepgateError::CommandFailed {
        command: command.to_string(),
        source,
    })?;

    Ok(CommandResult {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        success: output.status.success(),
    })
}

fn shell() -> (&'static str, &'static str) {
    if cfg!(target_os = "windows") {
        ("cmd", "/C")
    } else {
        ("/bin/sh", "-c")
    }
}
