//! Spawning the interpreter and waiting for it.

use std::{fmt, path::PathBuf};

use tokio::process::Command;
use tracing::{debug, info};

use crate::error::LauncherError;

pub mod python;

/// Show the child in a console of its own.
pub const CREATE_NEW_CONSOLE: u32 = 0x0000_0010;
/// Child inherits the launcher's software restriction level.
pub const CREATE_PRESERVE_CODE_AUTHZ_LEVEL: u32 = 0x0200_0000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl LaunchPlan {
    /// Single-string rendering, quoting elements that need it.
    pub fn command_line(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(quote(&self.program.to_string_lossy()));
        parts.extend(self.args.iter().map(|a| quote(a)));
        parts.join(" ")
    }
}

impl fmt::Display for LaunchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

fn quote(s: &str) -> String {
    if s.is_empty() || s.chars().any(|c| c.is_whitespace() || c == '"') {
        format!("\"{}\"", s.replace('"', "\\\""))
    } else {
        s.to_string()
    }
}

/// Process creation flags for the child.
#[cfg_attr(not(windows), allow(dead_code))]
pub fn creation_flags(new_console: bool) -> u32 {
    let mut flags = CREATE_PRESERVE_CODE_AUTHZ_LEVEL;
    if new_console {
        flags |= CREATE_NEW_CONSOLE;
    }
    flags
}

/// Spawns the plan and waits for the child to exit. Returns its exit code.
pub async fn launch(plan: &LaunchPlan, new_console: bool) -> Result<i32, LauncherError> {
    let mut cmd = Command::new(&plan.program);
    cmd.args(&plan.args).current_dir(&plan.working_dir);

    #[cfg(windows)]
    cmd.creation_flags(creation_flags(new_console));
    #[cfg(not(windows))]
    let _ = new_console;

    info!(command = %plan, dir = %plan.working_dir.display(), "starting");
    let mut child = cmd
        .spawn()
        .map_err(|e| LauncherError::from_io("CreateProcess", &e))?;
    debug!(pid = ?child.id(), "started");

    let status = child
        .wait()
        .await
        .map_err(|e| LauncherError::from_io("WaitForSingleObject", &e))?;
    info!(%status, "child exited");

    // A child killed by a signal has no code.
    Ok(status.code().unwrap_or(1))
}
