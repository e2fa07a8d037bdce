// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Standardized local command execution.
//
// Goals:
// - Centralize timeout behavior
// - Normalize stdout/stderr handling (UTF-8 lossy conversion)
// - Provide an optional status check

use std::process::Command;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::utils::command_timeout::run_command_with_timeout;

/// Options to control command execution behavior.
#[derive(Debug, Clone)]
pub struct CommandOptions {
    pub timeout: Duration,
    /// If true, non-zero exit statuses will return an error.
    pub check_status: bool,
}

impl Default for CommandOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            check_status: false,
        }
    }
}

/// Normalized command output.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Process exit code (or -1 if killed by a signal)
    pub status: i32,
    /// UTF-8 (lossy) decoded stdout
    pub stdout: String,
    /// UTF-8 (lossy) decoded stderr
    pub stderr: String,
}

impl CommandOutput {
    /// stdout followed by stderr.
    pub fn combined(&self) -> String {
        let mut combined = self.stdout.clone();
        combined.push_str(&self.stderr);
        combined
    }
}

/// Execute a prepared command. `description` names it in errors and logs.
///
/// - Timeouts become `Error::Timeout`
/// - Spawn failures are returned as `Error::Io`
/// - When options.check_status is true and exit code != 0, returns `Error::CommandFailed`
pub fn execute_command(
    command: Command,
    description: &str,
    options: &CommandOptions,
) -> Result<CommandOutput> {
    let output = run_command_with_timeout(command, options.timeout).map_err(|e| {
        if e.kind() == std::io::ErrorKind::TimedOut {
            Error::Timeout(format!("'{description}': {e}"))
        } else {
            Error::Io(e)
        }
    })?;

    let out = CommandOutput {
        status: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    };

    if options.check_status && out.status != 0 {
        return Err(Error::CommandFailed {
            command: description.to_string(),
            code: Some(out.status),
            output: out.combined(),
        });
    }

    Ok(out)
}

/// Run `script` through `sh -c`.
pub fn execute_shell(script: &str, options: &CommandOptions) -> Result<CommandOutput> {
    let mut command = Command::new("sh");
    command.arg("-c").arg(script);
    execute_command(command, script, options)
}
