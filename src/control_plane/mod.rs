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

//! Control-plane command runner.
//!
//! This module provides the [`CommandRunner`] trait, the seam through which
//! observers reach the orchestration CLI, and [`CliRunner`], which invokes a
//! real binary through the shell.

use std::time::Duration;

use tracing::{debug, info};

use crate::common::config::AppConfig;
use crate::error::Result;
use crate::utils::command_executor::{execute_shell, CommandOptions};

/// Output of one control-plane invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    /// stdout followed by stderr.
    pub output: String,
    /// Process exit code, if the runner knows it.
    pub exit_code: Option<i32>,
}

impl RunOutput {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            exit_code: Some(0),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Trait for invoking the control-plane CLI.
///
/// Implementations must be thread-safe (`Send + Sync`) so observers can be
/// shared across test threads.
pub trait CommandRunner: Send + Sync {
    /// Run the CLI with `args` (a single shell-quoted argument string).
    fn run(&self, args: &str) -> Result<RunOutput>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, args: &str) -> Result<RunOutput> {
        (**self).run(args)
    }
}

impl<T: CommandRunner + ?Sized> CommandRunner for Box<T> {
    fn run(&self, args: &str) -> Result<RunOutput> {
        (**self).run(args)
    }
}

/// Runner that shells out to a control-plane binary.
///
/// # Example
///
/// ```rust,no_run
/// use bat_observe::control_plane::{CliRunner, CommandRunner};
///
/// let runner = CliRunner::new("bosh").arg("-n").arg("-e vbox");
/// let out = runner.run("vms --details")?;
/// println!("{}", out.output);
/// # Ok::<(), bat_observe::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct CliRunner {
    binary: String,
    fixed_args: Vec<String>,
    options: CommandOptions,
}

impl Default for CliRunner {
    fn default() -> Self {
        Self::new(AppConfig::DEFAULT_CLI_BINARY)
    }
}

impl CliRunner {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            fixed_args: Vec::new(),
            options: CommandOptions {
                timeout: Duration::from_secs(AppConfig::CLI_TIMEOUT_SECS),
                check_status: false,
            },
        }
    }

    /// Append an argument string placed before every invocation's own arguments.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.fixed_args.push(arg.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Fail with `Error::CommandFailed` on a non-zero exit instead of reporting it.
    pub fn check_status(mut self, check: bool) -> Self {
        self.options.check_status = check;
        self
    }

    /// The full command line for `args`.
    pub fn command_line(&self, args: &str) -> String {
        std::iter::once(self.binary.as_str())
            .chain(self.fixed_args.iter().map(String::as_str))
            .chain(std::iter::once(args))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl CommandRunner for CliRunner {
    fn run(&self, args: &str) -> Result<RunOutput> {
        let command_line = self.command_line(args);
        info!("--> {command_line}");

        let out = execute_shell(&command_line, &self.options)?;
        debug!("<-- exit={} output={:?}", out.status, out.combined());

        Ok(RunOutput {
            output: out.combined(),
            exit_code: Some(out.status),
        })
    }
}
