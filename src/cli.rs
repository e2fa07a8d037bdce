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

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::common::config::AppConfig;
use crate::ssh::SshOptions;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a pipe-delimited table and print its rows as JSON.
    Table(TableArgs),
    /// List VMs through the control-plane CLI as JSON.
    Vms(ControlPlaneArgs),
    /// Wait for a VM to appear, optionally in a given state.
    WaitVm(WaitVmArgs),
    /// Run a command on a remote host over SSH.
    Ssh(SshArgs),
    /// Print the persistent disk size of a remote host.
    Disk(DiskArgs),
    /// List the files inside a gzip-compressed tar archive.
    TarContents(TarContentsArgs),
}

#[derive(Args, Clone)]
pub struct TableArgs {
    /// Read the table from this file instead of stdin.
    #[arg(short, long)]
    pub file: Option<PathBuf>,
    /// Fail on rows whose field count differs from the header.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Clone)]
pub struct ControlPlaneArgs {
    /// The control-plane binary to invoke.
    #[arg(long, default_value = AppConfig::DEFAULT_CLI_BINARY)]
    pub cli: String,
    /// Arguments placed before every invocation (e.g. "-n", "-t 10.0.0.6").
    #[arg(long = "cli-arg", allow_hyphen_values = true)]
    pub cli_args: Vec<String>,
}

#[derive(Args, Clone)]
pub struct WaitVmArgs {
    /// VM name without its qualifier, e.g. "batlight/0".
    pub name: String,
    /// Required state (regular expression searched within the state column).
    #[arg(short, long)]
    pub state: Option<String>,
    /// Maximum number of listings.
    #[arg(short, long, default_value_t = AppConfig::DEFAULT_POLL_ATTEMPTS)]
    pub attempts: u32,
    /// Delay between listings in milliseconds.
    #[arg(short, long, default_value_t = AppConfig::DEFAULT_POLL_DELAY_MS)]
    pub delay_ms: u64,
    #[command(flatten)]
    pub control_plane: ControlPlaneArgs,
}

#[derive(Args, Clone)]
pub struct SshTargetArgs {
    /// Remote host address.
    pub host: String,
    /// Remote user.
    #[arg(short, long, default_value = AppConfig::DEFAULT_SSH_USER)]
    pub user: String,
    /// Private key used for key-based authentication.
    #[arg(long, env = AppConfig::SSH_PRIVATE_KEY_ENV)]
    pub private_key: Option<PathBuf>,
    /// Password for password authentication and sudo.
    #[arg(long, env = AppConfig::SSH_PASSWORD_ENV, hide_env_values = true)]
    pub password: Option<String>,
    /// Remote SSH port.
    #[arg(short, long, default_value_t = AppConfig::DEFAULT_SSH_PORT)]
    pub port: u16,
}

impl SshTargetArgs {
    pub fn options(&self) -> SshOptions {
        let mut options = SshOptions::new().port(self.port);
        if let Some(key) = &self.private_key {
            options = options.private_key(key);
        }
        if let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) {
            options = options.password(password);
        }
        options
    }
}

#[derive(Args, Clone)]
pub struct SshArgs {
    #[command(flatten)]
    pub target: SshTargetArgs,
    /// Command line to run remotely.
    pub command: String,
    /// Run the command through sudo, answering the prompt with the password.
    #[arg(long)]
    pub sudo: bool,
}

#[derive(Args, Clone)]
pub struct DiskArgs {
    #[command(flatten)]
    pub target: SshTargetArgs,
    /// Print every filesystem as JSON instead of the persistent disk size.
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Clone)]
pub struct TarContentsArgs {
    /// Archive to inspect. Defaults to the first *.tgz in the current directory.
    pub path: Option<PathBuf>,
    /// Print entry metadata as JSON instead of bare paths.
    #[arg(long)]
    pub details: bool,
}
