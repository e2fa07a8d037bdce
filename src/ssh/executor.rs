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

//! Credential-checked remote execution with optional sudo elevation.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::ssh::{OpenSshTransport, SecureShell, SshOptions, SshRequest};

/// Characters that escape the unquoted `echo <password>` in a sudo pipeline.
static SHELL_SPECIAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\s'"`$\\|&;<>(){}*?!#~]"#).expect("valid regex"));

/// Runs one command per call on a remote host.
///
/// Each call opens its own session through the transport and closes it
/// before returning; nothing is pooled or shared between calls.
///
/// # Example
///
/// ```rust,no_run
/// use bat_observe::ssh::{RemoteExecutor, SshOptions};
///
/// let executor = RemoteExecutor::new();
/// let options = SshOptions::from_env();
/// let out = executor.execute_sudo("10.244.0.2", "vcap", "pkill -9 agent", &options)?;
/// println!("{out}");
/// # Ok::<(), bat_observe::Error>(())
/// ```
pub struct RemoteExecutor {
    transport: Box<dyn SecureShell>,
}

impl Default for RemoteExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteExecutor {
    /// Executor using the system OpenSSH client.
    pub fn new() -> Self {
        Self::with_transport(OpenSshTransport::new())
    }

    pub fn with_transport(transport: impl SecureShell + 'static) -> Self {
        Self {
            transport: Box::new(transport),
        }
    }

    /// Run `command` as `user` on `host` and return stdout followed by stderr.
    ///
    /// # Errors
    ///
    /// `Error::Credential` when neither a key nor a password is configured
    /// (checked before connecting). Transport failures propagate unchanged
    /// and are not retried.
    pub fn execute(
        &self,
        host: &str,
        user: &str,
        command: &str,
        options: &SshOptions,
    ) -> Result<String> {
        self.run(host, user, command, command, options)
    }

    /// Run `command` through `sudo`, answering its prompt with the password.
    ///
    /// The remote command line is `echo <password> | sudo -p '' -S <command>`.
    /// The password is interpolated verbatim, so it must not contain
    /// characters the remote shell would interpret.
    ///
    /// # Errors
    ///
    /// `Error::Credential` when no password is configured, even if a key is.
    pub fn execute_sudo(
        &self,
        host: &str,
        user: &str,
        command: &str,
        options: &SshOptions,
    ) -> Result<String> {
        let password = options
            .password
            .as_deref()
            .ok_or_else(|| Error::Credential("Need to set sudo password".to_string()))?;

        if SHELL_SPECIAL.is_match(password) {
            warn!("sudo password contains shell metacharacters; the remote command may break");
        }

        let remote = sudo_command(password, command);
        let shown = sudo_command("[REDACTED]", command);
        self.run(host, user, &remote, &shown, options)
    }

    fn run(
        &self,
        host: &str,
        user: &str,
        command: &str,
        shown: &str,
        options: &SshOptions,
    ) -> Result<String> {
        info!("--> ssh: {user}@{host} {shown:?}");
        let auth = options.auth()?;
        debug!("--> ssh options: {options:?}");

        let request = SshRequest {
            host: host.to_string(),
            user: user.to_string(),
            command: command.to_string(),
            auth,
            port: options.port,
            connect_timeout: options.connect_timeout,
            command_timeout: options.command_timeout,
        };
        let output = self.transport.exec(&request)?;

        info!("--> ssh output: {output:?}");
        Ok(output)
    }
}

fn sudo_command(password: &str, command: &str) -> String {
    format!("echo {password} | sudo -p '' -S {command}")
}
