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

//! Transport backed by the system OpenSSH client.

use std::ffi::OsString;
use std::process::Command;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::ssh::{SecureShell, SshAuth, SshRequest};
use crate::utils::command_executor::{execute_command, CommandOptions, CommandOutput};

/// Exit status the OpenSSH client reserves for its own failures.
const SSH_CLIENT_ERROR: i32 = 255;
/// sshpass: invalid or incorrect password.
const SSHPASS_BAD_PASSWORD: i32 = 5;
/// sshpass: host public key is unknown or changed.
const SSHPASS_HOST_KEY: i32 = 6;

/// stderr lines the OpenSSH client itself prints when a session fails.
const CLIENT_DIAGNOSTIC_PATTERN: &str = concat!(
    r"(?m)^(ssh: |kex_exchange_identification: |Host key verification failed",
    r"|Connection (closed|reset|timed out)|Received disconnect from )",
    r"|: Permission denied \(",
);

static CLIENT_DIAGNOSTIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(CLIENT_DIAGNOSTIC_PATTERN).expect("valid regex"));

/// Runs commands through `ssh`, or `sshpass -e ssh` for password auth.
///
/// The password reaches `sshpass` through the `SSHPASS` environment
/// variable, never the argument list.
///
/// Exit status 255 is shared by the client and by a remote command that
/// exits 255. It is reported as `Error::Connection` only when stderr carries
/// an OpenSSH client diagnostic (`ssh: connect to host ...`, `Permission
/// denied (...)`, `Host key verification failed` and the like) or the run
/// produced no output at all. Otherwise the output is returned like any
/// other remote exit status.
#[derive(Debug, Clone)]
pub struct OpenSshTransport {
    ssh_binary: String,
    sshpass_binary: String,
}

impl Default for OpenSshTransport {
    fn default() -> Self {
        Self {
            ssh_binary: "ssh".to_string(),
            sshpass_binary: "sshpass".to_string(),
        }
    }
}

impl OpenSshTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binaries(ssh: impl Into<String>, sshpass: impl Into<String>) -> Self {
        Self {
            ssh_binary: ssh.into(),
            sshpass_binary: sshpass.into(),
        }
    }

    /// Arguments passed to the ssh client itself.
    pub fn ssh_args(&self, request: &SshRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        let mut opt = |value: String| {
            args.push("-o".into());
            args.push(value.into());
        };

        // No known_hosts verification.
        opt("StrictHostKeyChecking=no".to_string());
        opt("UserKnownHostsFile=/dev/null".to_string());
        opt("LogLevel=ERROR".to_string());
        opt(format!(
            "ConnectTimeout={}",
            request.connect_timeout.as_secs().max(1)
        ));

        match &request.auth {
            SshAuth::PrivateKey(_) => {
                opt("IdentitiesOnly=yes".to_string());
                opt("PasswordAuthentication=no".to_string());
                opt("KbdInteractiveAuthentication=no".to_string());
                opt("BatchMode=yes".to_string());
            }
            SshAuth::Password(_) => {
                opt("PubkeyAuthentication=no".to_string());
                opt("PreferredAuthentications=password,keyboard-interactive".to_string());
            }
        }

        if let SshAuth::PrivateKey(key) = &request.auth {
            args.push("-i".into());
            args.push(key.clone().into_os_string());
        }

        args.push("-T".into());
        args.push("-p".into());
        args.push(request.port.to_string().into());
        args.push("-l".into());
        args.push(request.user.clone().into());
        args.push(request.host.clone().into());
        args.push(request.command.clone().into());
        args
    }

    /// Build the local process for `request`.
    pub fn build_command(&self, request: &SshRequest) -> Command {
        match &request.auth {
            SshAuth::PrivateKey(_) => {
                let mut command = Command::new(&self.ssh_binary);
                command.args(self.ssh_args(request));
                command
            }
            SshAuth::Password(password) => {
                let mut command = Command::new(&self.sshpass_binary);
                command
                    .arg("-e")
                    .arg(&self.ssh_binary)
                    .args(self.ssh_args(request))
                    .env("SSHPASS", password);
                command
            }
        }
    }

    fn classify_exit(request: &SshRequest, out: &CommandOutput) -> Option<String> {
        let detail = out.stderr.trim();
        match (&request.auth, out.status) {
            (_, SSH_CLIENT_ERROR) if detail.is_empty() && out.stdout.trim().is_empty() => {
                Some("ssh client exited with status 255".to_string())
            }
            (_, SSH_CLIENT_ERROR) if CLIENT_DIAGNOSTIC.is_match(&out.stderr) => {
                Some(detail.to_string())
            }
            (SshAuth::Password(_), SSHPASS_BAD_PASSWORD) => {
                Some("password authentication rejected".to_string())
            }
            (SshAuth::Password(_), SSHPASS_HOST_KEY) => {
                Some("host public key is unknown or changed".to_string())
            }
            _ => None,
        }
    }
}

impl SecureShell for OpenSshTransport {
    fn exec(&self, request: &SshRequest) -> Result<String> {
        let command = self.build_command(request);
        let description = format!("ssh {}@{}", request.user, request.host);
        let options = CommandOptions {
            timeout: request.command_timeout,
            check_status: false,
        };

        let out = execute_command(command, &description, &options).map_err(|e| match e {
            Error::Io(io) => Error::connection(
                &request.host,
                format!("failed to start ssh client: {io}"),
            ),
            other => other,
        })?;

        debug!("{description} exited with status {}", out.status);
        if let Some(message) = Self::classify_exit(request, &out) {
            return Err(Error::connection(&request.host, message));
        }

        Ok(out.combined())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn request(auth: SshAuth) -> SshRequest {
        SshRequest {
            host: "10.244.0.2".to_string(),
            user: "vcap".to_string(),
            command: "uname -a".to_string(),
            auth,
            port: 22,
            connect_timeout: Duration::from_secs(30),
            command_timeout: Duration::from_secs(60),
        }
    }

    fn args_of(command: &Command) -> Vec<String> {
        command
            .get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_key_auth_command() {
        let transport = OpenSshTransport::new();
        let command = transport.build_command(&request(SshAuth::PrivateKey(PathBuf::from(
            "/keys/bosh.pem",
        ))));
        assert_eq!(command.get_program(), "ssh");

        let args = args_of(&command);
        assert!(args.contains(&"StrictHostKeyChecking=no".to_string()));
        assert!(args.contains(&"UserKnownHostsFile=/dev/null".to_string()));
        assert!(args.contains(&"PasswordAuthentication=no".to_string()));
        assert!(args.windows(2).any(|w| w == ["-i", "/keys/bosh.pem"]));
        assert!(args.windows(2).any(|w| w == ["-l", "vcap"]));
        assert_eq!(&args[args.len() - 2..], ["10.244.0.2", "uname -a"]);
    }

    #[test]
    fn test_password_auth_command_keeps_secret_out_of_args() {
        let transport = OpenSshTransport::new();
        let command = transport.build_command(&request(SshAuth::Password("c1oudc0w".into())));
        assert_eq!(command.get_program(), "sshpass");

        let args = args_of(&command);
        assert_eq!(&args[..2], ["-e", "ssh"]);
        assert!(args.contains(&"PubkeyAuthentication=no".to_string()));
        assert!(!args.iter().any(|a| a.contains("c1oudc0w")));
        assert!(command
            .get_envs()
            .any(|(k, v)| k == "SSHPASS" && v.map(|v| v == "c1oudc0w").unwrap_or(false)));
    }

    fn output(status: i32, stdout: &str, stderr: &str) -> CommandOutput {
        CommandOutput {
            status,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn test_exit_classification() {
        let key = request(SshAuth::PrivateKey(PathBuf::from("/k")));
        let password = request(SshAuth::Password("p".into()));

        let refused = output(
            255,
            "",
            "ssh: connect to host 10.244.0.2 port 22: Connection refused\n",
        );
        assert_eq!(
            OpenSshTransport::classify_exit(&key, &refused).as_deref(),
            Some("ssh: connect to host 10.244.0.2 port 22: Connection refused")
        );
        let denied = output(255, "", "vcap@10.244.0.2: Permission denied (publickey).\n");
        assert!(OpenSshTransport::classify_exit(&key, &denied).is_some());
        assert!(OpenSshTransport::classify_exit(&key, &output(255, "", "")).is_some());
        assert!(OpenSshTransport::classify_exit(&password, &output(5, "", "")).is_some());
        // Remote commands may exit 5 themselves when sshpass is not involved.
        assert!(OpenSshTransport::classify_exit(&key, &output(5, "", "")).is_none());
        assert!(OpenSshTransport::classify_exit(&key, &output(1, "", "")).is_none());
    }

    #[test]
    fn test_remote_exit_255_keeps_output() {
        let key = request(SshAuth::PrivateKey(PathBuf::from("/k")));

        let remote = output(255, "partial\n", "");
        assert!(OpenSshTransport::classify_exit(&key, &remote).is_none());
        let remote = output(255, "", "agent: fatal error\n");
        assert!(OpenSshTransport::classify_exit(&key, &remote).is_none());

        let host_key = output(255, "", "Host key verification failed.\n");
        assert!(OpenSshTransport::classify_exit(&key, &host_key).is_some());
    }

    #[cfg(unix)]
    #[test]
    fn test_remote_exit_255_returned_through_exec() {
        use std::os::unix::fs::PermissionsExt;

        // Stand-in client: the "remote" command prints and exits 255.
        let dir = tempfile::tempdir().unwrap();
        let client = dir.path().join("fake-ssh");
        std::fs::write(
            &client,
            "#!/bin/sh\necho partial\necho 'agent: fatal error' 1>&2\nexit 255\n",
        )
        .unwrap();
        std::fs::set_permissions(&client, std::fs::Permissions::from_mode(0o755)).unwrap();

        let transport = OpenSshTransport::with_binaries(client.to_string_lossy(), "sshpass");
        let out = transport
            .exec(&request(SshAuth::PrivateKey(PathBuf::from("/k"))))
            .unwrap();
        assert_eq!(out, "partial\nagent: fatal error\n");
    }

    #[test]
    fn test_missing_client_is_connection_error() {
        let transport = OpenSshTransport::with_binaries(
            "definitely-not-ssh-bat-observe",
            "definitely-not-sshpass-bat-observe",
        );
        let err = transport
            .exec(&request(SshAuth::PrivateKey(PathBuf::from("/k"))))
            .unwrap_err();
        assert!(matches!(err, Error::Connection { .. }));
    }
}
