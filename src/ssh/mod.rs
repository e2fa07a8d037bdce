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

//! Remote command execution over a secure shell.
//!
//! - [`SshOptions`] carries credentials and timeouts for one call.
//! - [`SecureShell`] is the transport seam; [`OpenSshTransport`] drives the
//!   system OpenSSH client.
//! - [`RemoteExecutor`] validates credentials, logs, and delegates to a
//!   transport. It also offers sudo elevation.
//!
//! Host keys are never verified. Hosts under acceptance test are ephemeral
//! and get recycled addresses, so this transport must not be reused against
//! long-lived infrastructure unmodified.

pub mod executor;
pub mod transport;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::common::config::AppConfig;
use crate::error::{Error, Result};

pub use executor::RemoteExecutor;
pub use transport::OpenSshTransport;

/// How the transport authenticates.
#[derive(Clone, PartialEq, Eq)]
pub enum SshAuth {
    /// Key-based auth only.
    PrivateKey(PathBuf),
    Password(String),
}

impl fmt::Debug for SshAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SshAuth::PrivateKey(path) => f.debug_tuple("PrivateKey").field(path).finish(),
            SshAuth::Password(_) => f.write_str("Password(\"[REDACTED]\")"),
        }
    }
}

/// Credentials and limits for a remote command.
///
/// At least one of `private_key` or `password` must be set. When both are
/// set, authentication uses the key and the password only answers sudo
/// prompts.
#[derive(Clone, PartialEq, Eq)]
pub struct SshOptions {
    pub private_key: Option<PathBuf>,
    pub password: Option<String>,
    pub port: u16,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
}

impl Default for SshOptions {
    fn default() -> Self {
        Self {
            private_key: None,
            password: None,
            port: AppConfig::DEFAULT_SSH_PORT,
            connect_timeout: Duration::from_secs(AppConfig::SSH_CONNECT_TIMEOUT_SECS),
            command_timeout: Duration::from_secs(AppConfig::SSH_COMMAND_TIMEOUT_SECS),
        }
    }
}

impl fmt::Debug for SshOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshOptions")
            .field("private_key", &self.private_key)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("port", &self.port)
            .field("connect_timeout", &self.connect_timeout)
            .field("command_timeout", &self.command_timeout)
            .finish()
    }
}

impl SshOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `BAT_VCAP_PRIVATE_KEY` and `BAT_VCAP_PASSWORD`. Empty values count as unset.
    pub fn from_env() -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            private_key: read(AppConfig::SSH_PRIVATE_KEY_ENV).map(PathBuf::from),
            password: read(AppConfig::SSH_PASSWORD_ENV),
            ..Self::default()
        }
    }

    pub fn private_key(mut self, path: impl Into<PathBuf>) -> Self {
        self.private_key = Some(path.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Resolve the authentication method, preferring the key.
    pub fn auth(&self) -> Result<SshAuth> {
        match (&self.private_key, &self.password) {
            (Some(key), _) => Ok(SshAuth::PrivateKey(key.clone())),
            (None, Some(password)) => Ok(SshAuth::Password(password.clone())),
            (None, None) => Err(Error::Credential(
                "Need to set ssh password or private_key".to_string(),
            )),
        }
    }
}

/// A single command to run on a remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshRequest {
    pub host: String,
    pub user: String,
    pub command: String,
    pub auth: SshAuth,
    pub port: u16,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
}

/// Trait for secure shell transports.
///
/// `exec` opens a session, runs exactly one command, closes the session and
/// returns the captured output. Transport failures are `Error::Connection`
/// or `Error::Timeout`; a non-zero remote exit status is not an error.
pub trait SecureShell: Send + Sync {
    fn exec(&self, request: &SshRequest) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_requires_credentials() {
        let err = SshOptions::new().auth().unwrap_err();
        assert!(matches!(err, Error::Credential(_)));
    }

    #[test]
    fn test_auth_prefers_key() {
        let options = SshOptions::new()
            .password("c1oudc0w")
            .private_key("/tmp/id_rsa");
        assert_eq!(
            options.auth().unwrap(),
            SshAuth::PrivateKey(PathBuf::from("/tmp/id_rsa"))
        );
        let options = SshOptions::new().password("c1oudc0w");
        assert_eq!(
            options.auth().unwrap(),
            SshAuth::Password("c1oudc0w".to_string())
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let options = SshOptions::new().password("c1oudc0w");
        let debug = format!("{options:?}");
        assert!(!debug.contains("c1oudc0w"));
        assert!(debug.contains("[REDACTED]"));

        let auth = format!("{:?}", options.auth().unwrap());
        assert!(!auth.contains("c1oudc0w"));
    }
}
