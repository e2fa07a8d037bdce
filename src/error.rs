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

//! Unified error types for the bat-observe library.
//!
//! This module provides the error hierarchy shared by every observation
//! primitive: credential checks, SSH transport failures, missing entities,
//! malformed command output and local I/O.
//!
//! # Example
//!
//! ```rust,no_run
//! use bat_observe::{Error, Result};
//! use bat_observe::ssh::{RemoteExecutor, SshOptions};
//!
//! fn uptime(host: &str) -> Result<String> {
//!     let executor = RemoteExecutor::new();
//!     let options = SshOptions::new().password("c1oudc0w");
//!     executor.execute(host, "vcap", "uptime", &options)
//! }
//! ```

use thiserror::Error;

/// The main error type for bat-observe operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Required secret material is missing.
    ///
    /// Raised before any network attempt, e.g. when neither a private key
    /// nor a password is configured, or when sudo is requested without a
    /// password.
    #[error("Credential error: {0}")]
    Credential(String),

    /// The secure shell transport failed.
    ///
    /// Covers unreachable hosts, rejected authentication and protocol
    /// errors. These are never retried internally.
    #[error("Connection to {host} failed: {message}")]
    Connection { host: String, message: String },

    /// A well-formed response did not contain the expected entity.
    #[error("{0}")]
    NotFound(String),

    /// Command output could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A local command exited with a non-zero status while status checking
    /// was requested.
    #[error("Command failed: '{command}' (code: {code:?}) output: {output}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        output: String,
    },

    /// A command did not complete within its deadline.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn connection(host: &str, message: impl Into<String>) -> Self {
        Error::Connection {
            host: host.to_string(),
            message: message.into(),
        }
    }
}

/// A specialized Result type for bat-observe operations.
pub type Result<T> = std::result::Result<T, Error>;
