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

//! The bat-observe prelude.
//!
//! ```rust
//! use bat_observe::prelude::*;
//! ```

// Error types
pub use crate::error::{Error, Result};

// Configuration
pub use crate::config::{AppConfig, PollConfig};

// Collaborator seams
pub use crate::control_plane::{CliRunner, CommandRunner, RunOutput};
pub use crate::ssh::{OpenSshTransport, SecureShell, SshAuth, SshOptions, SshRequest};

// Observers and inspectors
pub use crate::archive::{find_log_bundle, ArchiveEntry, ArchiveInspector};
pub use crate::disk::{DiskInspector, DiskRecord};
pub use crate::parsing::{parse_table, TableParser, TableRecord};
pub use crate::ssh::RemoteExecutor;
pub use crate::vm::{VmObserver, VmRecord};
