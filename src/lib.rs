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

//! Observation and parsing primitives for VM orchestration acceptance tests.
//!
//! - [`parsing`]: pipe-delimited table parsing into ordered records
//! - [`vm`]: polling the control plane until a VM appears or reaches a state
//! - [`ssh`]: remote command execution with key/password auth and sudo
//! - [`disk`]: remote `df` inspection and persistent disk lookup
//! - [`archive`]: listing files inside gzip-compressed tar log bundles

#[macro_use]
pub mod utils;
pub mod archive;
pub mod cli;
pub mod control_plane;
pub mod disk;
pub mod error;
pub mod parsing;
pub mod prelude;
pub mod ssh;
pub mod vm;

pub mod common {
    pub mod config;
}
pub use common::config;

pub use error::{Error, Result};
