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

//! Remote disk inspection.
//!
//! Runs `df` over SSH and parses its report into per-filesystem records.
//! Values stay as raw string tokens so unit suffixes survive.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::config::AppConfig;
use crate::error::{Error, Result};
use crate::parsing::common::parse_number;
use crate::ssh::{RemoteExecutor, SshOptions};

/// One line of a `df` report.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DiskRecord {
    pub device: String,
    pub blocks: String,
    pub used: String,
    pub available: String,
    pub percent: String,
    pub mountpoint: String,
}

impl DiskRecord {
    /// `blocks` as a number, when it carries no unit suffix.
    pub fn blocks_kib(&self) -> Option<u64> {
        parse_number(&self.blocks)
    }
}

/// Parse a header-less `df` report, in output order.
///
/// - A line holding only a device name is joined with the next line when
///   that line carries exactly the five usage columns (df wraps long device
///   names). Otherwise the lone name is dropped and the next line is parsed
///   on its own.
/// - Lines with fewer than six fields are skipped.
/// - Fields past the sixth are re-joined into the mount point.
pub fn parse_df_output(text: &str) -> Vec<DiskRecord> {
    let mut records = Vec::new();
    let mut pending_device: Option<String> = None;

    for line in text.lines() {
        let mut fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }

        let device = match pending_device.take() {
            Some(device) if fields.len() == 5 => device,
            pending => {
                if let Some(device) = pending {
                    debug!("Skipping df device without usage columns: {device}");
                }
                if fields.len() == 1 {
                    pending_device = Some(fields[0].to_string());
                    continue;
                }
                fields.remove(0).to_string()
            }
        };

        if fields.len() < 5 {
            debug!("Skipping incomplete df line: {line:?}");
            continue;
        }

        records.push(DiskRecord {
            device,
            blocks: fields[0].to_string(),
            used: fields[1].to_string(),
            available: fields[2].to_string(),
            percent: fields[3].to_string(),
            mountpoint: fields[4..].join(" "),
        });
    }

    if let Some(device) = pending_device {
        debug!("Skipping df device without usage columns: {device}");
    }

    records
}

/// The first record mounted at `mountpoint`.
pub fn find_mount<'a>(
    records: &'a [DiskRecord],
    mountpoint: &str,
) -> Option<&'a DiskRecord> {
    records
        .iter()
        .find(|record| record.mountpoint == mountpoint)
}

/// Reads disk layout from remote hosts.
pub struct DiskInspector {
    executor: RemoteExecutor,
}

impl Default for DiskInspector {
    fn default() -> Self {
        Self::new(RemoteExecutor::new())
    }
}

impl DiskInspector {
    pub fn new(executor: RemoteExecutor) -> Self {
        Self { executor }
    }

    /// All non-pseudo filesystems on `host`.
    pub fn disks(&self, host: &str, user: &str, options: &SshOptions) -> Result<Vec<DiskRecord>> {
        let output = self
            .executor
            .execute(host, user, AppConfig::DF_COMMAND, options)?;
        Ok(parse_df_output(&output))
    }

    /// Size in blocks of the filesystem mounted at `mountpoint`.
    pub fn mount_size(
        &self,
        host: &str,
        user: &str,
        mountpoint: &str,
        options: &SshOptions,
    ) -> Result<String> {
        let disks = self.disks(host, user, options)?;
        find_mount(&disks, mountpoint)
            .map(|record| record.blocks.clone())
            .ok_or_else(|| {
                Error::NotFound(format!("Could not find disk mounted at {mountpoint}"))
            })
    }

    /// Size in blocks of the persistent disk (`/var/vcap/store`).
    ///
    /// # Errors
    ///
    /// `Error::NotFound` when no filesystem is mounted there; SSH errors
    /// propagate unchanged.
    pub fn persistent_disk_size(
        &self,
        host: &str,
        user: &str,
        options: &SshOptions,
    ) -> Result<String> {
        let disks = self.disks(host, user, options)?;
        find_mount(&disks, AppConfig::PERSISTENT_DISK_MOUNT)
            .map(|record| record.blocks.clone())
            .ok_or_else(|| Error::NotFound("Could not find persistent disk size".to_string()))
    }
}
