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

//! Log bundle inspection.
//!
//! Log bundles are gzip-compressed tar archives. The inspector lists the
//! regular files they contain, in archive order. Directories, links and
//! other special entries are left out.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use tar::Archive;
use tracing::debug;

use crate::common::config::AppConfig;
use crate::error::{Error, Result};

/// A regular-file entry of an archive.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path exactly as stored in the archive, e.g. `./current`.
    pub name: String,
    pub is_file: bool,
    pub size: u64,
    pub mode: u32,
}

/// Lists the contents of gzip-compressed tar archives.
///
/// Every call reopens the archive, so repeated calls on an unchanged file
/// return the same sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveInspector;

impl ArchiveInspector {
    pub fn new() -> Self {
        Self
    }

    /// Paths of the regular files in `path`.
    pub fn list_entries(&self, path: impl AsRef<Path>) -> Result<Vec<String>> {
        Ok(self
            .list_entry_details(path)?
            .into_iter()
            .map(|entry| entry.name)
            .collect())
    }

    /// Regular-file entries of `path` with their metadata.
    pub fn list_entry_details(&self, path: impl AsRef<Path>) -> Result<Vec<ArchiveEntry>> {
        let path = path.as_ref();
        debug!("Reading archive {}", path.display());

        let mut archive = Archive::new(GzDecoder::new(File::open(path)?));
        let mut entries = Vec::new();

        for entry in archive.entries()? {
            let entry = entry?;
            let header = entry.header();
            if !header.entry_type().is_file() {
                continue;
            }

            entries.push(ArchiveEntry {
                name: String::from_utf8_lossy(&entry.path_bytes()).to_string(),
                is_file: true,
                size: header.size()?,
                mode: header.mode()?,
            });
        }

        debug!("{} file entries in {}", entries.len(), path.display());
        Ok(entries)
    }
}

/// The first `*.tgz` file in `dir`, by file name.
///
/// Log downloads drop a single bundle into the working directory; sorting
/// keeps the choice stable when there are several.
pub fn find_log_bundle(dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let mut bundles: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext == AppConfig::LOG_BUNDLE_EXTENSION)
        })
        .collect();
    bundles.sort();

    bundles
        .into_iter()
        .next()
        .ok_or_else(|| Error::NotFound(format!("No log bundle found in {}", dir.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tar::{Builder, EntryType, Header};

    // `append_data` normalizes away the leading "./", so names are written raw.
    fn append(builder: &mut Builder<GzEncoder<File>>, name: &str, kind: EntryType, body: &[u8]) {
        let mut header = Header::new_gnu();
        header.as_old_mut().name[..name.len()].copy_from_slice(name.as_bytes());
        header.set_entry_type(kind);
        header.set_size(body.len() as u64);
        header.set_mode(if kind.is_dir() { 0o755 } else { 0o644 });
        header.set_cksum();
        builder.append(&header, body).unwrap();
    }

    fn write_bundle(path: &Path) {
        let file = File::create(path).unwrap();
        let mut builder = Builder::new(GzEncoder::new(file, Compression::default()));
        append(
            &mut builder,
            "./current",
            EntryType::Regular,
            b"agent log\n",
        );
        append(&mut builder, "./batlight/", EntryType::Directory, b"");
        append(
            &mut builder,
            "./batlight/batlight.stdout.log",
            EntryType::Regular,
            b"hello\n",
        );
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_list_entries_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.tgz");
        write_bundle(&path);

        let entries = ArchiveInspector::new().list_entries(&path).unwrap();
        assert_eq!(entries, vec!["./current", "./batlight/batlight.stdout.log"]);
    }

    #[test]
    fn test_list_entry_details() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.tgz");
        write_bundle(&path);

        let entries = ArchiveInspector::new().list_entry_details(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "./current");
        assert!(entries[0].is_file);
        assert_eq!(entries[0].size, 10);
        assert_eq!(entries[0].mode, 0o644);
    }

    #[test]
    fn test_list_entries_missing_file() {
        let err = ArchiveInspector::new()
            .list_entries("/nonexistent/logs.tgz")
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_find_log_bundle() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            find_log_bundle(dir.path()).unwrap_err(),
            Error::NotFound(_)
        ));

        File::create(dir.path().join("notes.txt")).unwrap();
        File::create(dir.path().join("b.tgz")).unwrap();
        File::create(dir.path().join("a.tgz")).unwrap();
        assert_eq!(
            find_log_bundle(dir.path()).unwrap(),
            dir.path().join("a.tgz")
        );
    }
}
