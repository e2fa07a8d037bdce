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

//! VM name and state matching.
//!
//! Listings render instance names as `<job>/<index> (<qualifier>)`. The
//! name convention assumes job names never contain literal parentheses;
//! all matching goes through these types so that can be tightened in one
//! place.

use regex::Regex;

use crate::error::{Error, Result};
use crate::vm::VmRecord;

/// Matches `^<name> \(.*\)$` against a record's name column.
#[derive(Debug, Clone)]
pub struct VmNameMatcher {
    pattern: Regex,
}

impl VmNameMatcher {
    /// `name` is taken literally; regex metacharacters in it are escaped.
    pub fn new(name: &str) -> Result<Self> {
        let pattern = Regex::new(&format!(r"^{} \(.*\)$", regex::escape(name)))
            .map_err(|e| Error::Parse(format!("invalid vm name pattern for {name:?}: {e}")))?;
        Ok(Self { pattern })
    }

    pub fn matches_name(&self, vm_name: &str) -> bool {
        self.pattern.is_match(vm_name)
    }

    pub fn matches(&self, vm: &VmRecord) -> bool {
        vm.name().is_some_and(|name| self.matches_name(name))
    }
}

/// Searches a record's state column for a pattern.
#[derive(Debug, Clone)]
pub struct StateMatcher {
    pattern: Regex,
}

impl StateMatcher {
    /// Compile `state` as a regex, falling back to a literal search when it
    /// is not a valid one.
    pub fn new(state: &str) -> Self {
        let pattern = Regex::new(state).unwrap_or_else(|_| {
            Regex::new(&regex::escape(state)).expect("escaped pattern is valid")
        });
        Self { pattern }
    }

    pub fn matches_state(&self, state: &str) -> bool {
        self.pattern.is_match(state)
    }

    pub fn matches(&self, vm: &VmRecord) -> bool {
        vm.state().is_some_and(|state| self.matches_state(state))
    }
}
