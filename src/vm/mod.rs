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

//! VM state observation through the control plane.
//!
//! [`VmObserver`] lists VMs with the control-plane CLI, parses the table and
//! re-polls until a VM appears or reaches a state. It never changes remote
//! state; it only waits for a change someone else triggered (start, stop,
//! recreate, a killed agent) to become visible.

pub mod matcher;

use std::thread;

use tracing::{debug, info};

use crate::common::config::{AppConfig, PollConfig};
use crate::control_plane::{CliRunner, CommandRunner};
use crate::error::Result;
use crate::parsing::table::{TableParser, TableRecord};

pub use matcher::{StateMatcher, VmNameMatcher};

/// One row of the VM listing.
///
/// Columns come from the listing header. Lookups need a name column
/// (`vm`, or `instance` on newer CLIs) and, for state queries, a state
/// column (`state`, or `process_state`).
pub type VmRecord = TableRecord;

const NAME_COLUMNS: [&str; 2] = ["vm", "instance"];
const STATE_COLUMNS: [&str; 2] = ["state", "process_state"];

impl TableRecord {
    /// The VM name cell, e.g. `batlight/0 (7c1e2a)`.
    pub fn name(&self) -> Option<&str> {
        NAME_COLUMNS.iter().find_map(|column| self.get(column))
    }

    /// The VM state cell, e.g. `running`.
    pub fn state(&self) -> Option<&str> {
        STATE_COLUMNS.iter().find_map(|column| self.get(column))
    }
}

/// Polls the control plane for VM presence and state.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use bat_observe::config::PollConfig;
/// use bat_observe::control_plane::CliRunner;
/// use bat_observe::vm::VmObserver;
///
/// let observer = VmObserver::new(CliRunner::new("bosh"))
///     .with_poll(PollConfig::new().attempts(10).delay(Duration::from_secs(3)));
/// match observer.wait_for_vm_state("batlight/0", "running")? {
///     Some(vm) => println!("{:?} is running", vm.name()),
///     None => eprintln!("batlight/0 never reached running"),
/// }
/// # Ok::<(), bat_observe::Error>(())
/// ```
pub struct VmObserver<R: CommandRunner = CliRunner> {
    runner: R,
    poll: PollConfig,
    parser: TableParser,
}

impl Default for VmObserver<CliRunner> {
    fn default() -> Self {
        Self::new(CliRunner::default())
    }
}

impl<R: CommandRunner> VmObserver<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            poll: PollConfig::default(),
            parser: TableParser::new(),
        }
    }

    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_parser(mut self, parser: TableParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn poll_config(&self) -> PollConfig {
        self.poll
    }

    /// List all VMs with one control-plane call.
    pub fn list_vms(&self) -> Result<Vec<VmRecord>> {
        let out = self.runner.run(AppConfig::LIST_VMS_ARGS)?;
        let table = out
            .output
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        self.parser.parse(&table)
    }

    /// The first listed VM named `name (...)`, from a single listing.
    pub fn find_vm(&self, name: &str) -> Result<Option<VmRecord>> {
        let matcher = VmNameMatcher::new(name)?;
        self.find(&matcher, None)
    }

    /// Poll until a VM named `name (...)` is listed.
    ///
    /// Returns `Ok(None)` when no attempt finds it. Control-plane errors
    /// abort immediately.
    pub fn wait_for_vm(&self, name: &str) -> Result<Option<VmRecord>> {
        info!("Start waiting for vm {name}");
        let matcher = VmNameMatcher::new(name)?;
        let vm = self.poll_until(&matcher, None)?;
        info!("Finished waiting for vm {name} vm={vm:?}");
        Ok(vm)
    }

    /// Poll until the VM named `name (...)` reports a state matching `state`.
    ///
    /// `state` is a regular expression searched within the state cell, so
    /// `"running"` also matches `"running (1 of 2)"`.
    pub fn wait_for_vm_state(&self, name: &str, state: &str) -> Result<Option<VmRecord>> {
        info!("Start waiting for vm {name} to have state {state}");
        let matcher = VmNameMatcher::new(name)?;
        let state_matcher = StateMatcher::new(state);
        let vm = self.poll_until(&matcher, Some(&state_matcher))?;
        info!("Finished waiting for vm {name} to have state={state} vm={vm:?}");
        Ok(vm)
    }

    fn find(
        &self,
        matcher: &VmNameMatcher,
        state: Option<&StateMatcher>,
    ) -> Result<Option<VmRecord>> {
        let vm = self
            .list_vms()?
            .into_iter()
            .find(|vm| matcher.matches(vm));

        Ok(match (vm, state) {
            (Some(vm), Some(state)) if !state.matches(&vm) => {
                debug!("vm {:?} is in state {:?}", vm.name(), vm.state());
                None
            }
            (vm, _) => vm,
        })
    }

    fn poll_until(
        &self,
        matcher: &VmNameMatcher,
        state: Option<&StateMatcher>,
    ) -> Result<Option<VmRecord>> {
        let attempts = self.poll.attempts.max(1);
        for attempt in 1..=attempts {
            if attempt > 1 && !self.poll.delay.is_zero() {
                thread::sleep(self.poll.delay);
            }
            if let Some(vm) = self.find(matcher, state)? {
                debug!("Matched {:?} on attempt {attempt}", vm.name());
                return Ok(Some(vm));
            }
            debug!("Attempt {attempt}/{attempts} found no match");
        }
        Ok(None)
    }
}
