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

//! Integration tests for VM polling against a scripted control plane.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use bat_observe::prelude::*;

const HEADER: &str = "\
+---------------------+---------+----+
| VM                  | State   | AZ |
+---------------------+---------+----+";

fn listing(rows: &[(&str, &str)]) -> String {
    let mut out = format!("Acting as user 'admin' on 'micro'\n\n{HEADER}\n");
    for (vm, state) in rows {
        out.push_str(&format!("| {vm} | {state} | z1 |\n"));
    }
    out.push_str("+---------------------+---------+----+\n\nVMs total: ");
    out.push_str(&rows.len().to_string());
    out.push('\n');
    out
}

/// Replays canned listings in order, repeating the last one.
struct ScriptedRunner {
    outputs: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl ScriptedRunner {
    fn new(outputs: Vec<String>) -> Self {
        Self {
            outputs: Mutex::new(outputs.into()),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, args: &str) -> Result<RunOutput> {
        assert_eq!(args, "vms --details");
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut outputs = self.outputs.lock().unwrap();
        let output = if outputs.len() > 1 {
            outputs.pop_front().unwrap_or_default()
        } else {
            outputs.front().cloned().unwrap_or_default()
        };
        Ok(RunOutput::new(output))
    }
}

struct FailingRunner;

impl CommandRunner for FailingRunner {
    fn run(&self, _args: &str) -> Result<RunOutput> {
        Err(Error::Timeout("'bosh vms --details': timed out".to_string()))
    }
}

fn fast() -> PollConfig {
    PollConfig::new().no_delay()
}

#[test]
fn test_list_vms_parses_listing() {
    let runner = ScriptedRunner::new(vec![listing(&[
        ("batlight/0 (7c1e2a)", "running"),
        ("batlight/1 (0a55be)", "stopped"),
    ])]);
    let vms = VmObserver::new(&runner).list_vms().unwrap();
    assert_eq!(vms.len(), 2);
    assert_eq!(vms[0].name(), Some("batlight/0 (7c1e2a)"));
    assert_eq!(vms[1].state(), Some("stopped"));
    assert_eq!(vms[1].get("az"), Some("z1"));
}

#[test]
fn test_wait_for_vm_found_on_first_attempt() {
    let runner = ScriptedRunner::new(vec![listing(&[("batlight (7c1e2a)", "running")])]);
    let vm = VmObserver::new(&runner)
        .with_poll(fast())
        .wait_for_vm("batlight")
        .unwrap()
        .expect("vm should be found");
    assert_eq!(vm.name(), Some("batlight (7c1e2a)"));
    assert_eq!(runner.calls(), 1);
}

#[test]
fn test_wait_for_vm_appears_later() {
    let runner = ScriptedRunner::new(vec![
        listing(&[]),
        "No VMs".to_string(),
        listing(&[("batlight/0 (7c1e2a)", "starting")]),
    ]);
    let vm = VmObserver::new(&runner)
        .with_poll(fast())
        .wait_for_vm("batlight/0")
        .unwrap();
    assert!(vm.is_some());
    assert_eq!(runner.calls(), 3);
}

#[test]
fn test_wait_for_vm_gives_up_after_five_attempts() {
    let runner = ScriptedRunner::new(vec![listing(&[("other/0 (1)", "running")])]);
    let vm = VmObserver::new(&runner)
        .with_poll(fast())
        .wait_for_vm("batlight/0")
        .unwrap();
    assert!(vm.is_none());
    assert_eq!(runner.calls(), 5);
}

#[test]
fn test_wait_for_vm_state_returns_first_matching_attempt() {
    let runner = ScriptedRunner::new(vec![
        listing(&[("batlight/0 (7c1e2a)", "stopped")]),
        listing(&[("batlight/0 (7c1e2a)", "starting")]),
        listing(&[("batlight/0 (7c1e2a)", "running")]),
        listing(&[("batlight/0 (7c1e2a)", "failing")]),
    ]);
    let vm = VmObserver::new(&runner)
        .with_poll(fast())
        .wait_for_vm_state("batlight/0", "running")
        .unwrap()
        .expect("vm should reach running");
    assert_eq!(vm.state(), Some("running"));
    assert_eq!(runner.calls(), 3);
}

#[test]
fn test_wait_for_vm_state_never_reached() {
    let runner = ScriptedRunner::new(vec![listing(&[("batlight/0 (7c1e2a)", "stopped")])]);
    let vm = VmObserver::new(&runner)
        .with_poll(fast())
        .wait_for_vm_state("batlight/0", "running")
        .unwrap();
    assert!(vm.is_none());
    assert_eq!(runner.calls(), 5);
}

#[test]
fn test_custom_attempts() {
    let runner = ScriptedRunner::new(vec![listing(&[])]);
    let vm = VmObserver::new(&runner)
        .with_poll(fast().attempts(2))
        .wait_for_vm("batlight/0")
        .unwrap();
    assert!(vm.is_none());
    assert_eq!(runner.calls(), 2);
}

#[test]
fn test_zero_attempts_in_struct_literal_still_polls_once() {
    let runner = ScriptedRunner::new(vec![listing(&[("batlight/0 (7c1e2a)", "running")])]);
    let vm = VmObserver::new(&runner)
        .with_poll(PollConfig {
            attempts: 0,
            delay: Duration::ZERO,
        })
        .wait_for_vm("batlight/0")
        .unwrap();
    assert!(vm.is_some());
    assert_eq!(runner.calls(), 1);
}

#[test]
fn test_delay_between_attempts() {
    let runner = ScriptedRunner::new(vec![listing(&[])]);
    let start = Instant::now();
    VmObserver::new(&runner)
        .with_poll(
            PollConfig::new()
                .attempts(3)
                .delay(Duration::from_millis(50)),
        )
        .wait_for_vm("batlight/0")
        .unwrap();
    // Two delays: none before the first attempt, none after the last.
    assert!(start.elapsed() >= Duration::from_millis(100));
    assert_eq!(runner.calls(), 3);
}

#[test]
fn test_runner_errors_abort_polling() {
    let err = VmObserver::new(FailingRunner)
        .with_poll(fast())
        .wait_for_vm("batlight/0")
        .unwrap_err();
    assert!(matches!(err, Error::Timeout(_)));
}

#[test]
fn test_strict_parser_rejects_ragged_listing() {
    let runner = ScriptedRunner::new(vec!["| VM | State |\n| batlight/0 (1) |\n".to_string()]);
    let err = VmObserver::new(&runner)
        .with_parser(TableParser::strict())
        .list_vms()
        .unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}
