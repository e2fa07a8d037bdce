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

use std::io;
use std::process::{Command, Output, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Run a prepared command with a timeout, capturing stdout and stderr.
///
/// Returns Ok(Output) if the command completes within the timeout.
/// On unix the child leads its own process group. On timeout the whole group
/// is killed (so `sh -c` or `sshpass` grandchildren go with it) and an
/// `io::ErrorKind::TimedOut` error is returned; a failure to spawn is
/// returned as-is.
pub fn run_command_with_timeout(mut command: Command, timeout: Duration) -> io::Result<Output> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let child = command.spawn()?;
    let pid = child.id();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let _ = tx.send(child.wait_with_output());
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(_) => {
            kill_process_group(pid);
            Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("Command timed out after {timeout:?}"),
            ))
        }
    }
}

#[cfg(unix)]
fn kill_process_group(pid: u32) {
    // The child was spawned with process_group(0), so its pgid equals its pid.
    // SAFETY: kill(2) on a group we created; a stale group only yields ESRCH.
    unsafe {
        libc::kill(-(pid as libc::pid_t), libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {}
