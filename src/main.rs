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

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use bat_observe::archive::{find_log_bundle, ArchiveInspector};
use bat_observe::cli::{
    Cli, Commands, ControlPlaneArgs, DiskArgs, SshArgs, TableArgs, TarContentsArgs, WaitVmArgs,
};
use bat_observe::config::{AppConfig, PollConfig};
use bat_observe::control_plane::CliRunner;
use bat_observe::disk::DiskInspector;
use bat_observe::parsing::TableParser;
use bat_observe::ssh::RemoteExecutor;
use bat_observe::vm::VmObserver;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| AppConfig::DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Table(args) => run_table(&args),
        Commands::Vms(args) => run_vms(&args),
        Commands::WaitVm(args) => run_wait_vm(&args),
        Commands::Ssh(args) => run_ssh(&args),
        Commands::Disk(args) => run_disk(&args),
        Commands::TarContents(args) => run_tar_contents(&args),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn runner(args: &ControlPlaneArgs) -> CliRunner {
    args.cli_args
        .iter()
        .fold(CliRunner::new(&args.cli), |runner, arg| runner.arg(arg))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_table(args: &TableArgs) -> anyhow::Result<ExitCode> {
    let text = match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    let parser = if args.strict {
        TableParser::strict()
    } else {
        TableParser::new()
    };
    print_json(&parser.parse(&text)?)?;
    Ok(ExitCode::SUCCESS)
}

fn run_vms(args: &ControlPlaneArgs) -> anyhow::Result<ExitCode> {
    let vms = VmObserver::new(runner(args)).list_vms()?;
    print_json(&vms)?;
    Ok(ExitCode::SUCCESS)
}

fn run_wait_vm(args: &WaitVmArgs) -> anyhow::Result<ExitCode> {
    let observer = VmObserver::new(runner(&args.control_plane)).with_poll(
        PollConfig::new()
            .attempts(args.attempts)
            .delay(Duration::from_millis(args.delay_ms)),
    );

    let vm = match &args.state {
        Some(state) => observer.wait_for_vm_state(&args.name, state)?,
        None => observer.wait_for_vm(&args.name)?,
    };

    match vm {
        Some(vm) => {
            print_json(&vm)?;
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!(
                "{} not found after {} attempts",
                args.name,
                observer.poll_config().attempts
            );
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_ssh(args: &SshArgs) -> anyhow::Result<ExitCode> {
    let executor = RemoteExecutor::new();
    let target = &args.target;
    let options = target.options();
    let output = if args.sudo {
        executor.execute_sudo(&target.host, &target.user, &args.command, &options)?
    } else {
        executor.execute(&target.host, &target.user, &args.command, &options)?
    };
    print!("{output}");
    Ok(ExitCode::SUCCESS)
}

fn run_disk(args: &DiskArgs) -> anyhow::Result<ExitCode> {
    let inspector = DiskInspector::default();
    let options = args.target.options();
    if args.all {
        print_json(&inspector.disks(&args.target.host, &args.target.user, &options)?)?;
    } else {
        let size =
            inspector.persistent_disk_size(&args.target.host, &args.target.user, &options)?;
        println!("{size}");
    }
    Ok(ExitCode::SUCCESS)
}

fn run_tar_contents(args: &TarContentsArgs) -> anyhow::Result<ExitCode> {
    let path: PathBuf = match &args.path {
        Some(path) => path.clone(),
        None => find_log_bundle(".")?,
    };

    let inspector = ArchiveInspector::new();
    if args.details {
        print_json(&inspector.list_entry_details(&path)?)?;
    } else {
        for name in inspector.list_entries(&path)? {
            println!("{name}");
        }
    }
    Ok(ExitCode::SUCCESS)
}
