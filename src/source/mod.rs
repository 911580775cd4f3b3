//! Running-process enumeration
//!
//! The tracker never talks to the OS directly; it only sees the names a
//! [`SnapshotSource`] reports. Processes that vanish or can't be read while the
//! list is built are simply left out.

use crate::data::TrackedName;
use anyhow::Result;
use std::collections::HashSet;
use std::path::Path;
use sysinfo::{Process, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};

/// Linux keeps at most this many bytes of a process name (`TASK_COMM_LEN - 1`)
const COMM_MAX_LEN: usize = 15;

/// Something that can list the names of currently running processes
pub trait SnapshotSource: Send {
    /// Names of all running processes. An `Err` means the whole list was
    /// unavailable this time round.
    fn list_process_names(&mut self) -> Result<HashSet<String>>;
}

/// Process list from the operating system via `sysinfo`
pub struct SystemProcesses {
    system: System,
}

impl SystemProcesses {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for SystemProcesses {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotSource for SystemProcesses {
    fn list_process_names(&mut self) -> Result<HashSet<String>> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            anyhow::bail!("Process enumeration is not supported on this platform");
        }

        // Names plus exe/cmdline for recovering truncated names; skip cpu/memory/disk
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::new()
                .with_exe(UpdateKind::OnlyIfNotSet)
                .with_cmd(UpdateKind::OnlyIfNotSet),
        );

        Ok(self.system.processes().values().map(process_name).collect())
    }
}

fn process_name(process: &Process) -> String {
    let name = process.name().to_string_lossy();
    let argv0 = process.cmd().first().map(|arg| arg.to_string_lossy());
    let exe = process.exe().map(Path::to_string_lossy);
    untruncated_name(&name, argv0.as_deref(), exe.as_deref())
}

/// Undo the kernel's 15-byte cut of a process name.
///
/// A name at the limit is replaced by the base name of `argv[0]` or of the
/// executable path when that starts with it. Both `/` and `\` count as
/// separators so Wine command lines resolve too.
pub fn untruncated_name(name: &str, argv0: Option<&str>, exe: Option<&str>) -> String {
    if name.len() < COMM_MAX_LEN {
        return name.to_string();
    }

    [argv0, exe]
        .into_iter()
        .flatten()
        .filter_map(|path| path.rsplit(['/', '\\']).next())
        .find(|base| base.len() > name.len() && base.starts_with(name))
        .unwrap_or(name)
        .to_string()
}

/// Keep only the configured application names, matched exactly
pub fn filter_tracked(
    running: &HashSet<String>,
    tracked: &HashSet<TrackedName>,
) -> HashSet<TrackedName> {
    running.intersection(tracked).cloned().collect()
}
