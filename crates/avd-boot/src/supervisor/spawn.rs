//! Detached process launch.

use std::io;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;

use tracing::debug;

use crate::BOOT_TARGET;

/// Spawns `binary` so it outlives the caller.
///
/// On Unix the child leads its own process group, so terminal signals aimed
/// at the test runner do not reach the emulator. On Windows it is started
/// without a console in a new process group.
pub(super) fn spawn_detached(
    binary: &Path,
    args: &[String],
    stdout: Stdio,
    stderr: Stdio,
) -> io::Result<Child> {
    let mut command = Command::new(binary);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(stdout)
        .stderr(stderr);
    detach(&mut command);
    command.spawn()
}

/// Waits on `child` from a background thread so it is reaped whenever it
/// exits, without tying its lifetime to the caller.
pub(super) fn reap_in_background(mut child: Child) {
    let pid = child.id();
    let spawned = thread::Builder::new()
        .name(String::from("avd-reaper"))
        .spawn(move || match child.wait() {
            Ok(status) => debug!(target: BOOT_TARGET, pid, %status, "detached emulator exited"),
            Err(error) => debug!(target: BOOT_TARGET, pid, %error, "detached emulator wait failed"),
        });
    if let Err(error) = spawned {
        debug!(target: BOOT_TARGET, pid, %error, "could not start reaper thread");
    }
}

#[cfg(unix)]
fn detach(command: &mut Command) {
    use std::os::unix::process::CommandExt;

    command.process_group(0);
}

#[cfg(windows)]
fn detach(command: &mut Command) {
    use std::os::windows::process::CommandExt;

    const DETACHED_PROCESS: u32 = 0x0000_0008;
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    command.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
}

#[cfg(not(any(unix, windows)))]
fn detach(_command: &mut Command) {}
