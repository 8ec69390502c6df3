//! Boot supervision for Android emulators driven by automated test runners.
//!
//! The crate launches an emulator detached from the calling process and
//! decides when it is ready by watching the emulator's own log output, since
//! a detached process offers no exit status to wait on. Each attempt resolves
//! to exactly one of:
//!
//! - [`BootOutcome::Ready`]: the readiness marker appeared in the log.
//! - [`BootOutcome::AlreadyRunning`]: another instance holds the virtual device.
//! - [`BootError::SpawnFailed`]: any other launch failure, carrying the
//!   captured log for diagnosis.
//!
//! Launch arguments come from [`build_launch_args`] and
//! [`resolve_gpu_backend`], both pure functions over a [`BootRequest`].
//! Short-lived queries such as [`Emulator::list_avds`] go through a retrying
//! [`CommandExecutor`].

mod args;
mod error;
mod exec;
mod gpu;
mod request;
mod runner;
mod supervisor;
mod watcher;

pub use args::{LaunchArgs, build_launch_args};
pub use error::{BootError, ExecError, SpawnCause};
pub use exec::{CommandExecutor, RetryingExecutor};
pub use gpu::{GPU_ANGLE_INDIRECT, GPU_AUTO, GPU_HOST, GPU_SWIFTSHADER_INDIRECT, resolve_gpu_backend};
pub use request::{BootRequest, HostPlatform};
pub use runner::{Emulator, parse_avd_list};
pub use supervisor::{ALREADY_RUNNING_MARKER, BootOutcome, BootSupervisor, LogSink};
pub use watcher::{LogTail, LogWatcher, READY_MARKER};

pub(crate) const BOOT_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::supervisor");
pub(crate) const WATCH_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::watcher");
pub(crate) const EXEC_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::exec");
