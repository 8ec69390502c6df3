//! Emulator command-line construction.

use crate::gpu::resolve_gpu_backend;
use crate::request::BootRequest;

/// Ordered arguments passed to the emulator binary.
pub type LaunchArgs = Vec<String>;

/// Builds the emulator arguments for `request`.
///
/// Token order is fixed so the command line is reproducible in logs and
/// tests. Blank tokens are never emitted.
#[must_use]
pub fn build_launch_args(request: &BootRequest) -> LaunchArgs {
    let port = request.port().map(|port| port.to_string());
    let gpu = resolve_gpu_backend(
        request.gpu_override(),
        request.headless(),
        request.platform(),
    );
    let tokens = [
        Some(String::from("-verbose")),
        Some(String::from("-no-audio")),
        Some(String::from("-no-boot-anim")),
        request.headless().then(|| String::from("-no-window")),
        request.read_only().then(|| String::from("-read-only")),
        port.as_ref().map(|_| String::from("-port")),
        port,
        Some(format!("@{}", request.device_name())),
        gpu.map(|_| String::from("-gpu")),
        gpu.map(String::from),
    ];
    tokens
        .into_iter()
        .flatten()
        .filter(|token| !token.is_empty())
        .collect()
}
