//! Emulator binary discovery.
//!
//! The Android SDK installs the emulator under `<sdk>/emulator/`; older SDKs
//! shipped it under `<sdk>/tools/`. The SDK root is taken from
//! `ANDROID_SDK_ROOT`, then `ANDROID_HOME`.

use std::env;
use std::env::consts::EXE_SUFFIX;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

const SDK_ROOT_VARIABLES: [&str; 2] = ["ANDROID_SDK_ROOT", "ANDROID_HOME"];
const SDK_EMULATOR_DIRECTORIES: [&str; 2] = ["emulator", "tools"];

/// Resolves the emulator binary using the process environment.
///
/// Uses the override if provided, otherwise the first SDK root found in the
/// environment, and finally the bare `emulator` name for a `PATH` lookup.
#[must_use]
pub fn resolve_emulator_binary(override_path: Option<&Path>) -> PathBuf {
    resolve_emulator_binary_from(override_path, |key| env::var_os(key))
}

/// Resolves the emulator binary with an injected environment lookup.
#[must_use]
pub fn resolve_emulator_binary_from<F>(override_path: Option<&Path>, lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<OsString>,
{
    if let Some(path) = override_path {
        return path.to_path_buf();
    }
    let binary_name = format!("emulator{EXE_SUFFIX}");
    let sdk_root = SDK_ROOT_VARIABLES
        .iter()
        .filter_map(|key| lookup(key))
        .find(|value| !value.is_empty())
        .map(PathBuf::from);
    let Some(sdk_root) = sdk_root else {
        return PathBuf::from(binary_name);
    };
    let candidates: Vec<PathBuf> = SDK_EMULATOR_DIRECTORIES
        .iter()
        .map(|directory| sdk_root.join(directory).join(&binary_name))
        .collect();
    candidates
        .iter()
        .find(|candidate| candidate.is_file())
        .cloned()
        .unwrap_or_else(|| sdk_root.join("emulator").join(&binary_name))
}
