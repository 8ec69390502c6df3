//! GPU backend selection.

use crate::request::HostPlatform;

/// Host GPU passthrough.
pub const GPU_HOST: &str = "host";
/// SwiftShader software renderer behind the indirect GL path.
pub const GPU_SWIFTSHADER_INDIRECT: &str = "swiftshader_indirect";
/// ANGLE renderer behind the indirect GL path.
pub const GPU_ANGLE_INDIRECT: &str = "angle_indirect";
/// Lets the emulator decide.
pub const GPU_AUTO: &str = "auto";

/// Resolves the `-gpu` backend for a boot.
///
/// An explicit, non-empty override is returned verbatim. Without one, windowed
/// boots express no preference, and headless boots get a renderer known to
/// work without a display on the host platform.
#[must_use]
pub fn resolve_gpu_backend(
    gpu_override: Option<&str>,
    headless: bool,
    platform: HostPlatform,
) -> Option<&str> {
    if let Some(gpu) = gpu_override.filter(|gpu| !gpu.is_empty()) {
        return Some(gpu);
    }
    if !headless {
        return None;
    }
    Some(match platform {
        HostPlatform::Darwin => GPU_HOST,
        HostPlatform::Linux => GPU_SWIFTSHADER_INDIRECT,
        HostPlatform::Windows => GPU_ANGLE_INDIRECT,
        HostPlatform::Other => GPU_AUTO,
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(HostPlatform::Darwin, GPU_HOST)]
    #[case(HostPlatform::Linux, GPU_SWIFTSHADER_INDIRECT)]
    #[case(HostPlatform::Windows, GPU_ANGLE_INDIRECT)]
    #[case(HostPlatform::Other, GPU_AUTO)]
    fn headless_defaults_follow_platform(#[case] platform: HostPlatform, #[case] expected: &str) {
        assert_eq!(resolve_gpu_backend(None, true, platform), Some(expected));
    }

    #[rstest]
    #[case(HostPlatform::Darwin)]
    #[case(HostPlatform::Linux)]
    #[case(HostPlatform::Windows)]
    #[case(HostPlatform::Other)]
    fn windowed_boots_have_no_preference(#[case] platform: HostPlatform) {
        assert_eq!(resolve_gpu_backend(None, false, platform), None);
    }

    #[rstest]
    fn override_always_wins(
        #[values(true, false)] headless: bool,
        #[values(
            HostPlatform::Darwin,
            HostPlatform::Linux,
            HostPlatform::Windows,
            HostPlatform::Other
        )]
        platform: HostPlatform,
    ) {
        assert_eq!(
            resolve_gpu_backend(Some("guest"), headless, platform),
            Some("guest")
        );
    }

    #[test]
    fn empty_override_falls_through_to_defaults() {
        assert_eq!(
            resolve_gpu_backend(Some(""), true, HostPlatform::Linux),
            Some(GPU_SWIFTSHADER_INDIRECT)
        );
    }
}
