//! Boot request model.
//!
//! A [`BootRequest`] captures everything the argument builder needs. It is
//! validated once at construction and immutable afterwards; the builder-style
//! setters consume and return the request.

use std::num::NonZeroU16;

use avd_config::Config;
use strum::Display;

use crate::error::BootError;

/// Host operating system family used to pick GPU defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum HostPlatform {
    /// macOS.
    Darwin,
    /// Linux.
    Linux,
    /// Windows.
    Windows,
    /// Any other host.
    Other,
}

impl HostPlatform {
    /// Platform this binary was compiled for.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::Darwin
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Other
        }
    }
}

/// Options for a single boot attempt of one virtual device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootRequest {
    device_name: String,
    port: Option<NonZeroU16>,
    headless: bool,
    read_only: bool,
    gpu_override: Option<String>,
    platform: HostPlatform,
}

impl BootRequest {
    /// Creates a request for `device_name` on the current platform.
    ///
    /// # Errors
    ///
    /// Returns [`BootError::EmptyDeviceName`] when the name is empty or only
    /// whitespace.
    pub fn new(device_name: impl Into<String>) -> Result<Self, BootError> {
        let device_name = device_name.into();
        if device_name.trim().is_empty() {
            return Err(BootError::EmptyDeviceName);
        }
        Ok(Self {
            device_name,
            port: None,
            headless: false,
            read_only: false,
            gpu_override: None,
            platform: HostPlatform::current(),
        })
    }

    /// Creates a request with the headless, read-only, and GPU settings taken
    /// from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BootError::EmptyDeviceName`] when the name is empty.
    pub fn from_config(device_name: impl Into<String>, config: &Config) -> Result<Self, BootError> {
        Ok(Self::new(device_name)?
            .with_headless(config.headless)
            .with_read_only(config.read_only_emu)
            .with_gpu_override(config.gpu_override().map(String::from)))
    }

    /// Requests a specific console port.
    #[must_use]
    pub const fn with_port(mut self, port: Option<NonZeroU16>) -> Self {
        self.port = port;
        self
    }

    /// Boots without a window.
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Boots without persisting state back to the virtual device.
    #[must_use]
    pub const fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Forces a GPU backend, bypassing platform defaults.
    #[must_use]
    pub fn with_gpu_override(mut self, gpu: Option<String>) -> Self {
        self.gpu_override = gpu.filter(|value| !value.is_empty());
        self
    }

    /// Overrides the host platform used for GPU defaults.
    #[must_use]
    pub const fn with_platform(mut self, platform: HostPlatform) -> Self {
        self.platform = platform;
        self
    }

    /// Virtual device name.
    #[must_use]
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Requested console port.
    #[must_use]
    pub const fn port(&self) -> Option<NonZeroU16> {
        self.port
    }

    /// Whether the window is suppressed.
    #[must_use]
    pub const fn headless(&self) -> bool {
        self.headless
    }

    /// Whether the device boots read-only.
    #[must_use]
    pub const fn read_only(&self) -> bool {
        self.read_only
    }

    /// Explicit GPU backend.
    #[must_use]
    pub fn gpu_override(&self) -> Option<&str> {
        self.gpu_override.as_deref()
    }

    /// Host platform used for GPU defaults.
    #[must_use]
    pub const fn platform(&self) -> HostPlatform {
        self.platform
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn rejects_blank_device_names(#[case] name: &str) {
        assert!(matches!(
            BootRequest::new(name),
            Err(BootError::EmptyDeviceName)
        ));
    }

    #[test]
    fn from_config_copies_boot_flags() {
        let config = Config {
            headless: true,
            read_only_emu: true,
            gpu: Some(String::from("host")),
            ..Config::default()
        };
        let request = BootRequest::from_config("Pixel_4_API_30", &config).expect("request");
        assert!(request.headless());
        assert!(request.read_only());
        assert_eq!(request.gpu_override(), Some("host"));
        assert_eq!(request.port(), None);
    }

    #[test]
    fn empty_gpu_override_is_dropped() {
        let request = BootRequest::new("Pixel")
            .expect("request")
            .with_gpu_override(Some(String::new()));
        assert_eq!(request.gpu_override(), None);
    }

    #[rstest]
    #[case(HostPlatform::Darwin, "darwin")]
    #[case(HostPlatform::Linux, "linux")]
    #[case(HostPlatform::Windows, "windows")]
    #[case(HostPlatform::Other, "other")]
    fn platform_displays_lowercase(#[case] platform: HostPlatform, #[case] expected: &str) {
        assert_eq!(platform.to_string(), expected);
    }
}
