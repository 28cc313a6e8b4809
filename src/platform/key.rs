use std::fmt;

use crate::platform::detection::{Arch, HostDescriptor, OsFamily, effective_arch};
use crate::runtime::Runtime;

/// Canonical platform key naming a payload directory under `dist/`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformKey {
    LinuxX64,
    LinuxArm64,
    WindowsX64,
    WindowsArm64,
    MacosX64,
    MacosArm64,
}

impl PlatformKey {
    pub const ALL: [PlatformKey; 6] = [
        PlatformKey::LinuxX64,
        PlatformKey::LinuxArm64,
        PlatformKey::WindowsX64,
        PlatformKey::WindowsArm64,
        PlatformKey::MacosX64,
        PlatformKey::MacosArm64,
    ];

    /// The `dist/` directory name for this key
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKey::LinuxX64 => "linux-x64",
            PlatformKey::LinuxArm64 => "linux-arm64",
            PlatformKey::WindowsX64 => "windows-x64",
            PlatformKey::WindowsArm64 => "windows-arm64",
            PlatformKey::MacosX64 => "macos-x64",
            PlatformKey::MacosArm64 => "macos-arm64",
        }
    }

    /// Human-readable name for the supported-platform listing
    pub fn label(&self) -> &'static str {
        match self {
            PlatformKey::LinuxX64 => "Linux x64",
            PlatformKey::LinuxArm64 => "Linux ARM64",
            PlatformKey::WindowsX64 => "Windows x64",
            PlatformKey::WindowsArm64 => "Windows ARM64",
            PlatformKey::MacosX64 => "macOS x64 (Intel)",
            PlatformKey::MacosArm64 => "macOS ARM64 (Apple Silicon)",
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, PlatformKey::WindowsX64 | PlatformKey::WindowsArm64)
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The host is not one of the six supported OS/architecture combinations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unsupported {
    pub os: String,
    pub arch: String,
}

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unsupported platform: {}-{}", self.os, self.arch)
    }
}

impl std::error::Error for Unsupported {}

/// Resolve the host to its canonical platform key.
///
/// Deterministic given the host snapshot and the translation-probe outcome:
/// exactly one key, or [`Unsupported`] carrying the raw OS/arch pair.
#[tracing::instrument(skip(runtime, host))]
pub fn resolve<R: Runtime>(runtime: &R, host: &HostDescriptor) -> Result<PlatformKey, Unsupported> {
    let arch = effective_arch(runtime, host);

    let key = match (&host.family, arch) {
        (OsFamily::Linux, Arch::X64) => PlatformKey::LinuxX64,
        (OsFamily::Linux, Arch::Arm64) => PlatformKey::LinuxArm64,
        (OsFamily::Windows, Arch::X64) => PlatformKey::WindowsX64,
        (OsFamily::Windows, Arch::Arm64) => PlatformKey::WindowsArm64,
        (OsFamily::Macos, Arch::X64) => PlatformKey::MacosX64,
        (OsFamily::Macos, Arch::Arm64) => PlatformKey::MacosArm64,
        (OsFamily::Other(raw), arch) => {
            return Err(Unsupported {
                os: raw.clone(),
                arch: arch.name().to_string(),
            });
        }
    };

    Ok(key)
}
