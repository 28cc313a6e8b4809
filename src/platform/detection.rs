use crate::runtime::Runtime;

/// Windows reports the native processor architecture here.
const NATIVE_ARCH_ENV: &str = "PROCESSOR_ARCHITECTURE";
/// Windows reports the emulated architecture here when running under WOW64.
const WOW64_ARCH_ENV: &str = "PROCESSOR_ARCHITEW6432";
/// macOS reports `1` here when the process runs under Rosetta translation.
const TRANSLATION_SYSCTL: &str = "sysctl.proc_translated";

/// Operating system family of the running host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OsFamily {
    Linux,
    Windows,
    Macos,
    /// Unrecognized OS, carrying the raw identifier for diagnostics
    Other(String),
}

impl OsFamily {
    pub fn from_raw(os: &str) -> Self {
        match os {
            "linux" => OsFamily::Linux,
            "windows" => OsFamily::Windows,
            "macos" => OsFamily::Macos,
            other => OsFamily::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            OsFamily::Linux => "linux",
            OsFamily::Windows => "windows",
            OsFamily::Macos => "macos",
            OsFamily::Other(raw) => raw,
        }
    }
}

/// Effective CPU architecture after translation-layer detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X64,
    Arm64,
}

impl Arch {
    pub fn name(&self) -> &'static str {
        match self {
            Arch::X64 => "x64",
            Arch::Arm64 => "arm64",
        }
    }
}

/// Immutable snapshot of the host environment, taken once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostDescriptor {
    pub family: OsFamily,
    pub raw_arch: String,
    /// Pre-seeded translation-probe outcome. `None` means the resolver
    /// probes through the runtime when the macOS rules call for it.
    pub translation: Option<bool>,
}

impl HostDescriptor {
    /// Snapshot the running host
    pub fn detect() -> Self {
        Self {
            family: OsFamily::from_raw(std::env::consts::OS),
            raw_arch: std::env::consts::ARCH.to_string(),
            translation: None,
        }
    }
}

/// Case-insensitive ARM match. `aarch64` is included: Rust reports 64-bit
/// ARM hosts as `aarch64`, which contains no literal "arm".
fn is_arm(raw: &str) -> bool {
    let raw = raw.to_ascii_lowercase();
    raw.contains("arm") || raw.contains("aarch64")
}

/// Query the Rosetta translation sysctl, collapsing every failure to `false`
fn translation_active<R: Runtime>(runtime: &R) -> bool {
    runtime
        .sysctl(TRANSLATION_SYSCTL)
        .map(|value| value.trim() == "1")
        .unwrap_or(false)
}

/// Determine the effective architecture for the host.
///
/// Precedence: on macOS an ARM raw architecture wins outright and the
/// translation probe is never consulted; an x64-reporting macOS host is
/// probed for Rosetta, since translated processes see the emulated CPU.
/// Elsewhere an ARM-looking raw architecture wins, Windows additionally
/// consults the processor-architecture environment variables, and
/// everything else falls back to x64.
pub(crate) fn effective_arch<R: Runtime>(runtime: &R, host: &HostDescriptor) -> Arch {
    if host.family == OsFamily::Macos {
        if is_arm(&host.raw_arch) {
            return Arch::Arm64;
        }
        let translated = host
            .translation
            .unwrap_or_else(|| translation_active(runtime));
        return if translated { Arch::Arm64 } else { Arch::X64 };
    }

    if is_arm(&host.raw_arch) {
        return Arch::Arm64;
    }

    if host.family == OsFamily::Windows {
        for key in [NATIVE_ARCH_ENV, WOW64_ARCH_ENV] {
            if runtime
                .env_var(key)
                .map(|value| is_arm(&value))
                .unwrap_or(false)
            {
                return Arch::Arm64;
            }
        }
    }

    Arch::X64
}
