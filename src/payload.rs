//! Payload location: where the archive lives and where the binary lands.

use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

use crate::platform::PlatformKey;
use crate::runtime::Runtime;

/// Archive filename expected inside every platform directory
pub const ARCHIVE_NAME: &str = "mcp-dev-manager.zip";
/// Executable filename, before any platform suffix
pub const EXECUTABLE_STEM: &str = "mcp-dev-manager";
/// Install-root override (overrides the executable-relative default)
pub const ROOT_ENV: &str = "MCP_DEV_MANAGER_ROOT";

/// Resolved on-disk locations for one platform's payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadLocation {
    pub directory: PathBuf,
    pub archive_path: PathBuf,
    pub executable_name: String,
    pub executable_path: PathBuf,
}

impl PayloadLocation {
    /// Compute the deterministic layout for a platform key:
    /// `<root>/dist/<key>/` holding the archive and, after extraction, the
    /// executable. The `.exe` suffix follows the resolved key's OS family,
    /// not the compile target.
    pub fn for_key(root: &Path, key: PlatformKey) -> Self {
        let directory = root.join("dist").join(key.as_str());
        let executable_name = if key.is_windows() {
            format!("{}.exe", EXECUTABLE_STEM)
        } else {
            EXECUTABLE_STEM.to_string()
        };

        Self {
            archive_path: directory.join(ARCHIVE_NAME),
            executable_path: directory.join(&executable_name),
            executable_name,
            directory,
        }
    }
}

/// Resolve the install root the `dist/` tree lives under.
///
/// `MCP_DEV_MANAGER_ROOT` wins when set; otherwise the root is the parent of
/// the directory holding the launcher executable, the compiled counterpart
/// of the original script's install layout.
#[tracing::instrument(skip(runtime))]
pub fn install_root<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    if let Ok(root) = runtime.env_var(ROOT_ENV) {
        info!("Using install root from {}: {}", ROOT_ENV, root);
        return Ok(PathBuf::from(root));
    }

    let exe = runtime.current_exe()?;
    let exe_dir = exe
        .parent()
        .context("Launcher executable has no parent directory")?;
    let root = exe_dir.parent().unwrap_or(exe_dir).to_path_buf();

    info!("Using install root: {}", root.display());
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    #[test]
    fn test_location_layout_per_key() {
        let root = Path::new("/opt/mdm");

        let location = PayloadLocation::for_key(root, PlatformKey::LinuxX64);
        assert_eq!(location.directory, PathBuf::from("/opt/mdm/dist/linux-x64"));
        assert_eq!(
            location.archive_path,
            PathBuf::from("/opt/mdm/dist/linux-x64/mcp-dev-manager.zip")
        );
        assert_eq!(location.executable_name, "mcp-dev-manager");
        assert_eq!(
            location.executable_path,
            PathBuf::from("/opt/mdm/dist/linux-x64/mcp-dev-manager")
        );

        let location = PayloadLocation::for_key(root, PlatformKey::MacosArm64);
        assert_eq!(
            location.directory,
            PathBuf::from("/opt/mdm/dist/macos-arm64")
        );
        assert_eq!(location.executable_name, "mcp-dev-manager");
    }

    #[test]
    fn test_windows_keys_get_exe_suffix() {
        let root = Path::new("/opt/mdm");

        for key in [PlatformKey::WindowsX64, PlatformKey::WindowsArm64] {
            let location = PayloadLocation::for_key(root, key);
            assert_eq!(location.executable_name, "mcp-dev-manager.exe");
            assert_eq!(
                location.executable_path,
                root.join("dist").join(key.as_str()).join("mcp-dev-manager.exe")
            );
        }
    }

    #[test]
    fn test_install_root_env_override() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_env_var()
            .with(eq(ROOT_ENV))
            .returning(|_| Ok("/custom/root".to_string()));

        let root = install_root(&runtime).unwrap();
        assert_eq!(root, PathBuf::from("/custom/root"));
    }

    #[test]
    fn test_install_root_from_executable_location() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_env_var()
            .with(eq(ROOT_ENV))
            .returning(|_| Err(std::env::VarError::NotPresent));
        runtime
            .expect_current_exe()
            .returning(|| Ok(PathBuf::from("/opt/mdm/bin/mdm-launcher")));

        let root = install_root(&runtime).unwrap();
        assert_eq!(root, PathBuf::from("/opt/mdm"));
    }

    #[test]
    fn test_install_root_exe_lookup_failure() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_env_var()
            .returning(|_| Err(std::env::VarError::NotPresent));
        runtime
            .expect_current_exe()
            .returning(|| Err(anyhow::anyhow!("unresolvable")));

        assert!(install_root(&runtime).is_err());
    }
}
