//! Provisioning pipeline: turn a platform key into a runnable payload.

use anyhow::{Context, Result, bail};
use log::{debug, info};

use crate::archive::ArchiveExtractor;
use crate::payload::{ARCHIVE_NAME, PayloadLocation};
use crate::platform::PlatformKey;
use crate::runtime::Runtime;

/// Prepare the payload for launch: ensure the platform directory exists,
/// drop any stale executable, unpack the archive, and verify the expected
/// binary came out of it.
///
/// Every run re-extracts from the archive, so an interrupted previous run
/// can never leave a half-written binary to be launched.
#[tracing::instrument(skip(runtime, extractor, location))]
pub fn provision<R: Runtime + 'static, E: ArchiveExtractor>(
    runtime: &R,
    extractor: &E,
    location: &PayloadLocation,
    key: PlatformKey,
) -> Result<()> {
    runtime.create_dir_all(&location.directory)?;

    if runtime.exists(&location.executable_path) {
        debug!("Removing stale executable {:?}", location.executable_path);
        runtime.remove_file(&location.executable_path)?;
    }

    if !runtime.exists(&location.archive_path) {
        bail!(
            "{} not found at {} (detected platform: {})",
            ARCHIVE_NAME,
            location.archive_path.display(),
            key
        );
    }

    extractor
        .extract(runtime, &location.archive_path, &location.directory)
        .with_context(|| {
            format!(
                "Failed to extract the {} archive at {}",
                location.executable_name,
                location.archive_path.display()
            )
        })?;

    if !runtime.exists(&location.executable_path) {
        bail!(
            "Extracted binary not found at {}; this usually indicates a corrupt download, reinstall the package",
            location.executable_path.display()
        );
    }

    // Archives built on Windows hosts may carry no mode bits; refusing to
    // launch over a failed chmod would break filesystems that reject
    // permission changes on an already-runnable binary.
    if !key.is_windows()
        && let Err(e) = runtime.set_permissions(&location.executable_path, 0o755)
    {
        debug!(
            "Failed to set permissions on {:?}: {}",
            location.executable_path, e
        );
    }

    info!("Provisioned {} for {}", location.executable_name, key);
    Ok(())
}
