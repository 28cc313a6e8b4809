//! Platform detection and resolution module
//!
//! This module provides abstractions for detecting the current host
//! (OS family and CPU architecture) and resolving it to the canonical
//! platform key that names the payload directory to launch from.

mod detection;
mod key;

pub use detection::{Arch, HostDescriptor, OsFamily};
pub use key::{PlatformKey, Unsupported, resolve};
