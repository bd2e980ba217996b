//! Platform capabilities: permissions, sharing, file cleanup, error logging
//!
//! The workflow never checks the operating system directly. It asks a
//! `PlatformCapabilities` value which gates apply and talks to the host
//! through the traits re-exported here, so tests can substitute any of them.

pub mod fs;
pub mod logging;
pub mod permission;
pub mod share;

pub use fs::{FileCleaner, FsCleaner};
pub use logging::{ErrorLog, LogFacade};
pub use permission::{
    PermissionKind, PermissionProvider, PermissionRationale, PromptPermission, StaticPermission,
};
pub use share::{DirectoryShareTarget, ShareRequest, ShareTarget};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Host operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    Desktop,
}

impl Platform {
    /// The platform this binary was compiled for
    pub fn current() -> Self {
        if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(target_os = "ios") {
            Platform::Ios
        } else {
            Platform::Desktop
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::Desktop => "desktop",
        })
    }
}

impl FromStr for Platform {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            "desktop" => Ok(Platform::Desktop),
            other => Err(crate::Error::Config(format!("unknown platform '{}'", other))),
        }
    }
}

/// Which environment-conditional steps the workflow runs.
///
/// Resolved once at startup; the orchestrator only reads the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformCapabilities {
    /// Ask for storage-write consent before capturing
    pub storage_permission: bool,
    /// Delete the captured resource after a successful share
    pub temp_file_cleanup: bool,
}

impl PlatformCapabilities {
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Android => Self {
                storage_permission: true,
                temp_file_cleanup: true,
            },
            Platform::Ios | Platform::Desktop => Self {
                storage_permission: false,
                temp_file_cleanup: false,
            },
        }
    }

    pub fn detect() -> Self {
        Self::for_platform(Platform::current())
    }
}

impl Default for PlatformCapabilities {
    fn default() -> Self {
        Self::detect()
    }
}

/// The host capabilities one orchestrator talks to
#[derive(Clone)]
pub struct Services {
    pub permissions: Arc<dyn PermissionProvider>,
    pub share: Arc<dyn ShareTarget>,
    pub files: Arc<dyn FileCleaner>,
    pub log: Arc<dyn ErrorLog>,
    pub capabilities: PlatformCapabilities,
}

impl Services {
    /// Defaults around a share target: permission always granted, filesystem
    /// cleanup, `log` crate errors, capabilities of the current platform.
    pub fn new(share: Arc<dyn ShareTarget>) -> Self {
        Self {
            permissions: Arc::new(StaticPermission::granted()),
            share,
            files: Arc::new(FsCleaner::new()),
            log: Arc::new(LogFacade),
            capabilities: PlatformCapabilities::detect(),
        }
    }

    pub fn with_permissions(mut self, permissions: Arc<dyn PermissionProvider>) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn with_files(mut self, files: Arc<dyn FileCleaner>) -> Self {
        self.files = files;
        self
    }

    pub fn with_log(mut self, log: Arc<dyn ErrorLog>) -> Self {
        self.log = log;
        self
    }

    pub fn with_capabilities(mut self, capabilities: PlatformCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}
