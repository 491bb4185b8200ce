//! Read-only registry access.
//!
//! The scan in [`crate::locate`] only needs three operations: open a root key,
//! list its subkeys, and read the default string value of a subkey. They sit
//! behind [`RegistrySource`] so the scan can run against an in-memory registry
//! in tests.

use std::fmt;

use crate::error::LauncherError;

mod windows;

pub use self::windows::WindowsRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hive {
    LocalMachine,
    CurrentUser,
}

impl Hive {
    pub fn short_name(self) -> &'static str {
        match self {
            Hive::LocalMachine => "HKLM",
            Hive::CurrentUser => "HKCU",
        }
    }
}

/// A key path anchored at a predefined hive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistryRoot {
    pub hive: Hive,
    pub path: &'static str,
}

impl fmt::Display for RegistryRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\\{}", self.hive.short_name(), self.path)
    }
}

/// Where Python installers register themselves, in scan order.
pub const PYTHON_CORE_ROOTS: [RegistryRoot; 3] = [
    RegistryRoot {
        hive: Hive::LocalMachine,
        path: r"SOFTWARE\Python\PythonCore",
    },
    RegistryRoot {
        hive: Hive::LocalMachine,
        path: r"SOFTWARE\Wow6432Node\Python\PythonCore",
    },
    RegistryRoot {
        hive: Hive::CurrentUser,
        path: r"SOFTWARE\Python\PythonCore",
    },
];

pub trait RegistrySource {
    type Key;

    /// Opens `root` for reading. `Ok(None)` when the key does not exist.
    fn open(&self, root: &RegistryRoot) -> Result<Option<Self::Key>, LauncherError>;

    /// Names of the direct subkeys of `key`, in enumeration order.
    fn subkeys(&self, key: &Self::Key) -> Result<Vec<String>, LauncherError>;

    /// Default (unnamed) `REG_SZ` value of `subpath` below `key`.
    /// `Ok(None)` when the subkey or the value is missing.
    fn default_string(&self, key: &Self::Key, subpath: &str)
        -> Result<Option<String>, LauncherError>;
}
