//! Finds the Python installation that has the Winsync package installed.
//!
//! Every registered interpreter lists its library directories in the default
//! value of `<version>\PythonPath`. The first interpreter whose library
//! directories contain `site-packages\<package>` wins, and its
//! `<version>\InstallPath` is the directory we launch from.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{LauncherError, ERROR_FILE_NOT_FOUND};
use crate::registry::{RegistryRoot, RegistrySource};

/// Filesystem existence check, swappable in tests.
pub trait PathProbe {
    fn exists(&self, path: &Path) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FsProbe;

impl PathProbe for FsProbe {
    fn exists(&self, path: &Path) -> bool {
        std::fs::metadata(path).is_ok()
    }
}

/// A resolved Python installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Install {
    pub dir: PathBuf,
    /// Registry entry it was found under, e.g. `HKLM\SOFTWARE\Python\PythonCore\2.7`.
    /// `None` when the directory was given explicitly.
    pub entry: Option<String>,
}

impl Install {
    pub fn explicit(dir: PathBuf) -> Self {
        Self { dir, entry: None }
    }
}

/// One scanned registry entry, as reported by `--list-installs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub entry: String,
    pub python_path: Option<String>,
    pub has_package: bool,
}

/// Splits a `PythonPath` value into its directories. Only `;` separates;
/// surrounding spaces belong to the directory name.
pub fn python_path_dirs(value: &str) -> impl Iterator<Item = &str> {
    value.split(';').filter(|s| !s.is_empty())
}

fn package_dir(lib_dir: &str, package: &str) -> PathBuf {
    Path::new(lib_dir).join("site-packages").join(package)
}

/// Roots are opened one at a time as the scan reaches them. A root that
/// fails to open is skipped; the first such failure is kept in case no root
/// produces a result.
struct RootScan {
    opened_any: bool,
    open_error: Option<LauncherError>,
}

impl RootScan {
    fn new() -> Self {
        Self {
            opened_any: false,
            open_error: None,
        }
    }

    fn open<R: RegistrySource>(&mut self, registry: &R, root: &RegistryRoot) -> Option<R::Key> {
        match registry.open(root) {
            Ok(Some(key)) => {
                debug!(root = %root, "opened registry root");
                self.opened_any = true;
                Some(key)
            }
            Ok(None) => {
                debug!(root = %root, "registry root not present");
                None
            }
            Err(e) => {
                warn!(root = %root, error = %e, "cannot open registry root, skipping");
                self.open_error.get_or_insert(e);
                None
            }
        }
    }

    /// Error for a scan that found nothing.
    fn into_error(self, not_found: LauncherError) -> LauncherError {
        match self.open_error {
            Some(e) => e,
            None if self.opened_any => not_found,
            None => LauncherError::os("RegOpenKeyEx", ERROR_FILE_NOT_FOUND),
        }
    }
}

/// Scans `roots` for an interpreter carrying `package`.
pub fn find_install<R: RegistrySource, P: PathProbe>(
    registry: &R,
    probe: &P,
    roots: &[RegistryRoot],
    package: &str,
) -> Result<Install, LauncherError> {
    let mut scan = RootScan::new();

    for root in roots {
        let Some(key) = scan.open(registry, root) else {
            continue;
        };

        for name in registry.subkeys(&key)? {
            let Some(paths) = registry.default_string(&key, &format!("{name}\\PythonPath"))?
            else {
                // Uninstallers sometimes leave entries without a PythonPath.
                debug!(root = %root, entry = %name, "no PythonPath, skipping");
                continue;
            };

            let hit = python_path_dirs(&paths).find(|dir| probe.exists(&package_dir(dir, package)));
            let Some(lib_dir) = hit else {
                continue;
            };
            info!(root = %root, entry = %name, lib_dir, "found {package}");

            let install_path = registry
                .default_string(&key, &format!("{name}\\InstallPath"))
                .map_err(|e| match e {
                    LauncherError::Os { code, .. } => {
                        LauncherError::os("RegGetValue (installpath)", code)
                    }
                    other => other,
                })?
                .ok_or_else(|| {
                    LauncherError::os("RegGetValue (installpath)", ERROR_FILE_NOT_FOUND)
                })?;

            return Ok(Install {
                dir: PathBuf::from(install_path),
                entry: Some(format!("{root}\\{name}")),
            });
        }
    }

    warn!("no registered Python carries {package}");
    Err(scan.into_error(LauncherError::NotFound))
}

/// Every entry under `roots` with its `PythonPath` and whether it carries
/// `package`. Entries are reported even when they would be skipped by
/// [`find_install`]; roots that cannot be opened are left out.
pub fn list_candidates<R: RegistrySource, P: PathProbe>(
    registry: &R,
    probe: &P,
    roots: &[RegistryRoot],
    package: &str,
) -> Result<Vec<Candidate>, LauncherError> {
    let mut scan = RootScan::new();
    let mut out = Vec::new();

    for root in roots {
        let Some(key) = scan.open(registry, root) else {
            continue;
        };
        for name in registry.subkeys(&key)? {
            let python_path = registry.default_string(&key, &format!("{name}\\PythonPath"))?;
            let has_package = python_path.as_deref().is_some_and(|paths| {
                python_path_dirs(paths).any(|dir| probe.exists(&package_dir(dir, package)))
            });
            out.push(Candidate {
                entry: format!("{root}\\{name}"),
                python_path,
                has_package,
            });
        }
    }

    if !scan.opened_any {
        return Err(scan.into_error(LauncherError::NotFound));
    }
    Ok(out)
}
