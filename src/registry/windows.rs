//! [`RegistrySource`] over the Win32 registry API.

use super::{RegistryRoot, RegistrySource};
use crate::error::LauncherError;

/// The live registry of the current machine.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsRegistry;

#[cfg(windows)]
mod imp {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;

    use windows_sys::Win32::Foundation::{
        ERROR_FILE_NOT_FOUND, ERROR_MORE_DATA, ERROR_NO_MORE_ITEMS, ERROR_SUCCESS,
    };
    use windows_sys::Win32::System::Registry::{
        RegCloseKey, RegEnumKeyExW, RegGetValueW, RegOpenKeyExW, HKEY, HKEY_CURRENT_USER,
        HKEY_LOCAL_MACHINE, KEY_ENUMERATE_SUB_KEYS, KEY_READ, RRF_RT_REG_SZ,
    };

    use super::{LauncherError, RegistryRoot, RegistrySource, WindowsRegistry};
    use crate::registry::Hive;

    /// Open registry key, closed with `RegCloseKey` on drop.
    #[derive(Debug)]
    pub struct RegKey {
        handle: HKEY,
    }

    impl RegKey {
        fn get(&self) -> HKEY {
            self.handle
        }
    }

    impl Drop for RegKey {
        fn drop(&mut self) {
            if !self.handle.is_null() {
                unsafe { RegCloseKey(self.handle) };
                self.handle = std::ptr::null_mut();
            }
        }
    }

    fn wide(s: &str) -> Vec<u16> {
        OsStr::new(s).encode_wide().chain(Some(0)).collect()
    }

    fn hive_handle(hive: Hive) -> HKEY {
        match hive {
            Hive::LocalMachine => HKEY_LOCAL_MACHINE,
            Hive::CurrentUser => HKEY_CURRENT_USER,
        }
    }

    impl RegistrySource for WindowsRegistry {
        type Key = RegKey;

        fn open(&self, root: &RegistryRoot) -> Result<Option<RegKey>, LauncherError> {
            let path = wide(root.path);
            let mut handle: HKEY = std::ptr::null_mut();
            let ret = unsafe {
                RegOpenKeyExW(
                    hive_handle(root.hive),
                    path.as_ptr(),
                    0,
                    KEY_READ | KEY_ENUMERATE_SUB_KEYS,
                    &mut handle,
                )
            };
            match ret {
                ERROR_SUCCESS => Ok(Some(RegKey { handle })),
                ERROR_FILE_NOT_FOUND => Ok(None),
                code => Err(LauncherError::os("RegOpenKeyEx", code)),
            }
        }

        fn subkeys(&self, key: &RegKey) -> Result<Vec<String>, LauncherError> {
            let mut names = Vec::new();
            // Key names are limited to 255 characters, but grow anyway if told to.
            let mut name = vec![0u16; 256];
            let mut index = 0u32;

            loop {
                let mut len = name.len() as u32;
                let ret = unsafe {
                    RegEnumKeyExW(
                        key.get(),
                        index,
                        name.as_mut_ptr(),
                        &mut len,
                        std::ptr::null(),
                        std::ptr::null_mut(),
                        std::ptr::null_mut(),
                        std::ptr::null_mut(),
                    )
                };
                match ret {
                    ERROR_SUCCESS => {
                        names.push(String::from_utf16_lossy(&name[..len as usize]));
                        index += 1;
                    }
                    ERROR_MORE_DATA => {
                        let grown = name.len() * 2;
                        name.resize(grown, 0);
                    }
                    ERROR_NO_MORE_ITEMS => return Ok(names),
                    code => return Err(LauncherError::os("RegEnumKeyEx", code)),
                }
            }
        }

        fn default_string(
            &self,
            key: &RegKey,
            subpath: &str,
        ) -> Result<Option<String>, LauncherError> {
            let subkey = wide(subpath);
            let mut buf = vec![0u16; 260];

            loop {
                let mut bytes = (buf.len() * 2) as u32;
                let ret = unsafe {
                    RegGetValueW(
                        key.get(),
                        subkey.as_ptr(),
                        std::ptr::null(),
                        RRF_RT_REG_SZ,
                        std::ptr::null_mut(),
                        buf.as_mut_ptr().cast(),
                        &mut bytes,
                    )
                };
                match ret {
                    ERROR_SUCCESS => {
                        let chars = bytes as usize / 2;
                        let value = &buf[..chars.min(buf.len())];
                        let end = value.iter().position(|&c| c == 0).unwrap_or(value.len());
                        return Ok(Some(String::from_utf16_lossy(&value[..end])));
                    }
                    ERROR_MORE_DATA => {
                        let wanted = (bytes as usize).div_ceil(2).max(buf.len() * 2);
                        buf.resize(wanted, 0);
                    }
                    ERROR_FILE_NOT_FOUND => return Ok(None),
                    code => return Err(LauncherError::os("RegGetValue", code)),
                }
            }
        }
    }
}

#[cfg(not(windows))]
impl RegistrySource for WindowsRegistry {
    type Key = ();

    fn open(&self, _root: &RegistryRoot) -> Result<Option<()>, LauncherError> {
        Err(LauncherError::Unsupported)
    }

    fn subkeys(&self, _key: &()) -> Result<Vec<String>, LauncherError> {
        Err(LauncherError::Unsupported)
    }

    fn default_string(&self, _key: &(), _subpath: &str) -> Result<Option<String>, LauncherError> {
        Err(LauncherError::Unsupported)
    }
}
