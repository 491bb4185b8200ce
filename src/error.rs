//! Terminal launcher failures and their exit codes.

use thiserror::Error;

/// Exit status used for failures that do not carry an OS error code.
pub const GENERIC_EXIT_CODE: i32 = 255;

/// Message box title for OS call failures.
pub const OS_ERROR_TITLE: &str = "Error";
/// Message box title for the launcher's own failures.
pub const LAUNCHER_ERROR_TITLE: &str = "ERROR";

/// `ERROR_FILE_NOT_FOUND`; also what the registry reports for a missing key or value.
pub const ERROR_FILE_NOT_FOUND: u32 = 2;

#[derive(Debug, Error)]
pub enum LauncherError {
    #[error("{function} failed with error {code}: {}", describe(.code))]
    Os { function: &'static str, code: u32 },

    #[error("Could not find a WinSync install")]
    NotFound,

    #[error("the Windows registry is not available on this platform")]
    Unsupported,

    #[error("{0}")]
    Message(String),
}

impl LauncherError {
    pub fn os(function: &'static str, code: u32) -> Self {
        Self::Os { function, code }
    }

    /// Builds an [`LauncherError::Os`] from an `io::Error`, falling back to a
    /// plain message when the error did not come from the OS.
    pub fn from_io(function: &'static str, err: &std::io::Error) -> Self {
        match err.raw_os_error() {
            Some(code) => Self::os(function, code as u32),
            None => Self::Message(format!("{function} failed: {err}")),
        }
    }

    /// Process exit status for this failure. OS errors exit with their own
    /// 32-bit code, everything else with 255.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Os { code: 0, .. } => GENERIC_EXIT_CODE,
            Self::Os { code, .. } => *code as i32,
            _ => GENERIC_EXIT_CODE,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Os { .. } => OS_ERROR_TITLE,
            _ => LAUNCHER_ERROR_TITLE,
        }
    }
}

fn describe(code: &u32) -> String {
    system_message(*code)
}

/// Exit status for any error reaching `main`.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<LauncherError>()
        .map(LauncherError::exit_code)
        .unwrap_or(GENERIC_EXIT_CODE)
}

/// Message box title for any error reaching `main`.
pub fn title_for(err: &anyhow::Error) -> &'static str {
    err.downcast_ref::<LauncherError>()
        .map(LauncherError::title)
        .unwrap_or(OS_ERROR_TITLE)
}

/// Status handed to `std::process::exit`. Windows keeps all 32 bits; Unix
/// keeps only the low byte, so a nonzero code that would read as success
/// there becomes 255.
pub fn process_exit_code(code: i32) -> i32 {
    if cfg!(windows) || code == 0 || code & 0xff != 0 {
        code
    } else {
        GENERIC_EXIT_CODE
    }
}

/// Human readable text for a Win32 error code.
#[cfg(windows)]
pub fn system_message(code: u32) -> String {
    use windows_sys::Win32::System::Diagnostics::Debug::{
        FormatMessageW, FORMAT_MESSAGE_FROM_SYSTEM, FORMAT_MESSAGE_IGNORE_INSERTS,
    };

    let mut buf = [0u16; 512];
    let len = unsafe {
        FormatMessageW(
            FORMAT_MESSAGE_FROM_SYSTEM | FORMAT_MESSAGE_IGNORE_INSERTS,
            std::ptr::null(),
            code,
            0,
            buf.as_mut_ptr(),
            buf.len() as u32,
            std::ptr::null(),
        )
    } as usize;

    if len == 0 {
        return format!("unknown error {code}");
    }
    String::from_utf16_lossy(&buf[..len]).trim_end().to_string()
}

#[cfg(not(windows))]
pub fn system_message(code: u32) -> String {
    let text = std::io::Error::from_raw_os_error(code as i32).to_string();
    // std appends " (os error N)"
    match text.rfind(" (os error") {
        Some(idx) => text[..idx].to_string(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_errors_exit_with_their_code() {
        assert_eq!(LauncherError::os("CreateProcess", 5).exit_code(), 5);
        assert_eq!(LauncherError::os("RegEnumKeyEx", 1018).exit_code(), 1018);
        assert_eq!(LauncherError::os("CloseHandle", 0).exit_code(), 255);
    }

    #[test]
    fn nonzero_codes_never_exit_as_success() {
        assert_eq!(process_exit_code(0), 0);
        assert_eq!(process_exit_code(7), 7);
        assert_eq!(process_exit_code(1018), 1018);
        assert_ne!(process_exit_code(256), 0);
        assert_ne!(process_exit_code(512), 0);
        if cfg!(windows) {
            assert_eq!(process_exit_code(256), 256);
        } else {
            assert_eq!(process_exit_code(256), 255);
        }
    }

    #[test]
    fn titles_follow_the_failure_kind() {
        assert_eq!(LauncherError::os("CreateProcess", 2).title(), "Error");
        assert_eq!(LauncherError::NotFound.title(), "ERROR");
        assert_eq!(LauncherError::Unsupported.title(), "ERROR");
        assert_eq!(title_for(&anyhow::Error::new(LauncherError::NotFound)), "ERROR");
        assert_eq!(title_for(&anyhow::anyhow!("bad rc file")), "Error");
    }

    #[test]
    fn other_errors_exit_with_255() {
        assert_eq!(LauncherError::NotFound.exit_code(), 255);
        assert_eq!(LauncherError::Unsupported.exit_code(), 255);
        assert_eq!(LauncherError::Message("x".into()).exit_code(), 255);
    }

    #[test]
    fn anyhow_errors_are_downcast() {
        let err = anyhow::Error::new(LauncherError::os("RegOpenKeyEx", 2));
        assert_eq!(exit_code_for(&err), 2);
        assert_eq!(exit_code_for(&anyhow::anyhow!("plain")), 255);
    }

    #[test]
    fn os_error_message_names_the_function() {
        let text = LauncherError::os("RegGetValue (installpath)", 2).to_string();
        assert!(text.starts_with("RegGetValue (installpath) failed with error 2: "));
        assert!(!text.contains("os error"));
    }

    #[test]
    fn not_found_message() {
        assert_eq!(LauncherError::NotFound.to_string(), "Could not find a WinSync install");
    }
}
