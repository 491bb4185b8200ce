//! Surfacing terminal failures to the user.
//!
//! The release binary has no console, so failures go to a modal message box.
//! When stderr is attached to a terminal the text is printed there as well.

use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

/// Prints `text` to stderr in the launcher's error style.
pub fn print_error(title: &str, text: &str) {
    eprintln!("{}: {}", title.red().bold(), text);
}

/// Shows `text` in an error message box and echoes it to a terminal stderr.
pub fn display_error(title: &str, text: &str) {
    if std::io::stderr().is_terminal() || !cfg!(windows) {
        print_error(title, text);
    }
    message_box(title, text);
}

#[cfg(windows)]
fn message_box(title: &str, text: &str) {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;

    use windows_sys::Win32::UI::WindowsAndMessaging::{MessageBoxW, MB_ICONERROR, MB_OK};

    let wide = |s: &str| -> Vec<u16> { OsStr::new(s).encode_wide().chain(Some(0)).collect() };
    let text = wide(text);
    let title = wide(title);
    unsafe {
        MessageBoxW(
            std::ptr::null_mut(),
            text.as_ptr(),
            title.as_ptr(),
            MB_ICONERROR | MB_OK,
        );
    }
}

#[cfg(not(windows))]
fn message_box(_title: &str, _text: &str) {}
