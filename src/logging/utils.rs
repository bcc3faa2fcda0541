//! Log file location, ANSI stripping and timestamps.
use std::ffi::OsString;
use std::path::PathBuf;

/// Remove ANSI CSI sequences (`ESC [ ... final`) and lone escapes.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find('\x1b') {
        let (text, escape) = rest.split_at(start);
        out.push_str(text);
        let mut chars = escape.chars();
        chars.next();
        rest = match chars.next() {
            Some('[') => {
                let csi = chars.as_str();
                csi.find(|c: char| ('@'..='~').contains(&c))
                    .map_or("", |end| csi.split_at(end + 1).1)
            }
            // Lone escape: drop it and the character it introduces.
            _ => chars.as_str(),
        };
    }
    out.push_str(rest);
    out
}

/// `goot` cache directory from the given `XDG_CACHE_HOME` and home values.
///
/// Falls back to the current directory when neither is set.
pub(super) fn cache_dir(xdg_cache_home: Option<OsString>, home: Option<OsString>) -> PathBuf {
    xdg_cache_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home.map(|home| PathBuf::from(home).join(".cache")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("goot")
}

/// Log file for `command` under the user's cache directory.
///
/// Nothing is created here; the file layer creates the directory when it
/// opens the file.
#[must_use]
pub fn log_file_path(command: &str) -> PathBuf {
    let home = dirs::home_dir().map(PathBuf::into_os_string);
    cache_dir(std::env::var_os("XDG_CACHE_HOME"), home).join(format!("{command}.log"))
}

/// Current UTC time rendered with a `chrono` format string.
pub(super) fn utc_now(format: &str) -> String {
    chrono::Utc::now().format(format).to_string()
}
