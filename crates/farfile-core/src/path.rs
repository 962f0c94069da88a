//! Helpers for remote path strings.
//!
//! Remote paths are plain `/`-separated strings. Directory paths end in `/`
//! throughout; nothing here resolves `.` or `..` segments.

/// The remote root directory.
pub const ROOT: &str = "/";

/// Join a directory and an entry name, inserting `/` only when missing.
pub fn join_remote(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Path of a child directory, with the trailing slash.
pub fn child_dir(dir: &str, name: &str) -> String {
    ensure_dir_suffix(&join_remote(dir, name))
}

/// Append a trailing `/` if the path does not already end with one.
pub fn ensure_dir_suffix(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

/// Parent directory of a path, or `None` at the root.
///
/// Strips the last non-empty segment. The result always ends in `/`.
pub fn parent_dir(path: &str) -> Option<String> {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }

    match trimmed.rfind('/') {
        Some(idx) => Some(trimmed[..=idx].to_string()),
        None => Some(ROOT.to_string()),
    }
}

/// Final segment of a local path, accepting either separator.
pub fn file_name_of(local_path: &str) -> &str {
    match local_path.rsplit(['/', '\\']).next() {
        Some(name) if !name.is_empty() => name,
        _ => "unknown",
    }
}
