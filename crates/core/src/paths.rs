//! Filesystem-safe name and path derivation
//!
//! Remote-supplied display names and attachment filenames are arbitrary
//! strings; everything written to disk or into an archive goes through this
//! module first. Lengths are counted in characters, matching the bound the
//! remote-facing callers apply.

use std::path::{Path, PathBuf};

/// Maximum allowed length, in characters, for any derived file or folder path.
pub const MAX_PATH_LENGTH: usize = 200;

/// Replace every character outside `[A-Za-z0-9_.-]` with `_`.
///
/// Never fails; an empty input stays empty, so callers that need a
/// non-empty name must supply their own fallback before sanitizing.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Bound `path` to at most `max_len` characters.
///
/// A path that already fits is returned unchanged. Otherwise the budget
/// left after the directory portion (plus one separator) goes to the
/// filename, truncating the stem while keeping the extension intact when
/// possible; if even the extension does not fit, the raw filename is cut to
/// the budget.
///
/// When the directory alone exhausts the budget, the whole path string is
/// hard-truncated to `max_len` characters. This can destroy directory
/// structure and makes collisions possible; it is a documented weak
/// fallback, not an error.
pub fn bound_path(path: &Path, max_len: usize) -> PathBuf {
    let as_str = path.to_string_lossy();
    if as_str.chars().count() <= max_len {
        return path.to_path_buf();
    }

    let directory = path.parent().unwrap_or_else(|| Path::new(""));
    let filename = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();

    let dir_chars = directory.to_string_lossy().chars().count();
    // One character of the budget is reserved for the separator.
    if max_len <= dir_chars + 1 {
        return PathBuf::from(truncate_chars(&as_str, max_len));
    }
    let allowed = max_len - dir_chars - 1;

    let (stem, extension) = split_extension(&filename);
    let ext_chars = extension.chars().count();
    let truncated = if allowed <= ext_chars {
        truncate_chars(&filename, allowed)
    } else {
        format!("{}{}", truncate_chars(stem, allowed - ext_chars), extension)
    };

    directory.join(truncated)
}

/// Derive the on-disk folder for one project: `root/sanitize(name)_{gid}`,
/// bounded to `max_len`.
pub fn project_folder(root: &Path, display_name: &str, gid: &str, max_len: usize) -> PathBuf {
    let folder = format!("{}_{}", sanitize(display_name), gid);
    bound_path(&root.join(folder), max_len)
}

/// Derive the on-disk destination for one downloaded attachment:
/// `dir/task_{task_gid}_{original_name}` sanitized and bounded to `max_len`.
pub fn attachment_path(dir: &Path, task_gid: &str, original_name: &str, max_len: usize) -> PathBuf {
    let file_name = sanitize(&format!("task_{task_gid}_{original_name}"));
    bound_path(&dir.join(file_name), max_len)
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Split a filename into stem and extension, the extension keeping its dot.
/// A name whose only dots are leading (`.hidden`) has no extension.
fn split_extension(filename: &str) -> (&str, &str) {
    if let Some(idx) = filename.rfind('.') {
        if filename[..idx].chars().any(|c| c != '.') {
            return filename.split_at(idx);
        }
    }
    (filename, "")
}
