// Scanner module for finding betting slips on disk

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Slips are plain `.txt` exports, matched case-insensitively
pub fn is_slip_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("txt"))
        .unwrap_or(false)
}

/// Check if file contents look like text (not binary)
pub fn looks_like_text(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return true;
    }

    // Anything infer recognizes as a non-text format is binary
    if let Some(kind) = infer::get(bytes) {
        if !kind.mime_type().starts_with("text/") {
            return false;
        }
    }

    let non_text_count = bytes
        .iter()
        .filter(|&&b| b == 0 || (b < 32 && b != 9 && b != 10 && b != 13))
        .count();

    // More than 10% control bytes means binary
    non_text_count * 10 < bytes.len()
}

/// Directory slip labels and mirrored outputs are relative to
pub fn slip_root(target: &Path) -> PathBuf {
    if target.is_dir() {
        target.to_path_buf()
    } else {
        target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }
}

/// Slip files under `target`, sorted by path. A file target is returned as
/// is; `skip` prunes a directory (the destination) from the walk.
pub fn collect_slips(target: &Path, skip: Option<&Path>) -> Result<Vec<PathBuf>> {
    if target.is_file() {
        return Ok(vec![target.to_path_buf()]);
    }
    if !target.is_dir() {
        bail!("{} is neither a file nor a directory", target.display());
    }

    // A destination that does not exist yet has nothing to prune
    let skip = skip.and_then(|s| fs::canonicalize(s).ok());

    let mut slips = Vec::new();
    let walker = WalkDir::new(target)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| match &skip {
            Some(s) if e.file_type().is_dir() => {
                fs::canonicalize(e.path()).map_or(true, |p| &p != s)
            }
            _ => true,
        });
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", target.display()))?;
        if entry.file_type().is_file() && is_slip_file(entry.path()) {
            slips.push(entry.into_path());
        }
    }
    Ok(slips)
}

/// Read a slip, refusing binary files
pub fn read_slip(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if !looks_like_text(&bytes) {
        bail!("{} does not look like a text file", path.display());
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Short name for a slip, relative to the scan root when possible
pub fn slip_label(path: &Path, root: &Path) -> String {
    pathdiff::diff_paths(path, root)
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}

/// Where the normalized copy of `path` goes under `dest`
pub fn mirrored_path(path: &Path, root: &Path, dest: &Path) -> PathBuf {
    match pathdiff::diff_paths(path, root) {
        Some(relative) if !relative.starts_with("..") && !relative.as_os_str().is_empty() => {
            dest.join(relative)
        }
        _ => dest.join(path.file_name().unwrap_or(path.as_os_str())),
    }
}

/// Write normalized text, creating parent directories as needed
pub fn write_normalized(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut contents = text.to_string();
    if !contents.is_empty() {
        contents.push('\n');
    }
    fs::write(path, contents)?;
    Ok(())
}
