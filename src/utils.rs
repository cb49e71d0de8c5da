use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{AnalyzerError, Result};

pub fn write_atomic<F>(path: &Path, write_fn: F) -> Result<()>
where
    F: FnOnce(&mut NamedTempFile) -> std::io::Result<()>,
{
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    let mut temp = NamedTempFile::new_in(parent).map_err(|err| AnalyzerError::io(parent, err))?;
    write_fn(&mut temp).map_err(|err| AnalyzerError::io(path, err))?;
    temp.flush().map_err(|err| AnalyzerError::io(path, err))?;
    temp.persist(path)
        .map_err(|err| AnalyzerError::io(path, err.error))?;
    Ok(())
}

pub fn write_atomic_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    write_atomic(path, |file| file.write_all(bytes))
}

pub fn ensure_parent_dir(path: &Path) -> Result<Option<PathBuf>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|err| AnalyzerError::io(parent, err))?;
            return Ok(Some(parent.to_path_buf()));
        }
    }
    Ok(None)
}

/// Slice `chars[start..end]` where a negative bound counts back from the
/// end. Both bounds are then clamped to `0..=len`; an inverted range is empty.
pub fn wrapping_slice(chars: &[char], start: isize, end: isize) -> String {
    let len = chars.len() as isize;
    let clamp = |idx: isize| -> usize {
        let idx = if idx < 0 { idx + len } else { idx };
        idx.clamp(0, len) as usize
    };
    let (start, end) = (clamp(start), clamp(end));
    if start >= end {
        return String::new();
    }
    chars[start..end].iter().collect()
}
