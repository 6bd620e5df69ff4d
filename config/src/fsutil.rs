//! Filesystem helpers for staging model repositories.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Recursively copy a directory tree.
///
/// Symlinks inside the tree are recreated with their stored targets,
/// not followed. Errors surface unchanged.
pub fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else if file_type.is_symlink() {
            let link = fs::read_link(entry.path())?;
            make_symlink(&link, &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Express `path` relative to the directory `base`.
///
/// Both sides are made absolute against the current directory first, so
/// a relative base and an absolute path mix cleanly.
pub fn relative_to(path: &Path, base: &Path) -> io::Result<PathBuf> {
    let path = std::path::absolute(path)?;
    let base = std::path::absolute(base)?;

    let path_parts: Vec<Component> = path.components().collect();
    let base_parts: Vec<Component> = base.components().collect();
    let common = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| *a == *b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &path_parts[common..] {
        relative.push(part);
    }
    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    Ok(relative)
}

/// Create a symlink whose stored target is `target` verbatim.
#[cfg(unix)]
pub fn make_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
pub fn make_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}
