//! Confinement of user- or database-supplied relative paths.

use std::path::{Component, Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Resolve `relative` inside `base`.
///
/// Rejects absolute paths, any `..` component, and any path whose canonical
/// form (following symlinks) lands outside `base`. The target itself does not
/// need to exist, but its nearest existing ancestor is checked.
pub fn resolve_within(base: &Path, relative: &str) -> AppResult<PathBuf> {
    let trimmed = relative.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidPath("empty path".into()));
    }
    let candidate = Path::new(trimmed);
    if candidate.is_absolute() {
        return Err(AppError::InvalidPath(format!("absolute path {}", trimmed)));
    }
    for component in candidate.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => return Err(AppError::InvalidPath(format!("{} escapes its base", trimmed))),
        }
    }

    let base = base
        .canonicalize()
        .map_err(|e| AppError::FileSystem(format!("Cannot resolve {}: {}", base.display(), e)))?;
    let joined = base.join(candidate);

    let mut existing = joined.as_path();
    while !existing.exists() {
        existing = existing
            .parent()
            .ok_or_else(|| AppError::InvalidPath(format!("{} has no existing parent", trimmed)))?;
    }
    let canonical = existing
        .canonicalize()
        .map_err(|e| AppError::FileSystem(format!("Cannot resolve {}: {}", trimmed, e)))?;
    if !canonical.starts_with(&base) {
        return Err(AppError::InvalidPath(format!("{} resolves outside its base", trimmed)));
    }

    Ok(joined)
}

/// Whether `relative` resolves inside `base`.
pub fn is_within(base: &Path, relative: &str) -> bool {
    resolve_within(base, relative).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_nested_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("signatures")).unwrap();
        std::fs::write(dir.path().join("signatures/a.png"), b"x").unwrap();

        let resolved = resolve_within(dir.path(), "signatures/a.png").unwrap();
        assert!(resolved.ends_with("signatures/a.png"));
        assert!(resolve_within(dir.path(), "signatures/not-yet.png").is_ok());
    }

    #[test]
    fn test_rejects_traversal_and_absolute() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            resolve_within(dir.path(), "../etc/passwd"),
            Err(AppError::InvalidPath(_))
        ));
        assert!(matches!(
            resolve_within(dir.path(), "a/../../b"),
            Err(AppError::InvalidPath(_))
        ));
        assert!(matches!(
            resolve_within(dir.path(), "/etc/passwd"),
            Err(AppError::InvalidPath(_))
        ));
        assert!(!is_within(dir.path(), ""));
    }

    #[cfg(unix)]
    #[test]
    fn test_rejects_symlink_escape() {
        let outside = tempfile::tempdir().unwrap();
        let base = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), base.path().join("link")).unwrap();

        assert!(matches!(
            resolve_within(base.path(), "link/file.sql.gz"),
            Err(AppError::InvalidPath(_))
        ));
    }
}
