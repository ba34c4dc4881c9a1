use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{CallmapError, Result};

/// Directory names excluded from every walk
pub const ALWAYS_IGNORED: &[&str] = &[".git", "__pycache__"];

/// Build the set of ignored directory names for a project root.
///
/// Reads the project's `.gitignore` if present. Each non-empty, non-comment
/// line is stripped of trailing path separators and leading `*`/`/` markers
/// and treated as a literal directory name to exclude anywhere in the tree,
/// not as a path or glob.
pub fn load_ignore_names(root: &Path, extra: &[String]) -> Result<HashSet<String>> {
    let mut ignore: HashSet<String> = ALWAYS_IGNORED.iter().map(|s| s.to_string()).collect();
    ignore.extend(extra.iter().cloned());

    let gitignore = root.join(".gitignore");
    if gitignore.exists() {
        let content = std::fs::read_to_string(&gitignore)?;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let name = line.trim_end_matches('/').trim_start_matches(['*', '/']);
            if !name.is_empty() {
                ignore.insert(name.to_string());
            }
        }
    }

    Ok(ignore)
}

/// Recursively collect every source file under `root` with the given
/// extension, pruning ignored directory names at every level.
///
/// The result is sorted so the rest of the run processes files in a stable
/// order.
pub fn find_source_files(
    root: &Path,
    extension: &str,
    ignore: &HashSet<String>,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        // The root itself is never pruned, whatever it is named
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        entry
            .file_name()
            .to_str()
            .map_or(true, |name| !ignore.contains(name))
    });

    for entry in walker {
        let entry = entry.map_err(|e| CallmapError::FileSystem(e.to_string()))?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|e| e.to_str()) == Some(extension)
        {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignore_line_stripping() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".gitignore"),
            "# build artifacts\nbuild/\n**/dist\n\n/venv\n*.tmp\n",
        )
        .unwrap();

        let ignore = load_ignore_names(dir.path(), &[]).unwrap();
        assert!(ignore.contains(".git"));
        assert!(ignore.contains("__pycache__"));
        assert!(ignore.contains("build"));
        assert!(ignore.contains("dist"));
        assert!(ignore.contains("venv"));
        // "*.tmp" loses its leading wildcard and is kept as a literal name
        assert!(ignore.contains(".tmp"));
        assert!(!ignore.contains("# build artifacts"));
    }

    #[test]
    fn test_missing_gitignore_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let ignore = load_ignore_names(dir.path(), &["vendor".to_string()]).unwrap();
        assert!(ignore.contains(".git"));
        assert!(ignore.contains("vendor"));
    }

    #[test]
    fn test_walk_prunes_ignored_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("pkg")).unwrap();
        std::fs::create_dir_all(dir.path().join("build/deep")).unwrap();
        std::fs::write(dir.path().join("top.py"), "").unwrap();
        std::fs::write(dir.path().join("pkg/mod.py"), "").unwrap();
        std::fs::write(dir.path().join("pkg/notes.txt"), "").unwrap();
        std::fs::write(dir.path().join("build/deep/generated.py"), "").unwrap();

        let mut ignore = HashSet::new();
        ignore.insert("build".to_string());

        let files = find_source_files(dir.path(), "py", &ignore).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| {
                p.strip_prefix(dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();

        assert_eq!(names, vec!["pkg/mod.py".to_string(), "top.py".to_string()]);
    }
}
