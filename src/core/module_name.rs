use std::path::Path;

/// Map a file path to its dotted module name relative to the project root.
///
/// The `.py` suffix is stripped from the last segment, and a trailing
/// `__init__` segment is dropped entirely so a package's initializer maps to
/// the package itself rather than `pkg.__init__`. The root initializer maps
/// to the empty module name.
pub fn module_name(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);

    let mut parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if let Some(last) = parts.last_mut() {
        if let Some(stem) = last.strip_suffix(".py") {
            *last = stem.to_string();
        }
    }

    if parts.last().map(String::as_str) == Some("__init__") {
        parts.pop();
    }

    parts.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_plain_file() {
        let root = PathBuf::from("/project");
        assert_eq!(module_name(&root.join("a.py"), &root), "a");
    }

    #[test]
    fn test_nested_file() {
        let root = PathBuf::from("/project");
        assert_eq!(
            module_name(&root.join("pkg/sub/mod.py"), &root),
            "pkg.sub.mod"
        );
    }

    #[test]
    fn test_package_init_collapses() {
        let root = PathBuf::from("/project");
        assert_eq!(module_name(&root.join("pkg/__init__.py"), &root), "pkg");
    }

    #[test]
    fn test_root_init_is_empty() {
        let root = PathBuf::from("/project");
        assert_eq!(module_name(&root.join("__init__.py"), &root), "");
    }
}
