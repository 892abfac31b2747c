//! Path validation against the allowed roots.
//!
//! Every handler resolves its path arguments through [`PathSandbox::check`]
//! and performs I/O only on the canonical path it returns.

use crate::error::Error;
use std::path::{Path, PathBuf};

/// The fixed set of canonical directories the server may touch.
#[derive(Debug, Clone)]
pub struct PathSandbox {
    roots: Vec<PathBuf>,
}

impl PathSandbox {
    /// Canonicalize the given directories, skipping any that don't exist or
    /// aren't directories. Duplicates keep their first position.
    pub fn new(dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut roots: Vec<PathBuf> = Vec::new();
        for dir in dirs {
            let Ok(canonical) = dir.canonicalize() else {
                tracing::warn!(dir = %dir.display(), "skipping unresolvable root");
                continue;
            };
            if canonical.is_dir() && !roots.contains(&canonical) {
                roots.push(canonical);
            }
        }
        Self { roots }
    }

    /// The canonical allowed roots, in configuration order.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Whether `path` resolves to a root or to something nested under one.
    pub fn allowed(&self, path: &str) -> bool {
        self.check(path).is_ok()
    }

    /// Validate `path` and return its canonical form.
    ///
    /// Steps:
    /// 1. Reject empty paths and paths containing null bytes
    /// 2. Canonicalize the path (resolves symlinks, `..`, etc.)
    ///    - If only the final component is missing, canonicalize the parent
    ///      and re-attach the file name
    /// 3. Verify the canonical path is one of the roots or lies beneath one,
    ///    comparing whole components so `/home/al` never admits `/home/alice`
    pub fn check(&self, path: &str) -> Result<PathBuf, Error> {
        let denied = || Error::AccessDenied(path.to_owned());
        if path.is_empty() || path.contains('\0') {
            return Err(denied());
        }

        let canonical = resolve(Path::new(path)).ok_or_else(denied)?;
        if self.contains(&canonical) {
            Ok(canonical)
        } else {
            Err(denied())
        }
    }

    /// Whether an already canonical path lies inside the sandbox.
    pub fn contains(&self, canonical: &Path) -> bool {
        self.roots.iter().any(|root| canonical.starts_with(root))
    }

    /// Whether a canonical path is exactly one of the roots.
    pub fn is_root(&self, canonical: &Path) -> bool {
        self.roots.iter().any(|root| root == canonical)
    }
}

fn resolve(path: &Path) -> Option<PathBuf> {
    match path.canonicalize() {
        Ok(canonical) => Some(canonical),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let name = path.file_name()?;
            let parent = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            parent.canonicalize().ok().map(|p| p.join(name))
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::sandbox::PathSandbox;
    use std::fs;

    fn sandbox_in(dir: &std::path::Path) -> PathSandbox {
        PathSandbox::new(vec![dir.to_path_buf()])
    }

    #[test]
    fn allows_root_and_nested_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().canonicalize().unwrap();
        fs::create_dir(root.join("docs")).unwrap();
        fs::write(root.join("docs/a.txt"), "a").unwrap();
        let sandbox = sandbox_in(&root);

        assert!(sandbox.allowed(root.to_str().unwrap()));
        assert!(sandbox.allowed(&format!("{}/", root.display())));
        assert!(sandbox.allowed(root.join("docs/a.txt").to_str().unwrap()));
        assert!(sandbox.allowed(&format!("{}/docs/", root.display())));
    }

    #[test]
    fn rejects_traversal_out_of_root() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("root");
        fs::create_dir(&root).unwrap();
        fs::create_dir(tmp.path().join("outside")).unwrap();
        let sandbox = sandbox_in(&root);

        let escaped = format!("{}/../outside", root.display());
        assert!(!sandbox.allowed(&escaped));
        assert!(!sandbox.allowed("/etc/passwd"));
    }

    #[test]
    fn rejects_sibling_sharing_name_prefix() {
        let tmp = tempfile::tempdir().unwrap();
        let alice = tmp.path().join("alice");
        let alice2 = tmp.path().join("alice2");
        fs::create_dir(&alice).unwrap();
        fs::create_dir(&alice2).unwrap();
        let sandbox = sandbox_in(&alice);

        assert!(!sandbox.allowed(alice2.to_str().unwrap()));
    }

    #[test]
    fn rejects_empty_and_null_byte() {
        let tmp = tempfile::tempdir().unwrap();
        let sandbox = sandbox_in(tmp.path());
        assert!(!sandbox.allowed(""));
        assert!(!sandbox.allowed(&format!("{}/foo\0bar", tmp.path().display())));
    }

    #[test]
    fn missing_leaf_is_checked_through_its_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().canonicalize().unwrap();
        let sandbox = sandbox_in(&root);

        let missing = root.join("missing.txt");
        assert_eq!(
            sandbox.check(missing.to_str().unwrap()).unwrap(),
            missing
        );
        assert!(!sandbox.allowed(root.join("no/such/file").to_str().unwrap()));
    }

    #[cfg(unix)]
    #[test]
    fn rejects_symlink_escaping_root() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("root");
        let outside = tmp.path().join("outside");
        fs::create_dir(&root).unwrap();
        fs::create_dir(&outside).unwrap();
        fs::write(outside.join("secret"), "s").unwrap();
        std::os::unix::fs::symlink(&outside, root.join("link")).unwrap();
        let sandbox = sandbox_in(&root);

        assert!(!sandbox.allowed(root.join("link/secret").to_str().unwrap()));
    }

    #[test]
    fn drops_missing_and_duplicate_roots() {
        let tmp = tempfile::tempdir().unwrap();
        let sandbox = PathSandbox::new(vec![
            tmp.path().to_path_buf(),
            tmp.path().join("missing"),
            tmp.path().join("."),
        ]);
        assert_eq!(sandbox.roots(), &[tmp.path().canonicalize().unwrap()]);
    }
}
