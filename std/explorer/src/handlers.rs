//! The four filesystem queries.
//!
//! Each handler validates its path arguments through the sandbox before any
//! I/O and states its failures in the returned [`Error`]. Failures tied to a
//! single entry of a listing degrade that line only.

use crate::content::{ContentItem, OperationResult};
use crate::error::Error;
use crate::inspect::{is_textual, mime_type, read_prefix, timestamp};
use crate::sandbox::PathSandbox;
use std::cmp::Ordering;
use std::fmt::Write;
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};

/// Entries listed by `search-files` before the result is clipped.
pub const MAX_SEARCH_RESULTS: usize = 20;

/// Entries listed by `explore-paths` before the result is clipped.
pub const MAX_EXPLORE_ENTRIES: usize = 50;

/// Characters of a text file shown by `file-info`.
pub const MAX_PREVIEW_CHARS: usize = 500;

/// Appended to a clipped `file-info` preview.
pub const PREVIEW_TRUNCATION_MARKER: &str = "...(truncated)";

/// Expand `directory/pattern` and report the matches.
pub fn search_files(
    sandbox: &PathSandbox,
    pattern: &str,
    directory: &str,
) -> Result<OperationResult, Error> {
    let base = sandbox.check(directory)?;
    if !stat(&base, directory)?.is_dir() {
        return Err(Error::NotADirectory(directory.to_owned()));
    }

    let matches = expand_pattern(sandbox, &base, pattern)?;
    if matches.is_empty() {
        return Ok(OperationResult::text(format!(
            "no files matching '{pattern}'"
        )));
    }

    let mut text = format!("found {} matches for '{pattern}':\n\n", matches.len());
    for path in matches.iter().take(MAX_SEARCH_RESULTS) {
        let relative = path.strip_prefix(&base).unwrap_or(path.as_path()).display();
        match fs::metadata(path) {
            Ok(meta) => {
                let _ = writeln!(
                    text,
                    "- {relative} ({} bytes, modified {})",
                    meta.len(),
                    timestamp(meta.modified())
                );
            }
            Err(_) => {
                let _ = writeln!(text, "- {relative} (unable to stat)");
            }
        }
    }
    if matches.len() > MAX_SEARCH_RESULTS {
        let _ = write!(
            text,
            "\n... {} total, showing first {MAX_SEARCH_RESULTS}",
            matches.len()
        );
    }
    Ok(OperationResult::text(text))
}

/// Metadata, timestamps and, for text files, a short preview.
pub fn file_info(sandbox: &PathSandbox, path: &str) -> Result<OperationResult, Error> {
    let canonical = sandbox.check(path)?;
    let meta = stat(&canonical, path)?;
    let mime = if meta.is_dir() {
        "inode/directory".to_owned()
    } else {
        mime_type(&canonical)
    };

    let mut text = format!("file info: {path}\n");
    let _ = writeln!(
        text,
        "type: {}",
        if meta.is_dir() { "directory" } else { "file" }
    );
    let _ = writeln!(text, "mime type: {mime}");
    let _ = writeln!(text, "size: {} bytes", meta.len());
    let _ = writeln!(text, "created: {}", timestamp(meta.created()));
    let _ = writeln!(text, "modified: {}", timestamp(meta.modified()));
    let _ = writeln!(text, "accessed: {}", timestamp(meta.accessed()));

    if meta.is_file() && is_textual(&mime) {
        let preview = match read_prefix(&canonical, MAX_PREVIEW_CHARS) {
            Ok((mut preview, clipped)) => {
                if clipped {
                    preview.push_str(PREVIEW_TRUNCATION_MARKER);
                }
                preview
            }
            Err(e) => {
                tracing::debug!(path, error = %e, "preview unavailable");
                "unable to read preview".to_owned()
            }
        };
        let _ = write!(text, "\npreview:\n{preview}\n");
    }

    Ok(OperationResult::text(text).with_resource(ContentItem::file_ref(&canonical)))
}

/// List the allowed roots, or one level of a path inside them.
///
/// Only single-level exploration is performed; `depth` is validated and
/// otherwise reserved.
pub fn explore_paths(
    sandbox: &PathSandbox,
    base_path: Option<&str>,
    depth: Option<i64>,
) -> Result<OperationResult, Error> {
    if let Some(depth) = depth.filter(|d| *d < 1) {
        return Err(Error::InvalidArgument(format!(
            "depth must be at least 1, got {depth}"
        )));
    }

    let base = match base_path {
        Some(base) => base.to_owned(),
        None => std::env::current_dir()?.display().to_string(),
    };
    if base.is_empty() || base == "." {
        let mut text = String::from("accessible roots:\n\n");
        for root in sandbox.roots() {
            let _ = writeln!(text, "- {}", root.display());
        }
        return Ok(OperationResult::text(text));
    }

    let canonical = sandbox.check(&base)?;
    let meta = stat(&canonical, &base)?;
    if !meta.is_dir() {
        let text = format!(
            "file: {}\nsize: {} bytes\nmodified: {}\n",
            canonical.display(),
            meta.len(),
            timestamp(meta.modified())
        );
        return Ok(OperationResult::text(text).with_resource(ContentItem::file_ref(&canonical)));
    }

    let entries = read_entries(&canonical)?;
    let mut text = format!("directory: {}\n\n", canonical.display());
    write_entries(&mut text, entries.iter().take(MAX_EXPLORE_ENTRIES));
    if entries.len() > MAX_EXPLORE_ENTRIES {
        let _ = writeln!(
            text,
            "\n(showing first {MAX_EXPLORE_ENTRIES} of {} entries)",
            entries.len()
        );
    }

    text.push_str("\nnavigation:\n");
    let parent = canonical
        .parent()
        .filter(|p| !sandbox.is_root(&canonical) && sandbox.contains(p));
    if let Some(parent) = parent {
        let _ = writeln!(text, "- parent: {}", parent.display());
    }
    text.push_str("hint: call explore-paths with a listed directory as base_path to keep browsing");
    Ok(OperationResult::text(text))
}

/// List every child of a directory.
pub fn list_directory(sandbox: &PathSandbox, path: &str) -> Result<OperationResult, Error> {
    let canonical = sandbox.check(path)?;
    if !stat(&canonical, path)?.is_dir() {
        return Err(Error::NotADirectory(path.to_owned()));
    }

    let entries = read_entries(&canonical)?;
    let mut text = format!("{path} contains {} entries:\n\n", entries.len());
    write_entries(&mut text, entries.iter());
    Ok(OperationResult::text(text))
}

/// Expand a relative glob pattern under `base` one directory level at a
/// time. Each directory is sandbox-checked before it is read, so a symlink
/// inside the root never leads the walk outside it.
///
/// Matches that resolve outside the sandbox are dropped; matches that can't
/// be resolved at all (dangling links) are kept for the caller to report.
fn expand_pattern(
    sandbox: &PathSandbox,
    base: &Path,
    pattern: &str,
) -> Result<Vec<PathBuf>, Error> {
    let invalid =
        |reason: &str| Error::InvalidArgument(format!("invalid pattern '{pattern}': {reason}"));
    if pattern.starts_with('/') || pattern.starts_with(std::path::MAIN_SEPARATOR) {
        return Err(invalid("must be relative to the directory"));
    }
    let components: Vec<&str> = pattern
        .split(['/', std::path::MAIN_SEPARATOR])
        .filter(|c| !c.is_empty() && *c != ".")
        .collect();
    if components.is_empty() {
        return Err(invalid("empty pattern"));
    }
    if components.contains(&"..") {
        return Err(invalid("'..' is not allowed"));
    }
    let compiled = components
        .iter()
        .map(|c| glob::Pattern::new(c).map_err(|e| invalid(&e.to_string())))
        .collect::<Result<Vec<_>, _>>()?;

    let mut frontier = vec![base.to_path_buf()];
    for (depth, component) in compiled.iter().enumerate() {
        let last = depth + 1 == compiled.len();
        let mut next = Vec::new();
        for dir in &frontier {
            let inside = dir
                .canonicalize()
                .map(|c| sandbox.contains(&c))
                .unwrap_or(false);
            if !inside {
                continue;
            }
            let Ok(read_dir) = fs::read_dir(dir) else {
                continue;
            };
            let mut names: Vec<_> = read_dir
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name())
                .collect();
            names.sort();
            for name in names {
                if !component.matches(&name.to_string_lossy()) {
                    continue;
                }
                let child = dir.join(&name);
                if last || child.is_dir() {
                    next.push(child);
                }
            }
        }
        frontier = next;
    }

    frontier.retain(|path| match path.canonicalize() {
        Ok(canonical) => sandbox.contains(&canonical),
        Err(_) => true,
    });
    Ok(frontier)
}

/// A child of a listed directory.
#[derive(Debug)]
struct Entry {
    name: String,
    is_dir: bool,
    /// File size, when it could be read.
    size: Option<u64>,
}

/// Read the children of `dir`, directories first, then files, each group
/// ordered case-insensitively.
fn read_entries(dir: &Path) -> Result<Vec<Entry>, Error> {
    let mut entries: Vec<Entry> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            // Follows symlinks, so a link to a directory lists as one.
            match fs::metadata(entry.path()) {
                Ok(meta) if meta.is_dir() => Entry {
                    name,
                    is_dir: true,
                    size: None,
                },
                Ok(meta) => Entry {
                    name,
                    is_dir: false,
                    size: Some(meta.len()),
                },
                Err(_) => Entry {
                    name,
                    is_dir: false,
                    size: None,
                },
            }
        })
        .collect();
    entries.sort_by(entry_order);
    Ok(entries)
}

fn entry_order(a: &Entry, b: &Entry) -> Ordering {
    b.is_dir
        .cmp(&a.is_dir)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.name.cmp(&b.name))
}

fn write_entries<'a>(text: &mut String, entries: impl Iterator<Item = &'a Entry>) {
    let (dirs, files): (Vec<&Entry>, Vec<&Entry>) = entries.partition(|e| e.is_dir);
    if !dirs.is_empty() {
        text.push_str("directories:\n");
        for dir in &dirs {
            let _ = writeln!(text, "- {}/", dir.name);
        }
    }
    if !files.is_empty() {
        if !dirs.is_empty() {
            text.push('\n');
        }
        text.push_str("files:\n");
        for file in &files {
            match file.size {
                Some(size) => {
                    let _ = writeln!(text, "- {} ({size} bytes)", file.name);
                }
                None => {
                    let _ = writeln!(text, "- {}", file.name);
                }
            }
        }
    }
}

/// Metadata of a validated path, mapping absence to [`Error::NotFound`]
/// under the name the caller used.
fn stat(canonical: &Path, shown: &str) -> Result<Metadata, Error> {
    fs::metadata(canonical).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(shown.to_owned()),
        _ => Error::Io(e),
    })
}
