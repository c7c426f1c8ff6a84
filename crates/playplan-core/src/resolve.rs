use crate::error::{PlayplanError, Result};
use crate::glob;
use crate::ports::{Console, FileSystem};
use std::path::{Component, Path, PathBuf};

/// A command-line input after glob expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInput {
    /// The spelling shown to the user: the argument itself, or the path a
    /// glob expanded to.
    pub original: String,
    /// Absolute path used for de-duplication and I/O.
    pub resolved: PathBuf,
}

/// Expand, de-duplicate and check every input argument.
///
/// A glob matching nothing is a warning. A recursive glob, any hidden path,
/// and any missing file are errors; hidden and missing paths are each
/// reported as one batch.
pub fn resolve_inputs(
    args: &[String],
    fs: &dyn FileSystem,
    console: &dyn Console,
) -> Result<Vec<ResolvedInput>> {
    let mut expanded: Vec<String> = Vec::new();
    for arg in args {
        let matches = glob::expand(arg, fs)?;
        if glob::has_wildcard(arg) && matches.is_empty() {
            tracing::debug!(pattern = %arg, "glob matched no files");
            console.warn(&format!("warning: pattern '{arg}' matched no files"));
            continue;
        }
        expanded.extend(matches.into_iter().map(|p| p.to_string_lossy().into_owned()));
    }

    let inputs = dedupe(expanded, fs)?;

    let hidden: Vec<String> = inputs
        .iter()
        .filter(|input| is_hidden_path(Path::new(&input.original)))
        .map(|input| input.original.clone())
        .collect();
    if !hidden.is_empty() {
        return Err(PlayplanError::HiddenPaths(hidden));
    }

    let missing: Vec<String> = inputs
        .iter()
        .filter(|input| !fs.exists(&input.resolved))
        .map(|input| input.original.clone())
        .collect();
    if !missing.is_empty() {
        return Err(PlayplanError::MissingFiles(missing));
    }

    Ok(inputs)
}

/// Keep the first spelling of each distinct absolute path.
fn dedupe(originals: Vec<String>, fs: &dyn FileSystem) -> Result<Vec<ResolvedInput>> {
    let cwd = fs.current_dir()?;
    let mut out: Vec<ResolvedInput> = Vec::new();
    for original in originals {
        let resolved = absolute_path(Path::new(&original), &cwd, fs);
        if out.iter().any(|seen| seen.resolved == resolved) {
            tracing::debug!(input = %original, "skipping duplicate input");
            continue;
        }
        out.push(ResolvedInput { original, resolved });
    }
    Ok(out)
}

/// Canonical path when the file exists, lexically normalized otherwise.
fn absolute_path(path: &Path, cwd: &Path, fs: &dyn FileSystem) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    fs.canonicalize(&joined)
        .unwrap_or_else(|_| normalize_lexically(&joined))
}

pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// True when any segment starts with `.`, other than `.` and `..`.
pub fn is_hidden_path(path: &Path) -> bool {
    path.components().any(|component| match component {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}
