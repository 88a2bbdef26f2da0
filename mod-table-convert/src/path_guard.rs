use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Fail when `output` resolves to the same file as `input`.
pub fn ensure_output_not_same(output: &Path, input: &Path) -> Result<()> {
    let output_resolved = resolve(output)
        .with_context(|| format!("failed to resolve output path {}", output.display()))?;
    let input_resolved = resolve(input)
        .with_context(|| format!("failed to resolve input path {}", input.display()))?;

    if output_resolved == input_resolved {
        bail!(
            "refusing to overwrite the input: output {} is the same file as {}",
            output.display(),
            input.display()
        );
    }
    Ok(())
}

/// Canonical form of `path`. A file that does not exist yet is resolved through its parent
/// directory so that `dir/../out.xlsx` and `out.xlsx` compare equal.
fn resolve(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return path
            .canonicalize()
            .with_context(|| format!("canonicalize {}", path.display()));
    }

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().context("current_dir")?,
    };
    let parent = parent.canonicalize().unwrap_or(parent);
    Ok(match path.file_name() {
        Some(name) => parent.join(name),
        None => parent,
    })
}
