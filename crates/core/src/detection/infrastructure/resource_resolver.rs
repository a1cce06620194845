use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::RESOURCE_SUBDIR;

use super::haar_cascade::CascadeError;

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("{name} not found (searched: {})", display_paths(.searched))]
    NotFound { name: String, searched: Vec<PathBuf> },
    #[error(transparent)]
    Cascade(#[from] CascadeError),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Locate a classifier data file.
///
/// Resolution order:
/// 1. `resource_path` itself, when it names a file
/// 2. `resource_path/<name>`, when it names a directory
/// 3. Bundled `cascades/<name>` next to the running executable
pub fn resolve(name: &str, resource_path: &Path) -> Result<PathBuf, ResourceError> {
    let mut searched = Vec::new();

    if resource_path.is_file() {
        return Ok(resource_path.to_path_buf());
    }
    let in_dir = resource_path.join(name);
    if in_dir.is_file() {
        return Ok(in_dir);
    }
    searched.push(in_dir);

    if let Some(dir) = bundled_dir() {
        let bundled = dir.join(name);
        if bundled.is_file() {
            return Ok(bundled);
        }
        searched.push(bundled);
    }

    Err(ResourceError::NotFound {
        name: name.to_string(),
        searched,
    })
}

fn bundled_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()?
        .parent()
        .map(|d| d.join(RESOURCE_SUBDIR))
}
