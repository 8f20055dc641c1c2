use crate::error::{LauncherError, Result};
use globset::{Glob, GlobMatcher};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const INPUT_EXTENSION: &str = ".json";

/// Appends `.json` unless the name already ends with it.
pub fn normalize_input_name(name: &str) -> String {
    let name = name.trim();
    if name.ends_with(INPUT_EXTENSION) {
        name.to_string()
    } else {
        format!("{}{}", name, INPUT_EXTENSION)
    }
}

/// Normalizes the user's answer and checks that it names an existing file.
///
/// The returned path is exactly what the user typed (plus the suffix); it is
/// only joined onto `base_dir` for the existence check.
pub fn resolve_input(base_dir: &Path, answer: &str) -> Result<PathBuf> {
    let path = PathBuf::from(normalize_input_name(answer));

    if !base_dir.join(&path).is_file() {
        return Err(LauncherError::InputNotFound {
            path: path.display().to_string(),
        });
    }

    Ok(path)
}

/// Files directly inside `dir` whose names match `pattern`, sorted by name.
pub fn list_candidates(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let matcher: GlobMatcher = Glob::new(pattern)?.compile_matcher();

    let mut candidates: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| matcher.is_match(entry.file_name()))
        .map(|entry| PathBuf::from(entry.file_name()))
        .collect();

    candidates.sort();
    Ok(candidates)
}
