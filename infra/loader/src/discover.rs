use crate::error::{LoaderError, LoaderErrorExt};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// File extensions recognized as module configs.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["toml", "json", "yaml", "yml"];

/// A config file and the module id derived from its file stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub module_id: String,
    pub path: PathBuf,
}

/// Lists the config files directly inside `dir`, sorted by module id.
///
/// Files with unsupported extensions and non-UTF-8 names are skipped.
///
/// # Errors
/// Returns [`LoaderError::Walk`] if `dir` cannot be read and
/// [`LoaderError::DuplicateModule`] if two files share a stem.
pub fn discover(dir: impl AsRef<Path>) -> Result<Vec<ConfigSource>, LoaderError> {
    let dir = dir.as_ref();
    let mut sources: Vec<ConfigSource> = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Scanning {}", dir.display()))?;
        if !entry.file_type().is_file() || !is_supported(entry.path()) {
            continue;
        }

        let Some(module_id) = entry.path().file_stem().and_then(|s| s.to_str()).map(str::to_owned)
        else {
            warn!(path = %entry.path().display(), "Skipping config file with a non UTF-8 name");
            continue;
        };

        if sources.iter().any(|s| s.module_id == module_id) {
            return Err(LoaderError::DuplicateModule {
                module_id: Cow::Owned(module_id),
                context: Some(format!("in {}", dir.display()).into()),
            });
        }

        debug!(module_id = module_id.as_str(), path = %entry.path().display(), "Discovered module config");
        sources.push(ConfigSource { module_id, path: entry.into_path() });
    }

    sources.sort_by(|a, b| a.module_id.cmp(&b.module_id));
    Ok(sources)
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.iter().any(|s| s.eq_ignore_ascii_case(ext)))
}
