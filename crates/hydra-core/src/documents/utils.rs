//! Path handling and document file helpers.

use std::{
    env::current_dir,
    fs,
    path::{Component, Path, PathBuf},
};

use log::debug;

use crate::{
    error::{FsResultExt, OrchestratorError, Result},
    models::Plan,
};

/// File extension of plan documents.
pub const DOCUMENT_EXTENSION: &str = "json";

/// Directory under the project root that holds orchestrator state.
pub const STATE_DIR: &str = ".hydra";

/// Subdirectory of the state directory holding live plan documents.
pub const PLANS_DIR: &str = "plans";

/// Subdirectory of the plans directory holding archived documents.
pub const ARCHIVE_DIR: &str = "archive";

/// Normalizes a path by resolving "." and ".." components without requiring
/// the path to exist.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    path.components()
        .fold(PathBuf::new(), |mut acc, component| match component {
            Component::CurDir => acc,
            Component::ParentDir => {
                acc.pop();
                acc
            }
            _ => {
                acc.push(component);
                acc
            }
        })
}

/// Makes a path absolute against the current working directory.
pub(crate) fn ensure_absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(normalize_path(path));
    }
    let cwd = current_dir().map_err(|_| {
        OrchestratorError::invalid_input("plans_dir")
            .with_reason("Cannot resolve current working directory to make path absolute")
    })?;
    Ok(normalize_path(&cwd.join(path)))
}

/// `<cwd>/.hydra/plans`
pub(crate) fn default_plans_dir() -> Result<PathBuf> {
    ensure_absolute(&Path::new(STATE_DIR).join(PLANS_DIR))
}

/// Plan ids double as file stems, so they are restricted to a safe alphabet.
pub(crate) fn validate_plan_id(id: &str) -> Result<()> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(OrchestratorError::invalid_input("id")
            .with_reason(format!("'{id}' is not a valid plan id")))
    }
}

pub(crate) fn document_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{id}.{DOCUMENT_EXTENSION}"))
}

/// Reads and parses one document. A missing file is `Ok(None)`.
pub(crate) fn read_document(path: &Path) -> Result<Option<Plan>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).fs_context(path),
    };
    Ok(Some(serde_json::from_str(&raw)?))
}

/// Writes a document through a temporary sibling so readers never observe a
/// half-written file.
pub(crate) fn write_document(path: &Path, plan: &Plan) -> Result<()> {
    let json = serde_json::to_string_pretty(plan)?;
    let tmp = path.with_extension(format!("{DOCUMENT_EXTENSION}.tmp"));
    fs::write(&tmp, json).fs_context(&tmp)?;
    fs::rename(&tmp, path).fs_context(path)?;
    debug!("wrote plan document {}", path.display());
    Ok(())
}

/// Parses every document in `dir`, skipping files that fail to parse.
pub(crate) fn read_all_documents(dir: &Path) -> Result<Vec<Plan>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).fs_context(dir),
    };

    let mut plans = Vec::new();
    for entry in entries {
        let path = entry.fs_context(dir)?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(DOCUMENT_EXTENSION) {
            continue;
        }
        match read_document(&path) {
            Ok(Some(plan)) => plans.push(plan),
            Ok(None) => {}
            Err(e) => log::warn!("skipping unreadable plan document {}: {e}", path.display()),
        }
    }
    Ok(plans)
}
