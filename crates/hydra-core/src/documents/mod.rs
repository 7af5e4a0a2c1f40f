//! File-backed plan documents.
//!
//! This module is the synchronous persistence layer beneath
//! [`crate::store::PlanStore`]. Each plan lives in one JSON document named
//! after its id; archived plans move into an `archive/` subdirectory of the
//! same root. Every mutation reads the whole document, applies a partial
//! update and rewrites it. No locking is provided: one writer per plan.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{FsResultExt, Result};

pub mod archive;
pub mod plan_docs;
pub mod record_docs;
pub mod utils;

/// Handle on a plans directory and its archive area.
#[derive(Debug, Clone)]
pub struct PlanDocuments {
    root: PathBuf,
    archive_root: PathBuf,
}

impl PlanDocuments {
    /// Opens a plans directory, creating it and its archive area if needed.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let archive_root = root.join(utils::ARCHIVE_DIR);
        fs::create_dir_all(&archive_root).fs_context(&archive_root)?;
        Ok(Self { root, archive_root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn archive_root(&self) -> &Path {
        &self.archive_root
    }

    fn live_path(&self, id: &str) -> Result<PathBuf> {
        utils::validate_plan_id(id)?;
        Ok(utils::document_path(&self.root, id))
    }

    fn archived_path(&self, id: &str) -> Result<PathBuf> {
        utils::validate_plan_id(id)?;
        Ok(utils::document_path(&self.archive_root, id))
    }
}
