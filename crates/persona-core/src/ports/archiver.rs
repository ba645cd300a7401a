use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("archive I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid archive entry: {entry}")]
    InvalidEntry { entry: String },
}

/// Packs and unpacks the profiles root.
pub trait Archiver: Send + Sync {
    /// Writes every file below `source` into `archive`. Top-level files whose
    /// name is listed in `excluded` are left out.
    fn compress_directory(
        &self,
        source: &Path,
        archive: &Path,
        excluded: &[&str],
    ) -> Result<(), ArchiveError>;

    /// Names of the top-level directories stored in `archive`.
    fn list_top_level_directories(&self, archive: &Path) -> Result<Vec<String>, ArchiveError>;

    /// Extracts the directories of `archive` into `destination`, replacing
    /// files that already exist. Top-level plain files are skipped.
    fn extract(&self, archive: &Path, destination: &Path) -> Result<(), ArchiveError>;
}
