use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Component, Path};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use persona_core::{ArchiveError, Archiver};
use tracing::debug;

/// Gzip-compressed tar archives of the profiles root.
#[derive(Debug, Default, Clone, Copy)]
pub struct TarGzArchiver;

impl TarGzArchiver {
    pub fn new() -> Self {
        Self
    }
}

impl Archiver for TarGzArchiver {
    fn compress_directory(
        &self,
        source: &Path,
        archive: &Path,
        excluded: &[&str],
    ) -> Result<(), ArchiveError> {
        let file = File::create(archive).map_err(|error| io_error(archive, error))?;
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
        builder.follow_symlinks(false);
        let output = archive.canonicalize().map_err(|error| io_error(archive, error))?;

        for entry in walkdir::WalkDir::new(source)
            .min_depth(1)
            .sort_by(|a, b| a.path().cmp(b.path()))
        {
            let entry = entry.map_err(|error| {
                let path = error
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| source.to_path_buf());
                io_error(&path, error.into())
            })?;
            let path = entry.path();
            let relative = path
                .strip_prefix(source)
                .map_err(|_| ArchiveError::InvalidEntry {
                    entry: path.display().to_string(),
                })?;

            if entry.depth() == 1 && entry.file_type().is_file() {
                if is_excluded(relative, excluded) {
                    debug!(path = %relative.display(), "excluded from archive");
                    continue;
                }
                if is_same_file(path, &output) {
                    debug!(path = %relative.display(), "archive is inside its source, skipping it");
                    continue;
                }
            }

            if entry.file_type().is_dir() {
                builder
                    .append_dir(relative, path)
                    .map_err(|error| io_error(path, error))?;
            } else if entry.file_type().is_file() {
                builder
                    .append_path_with_name(path, relative)
                    .map_err(|error| io_error(path, error))?;
            } else {
                debug!(path = %path.display(), "skipping non-regular file during archive");
            }
        }

        builder
            .into_inner()
            .and_then(|encoder| encoder.finish())
            .map_err(|error| io_error(archive, error))?;

        Ok(())
    }

    fn list_top_level_directories(&self, archive: &Path) -> Result<Vec<String>, ArchiveError> {
        let mut reader = open_archive(archive)?;
        let mut names = BTreeSet::new();

        for entry in reader.entries().map_err(|error| io_error(archive, error))? {
            let entry = entry.map_err(|error| io_error(archive, error))?;
            let path = entry
                .path()
                .map_err(|error| io_error(archive, error))?
                .into_owned();
            let components = normal_components(&path)?;

            let is_directory = entry.header().entry_type().is_dir();
            if let Some(first) = components.first() {
                if components.len() > 1 || is_directory {
                    names.insert(first.clone());
                }
            }
        }

        Ok(names.into_iter().collect())
    }

    fn extract(&self, archive: &Path, destination: &Path) -> Result<(), ArchiveError> {
        let mut reader = open_archive(archive)?;
        reader.set_overwrite(true);

        for entry in reader.entries().map_err(|error| io_error(archive, error))? {
            let mut entry = entry.map_err(|error| io_error(archive, error))?;
            let path = entry
                .path()
                .map_err(|error| io_error(archive, error))?
                .into_owned();
            let components = normal_components(&path)?;

            if components.len() == 1 && !entry.header().entry_type().is_dir() {
                debug!(path = %path.display(), "skipping top-level file in archive");
                continue;
            }

            let unpacked = entry
                .unpack_in(destination)
                .map_err(|error| io_error(&destination.join(&path), error))?;
            if !unpacked {
                return Err(ArchiveError::InvalidEntry {
                    entry: path.display().to_string(),
                });
            }
        }

        Ok(())
    }
}

fn open_archive(archive: &Path) -> Result<tar::Archive<GzDecoder<File>>, ArchiveError> {
    let file = File::open(archive).map_err(|error| io_error(archive, error))?;
    Ok(tar::Archive::new(GzDecoder::new(file)))
}

/// Path components of an archive entry. Anything that could escape the
/// destination (absolute paths, `..`) is rejected.
fn normal_components(path: &Path) -> Result<Vec<String>, ArchiveError> {
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => components.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => {
                return Err(ArchiveError::InvalidEntry {
                    entry: path.display().to_string(),
                })
            }
        }
    }
    Ok(components)
}

fn is_excluded(relative: &Path, excluded: &[&str]) -> bool {
    relative
        .to_str()
        .map(|name| excluded.contains(&name))
        .unwrap_or(false)
}

fn is_same_file(path: &Path, output: &Path) -> bool {
    path.canonicalize()
        .map(|candidate| candidate == output)
        .unwrap_or(false)
}

fn io_error(path: &Path, source: std::io::Error) -> ArchiveError {
    ArchiveError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn populate(root: &Path) {
        fs::create_dir_all(root.join("work")).unwrap();
        fs::write(root.join("work/storage.json"), "{}").unwrap();
        fs::write(root.join("work/state.vscdb"), b"db").unwrap();
        fs::create_dir_all(root.join("home")).unwrap();
        fs::write(root.join("home/storage.json"), "{}").unwrap();
        fs::write(root.join("current_profile.txt"), "work").unwrap();
    }

    #[test]
    fn archive_lists_profile_directories_only() {
        let directory = tempfile::tempdir().unwrap();
        let root = directory.path().join("profiles");
        populate(&root);
        let archive = directory.path().join("profiles.tar.gz");
        let archiver = TarGzArchiver::new();

        archiver
            .compress_directory(&root, &archive, &["current_profile.txt"])
            .unwrap();

        assert_eq!(
            archiver.list_top_level_directories(&archive).unwrap(),
            vec!["home".to_string(), "work".to_string()]
        );
    }

    #[test]
    fn extract_restores_files_and_skips_excluded_pointer() {
        let directory = tempfile::tempdir().unwrap();
        let root = directory.path().join("profiles");
        populate(&root);
        let archive = directory.path().join("profiles.tar.gz");
        let archiver = TarGzArchiver::new();
        archiver
            .compress_directory(&root, &archive, &["current_profile.txt"])
            .unwrap();

        let destination = directory.path().join("restored");
        fs::create_dir_all(&destination).unwrap();
        archiver.extract(&archive, &destination).unwrap();

        assert_eq!(
            fs::read(destination.join("work/state.vscdb")).unwrap(),
            b"db".to_vec()
        );
        assert!(destination.join("home/storage.json").is_file());
        assert!(!destination.join("current_profile.txt").exists());
    }

    #[test]
    fn extract_overwrites_existing_files() {
        let directory = tempfile::tempdir().unwrap();
        let root = directory.path().join("profiles");
        populate(&root);
        let archive = directory.path().join("profiles.tar.gz");
        let archiver = TarGzArchiver::new();
        archiver.compress_directory(&root, &archive, &[]).unwrap();

        fs::write(root.join("work/state.vscdb"), b"changed").unwrap();
        archiver.extract(&archive, &root).unwrap();

        assert_eq!(fs::read(root.join("work/state.vscdb")).unwrap(), b"db".to_vec());
    }

    #[test]
    fn archive_written_inside_source_does_not_contain_itself() {
        let directory = tempfile::tempdir().unwrap();
        let root = directory.path().join("profiles");
        populate(&root);
        let archive = root.join("profiles.tar.gz");

        TarGzArchiver::new()
            .compress_directory(&root, &archive, &["current_profile.txt"])
            .unwrap();

        let mut reader = open_archive(&archive).unwrap();
        let entries: Vec<String> = reader
            .entries()
            .unwrap()
            .map(|entry| entry.unwrap().path().unwrap().display().to_string())
            .collect();
        assert!(entries.iter().any(|entry| entry == "work/state.vscdb"));
        assert!(!entries.iter().any(|entry| entry.contains("profiles.tar.gz")));
    }

    #[test]
    fn missing_archive_is_an_io_error() {
        let directory = tempfile::tempdir().unwrap();

        let result = TarGzArchiver::new()
            .list_top_level_directories(&directory.path().join("missing.tar.gz"));

        assert!(matches!(result, Err(ArchiveError::Io { .. })));
    }

    #[test]
    fn parent_components_are_rejected() {
        assert!(normal_components(Path::new("../evil")).is_err());
        assert_eq!(
            normal_components(Path::new("./work/state.vscdb")).unwrap(),
            vec!["work".to_string(), "state.vscdb".to_string()]
        );
    }
}
