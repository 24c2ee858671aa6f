use std::fs;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{IngestError, SourceKind};
use crate::ingest::LogicalFile;
use crate::ingest::bundle::ArchiveBundle;

const ZIP_LOCAL_HEADER: [u8; 4] = *b"PK\x03\x04";
const ZIP_EMPTY_ARCHIVE: [u8; 4] = *b"PK\x05\x06";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveSource {
    Zip(PathBuf),
    Directory(PathBuf),
}

impl ArchiveSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Zip(_) => SourceKind::Zip,
            Self::Directory(_) => SourceKind::Directory,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Zip(path) | Self::Directory(path) => path,
        }
    }
}

fn has_zip_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}

fn has_zip_signature(path: &Path) -> bool {
    let Ok(mut file) = fs::File::open(path) else {
        return false;
    };
    let mut magic = [0u8; 4];
    if file.read_exact(&mut magic).is_err() {
        return false;
    }
    magic == ZIP_LOCAL_HEADER || magic == ZIP_EMPTY_ARCHIVE
}

pub fn detect_source(path: &Path) -> Result<ArchiveSource, IngestError> {
    if path.is_dir() {
        return Ok(ArchiveSource::Directory(path.to_path_buf()));
    }
    if path.is_file() {
        if has_zip_extension(path) || has_zip_signature(path) {
            return Ok(ArchiveSource::Zip(path.to_path_buf()));
        }
        return Err(IngestError::UnsupportedInput(format!(
            "{} is not a zip archive; upload a zip file or a directory",
            path.display()
        )));
    }
    Err(IngestError::UnsupportedInput(format!(
        "{} does not exist; upload a zip file or a directory",
        path.display()
    )))
}

pub fn extract(source: &ArchiveSource) -> Result<ArchiveBundle, IngestError> {
    let bundle = match source {
        ArchiveSource::Zip(path) => extract_zip(path)?,
        ArchiveSource::Directory(root) => extract_directory(root)?,
    };
    info!(
        source = source.kind().as_str(),
        path = %source.path().display(),
        files = ?bundle.names(),
        "extracted archive files"
    );
    Ok(bundle)
}

fn missing(file: LogicalFile, origin: SourceKind) -> IngestError {
    IngestError::MissingFile {
        path: file.relative_path(),
        origin,
    }
}

fn extract_zip(path: &Path) -> Result<ArchiveBundle, IngestError> {
    let handle = fs::File::open(path).map_err(|err| IngestError::Unreadable {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    let mut archive =
        ZipArchive::new(handle).map_err(|err| IngestError::MalformedZip(err.to_string()))?;

    let mut bundle = ArchiveBundle::default();
    for file in LogicalFile::ALL {
        let mut found = None;
        for candidate in file.candidate_paths() {
            match archive.by_name(&candidate) {
                Ok(mut entry) => {
                    let mut content = String::new();
                    entry
                        .read_to_string(&mut content)
                        .map_err(|err| IngestError::Unreadable {
                            path: candidate.clone(),
                            reason: err.to_string(),
                        })?;
                    debug!(entry = %candidate, bytes = content.len(), "read zip entry");
                    found = Some(content);
                    break;
                }
                Err(ZipError::FileNotFound) => continue,
                Err(err) => return Err(IngestError::MalformedZip(err.to_string())),
            }
        }
        let content = found.ok_or_else(|| missing(file, SourceKind::Zip))?;
        bundle.insert(file, content);
    }
    Ok(bundle)
}

fn entry_path(root: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .fold(root.to_path_buf(), |acc, part| acc.join(part))
}

fn extract_directory(root: &Path) -> Result<ArchiveBundle, IngestError> {
    let mut bundle = ArchiveBundle::default();
    for file in LogicalFile::ALL {
        let mut found = None;
        for candidate in file.candidate_paths() {
            let path = entry_path(root, &candidate);
            match fs::read_to_string(&path) {
                Ok(content) => {
                    debug!(entry = %path.display(), bytes = content.len(), "read directory entry");
                    found = Some(content);
                    break;
                }
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(err) => {
                    return Err(IngestError::Unreadable {
                        path: path.display().to_string(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        let content = found.ok_or_else(|| missing(file, SourceKind::Directory))?;
        bundle.insert(file, content);
    }
    Ok(bundle)
}
