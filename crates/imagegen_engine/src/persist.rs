use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::{NamedTempFile, PersistError as TempPersistError};
use thiserror::Error;

/// Attempts at a free `name-N.ext` before giving up on a non-clobbering write.
const MAX_NAME_ATTEMPTS: u32 = 1000;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{0} exists and is not a directory")]
    NotADirectory(PathBuf),
    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no free file name for {0} in the output directory")]
    NameTaken(String),
}

/// Creates `dir` (and parents) unless it already is a directory.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.is_dir() {
        return Ok(());
    }
    if dir.exists() {
        return Err(PersistError::NotADirectory(dir.to_path_buf()));
    }
    fs::create_dir_all(dir).map_err(|source| PersistError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Writes files into one directory through a sibling temp file and a rename,
/// so readers never observe a half-written image or state file.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Writes `{dir}/{filename}`, replacing any previous content.
    pub fn replace(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        let target = self.dir.join(filename);
        let tmp = self.staged(content, &target)?;
        tmp.persist(&target)
            .map_err(|err| write_error(&target, err))?;
        Ok(target)
    }

    /// Writes `content` under `filename`, or `stem-1.ext`, `stem-2.ext`...
    /// when that name is already taken. Existing files are never touched.
    pub fn write_new(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        let first = self.dir.join(filename);
        let mut tmp = self.staged(content, &first)?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let target = if attempt == 0 {
                first.clone()
            } else {
                self.dir.join(numbered(filename, attempt))
            };
            match tmp.persist_noclobber(&target) {
                Ok(_) => return Ok(target),
                Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                    tmp = err.file;
                }
                Err(err) => return Err(write_error(&target, err)),
            }
        }
        Err(PersistError::NameTaken(filename.to_string()))
    }

    fn staged(&self, content: &[u8], target: &Path) -> Result<NamedTempFile, PersistError> {
        ensure_output_dir(&self.dir)?;
        let wrap = |source| PersistError::Write {
            path: target.to_path_buf(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(wrap)?;
        tmp.write_all(content).map_err(wrap)?;
        tmp.as_file_mut().sync_all().map_err(wrap)?;
        Ok(tmp)
    }
}

fn write_error(target: &Path, err: TempPersistError) -> PersistError {
    PersistError::Write {
        path: target.to_path_buf(),
        source: err.error,
    }
}

fn numbered(filename: &str, n: u32) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}-{n}.{ext}"),
        _ => format!("{filename}-{n}"),
    }
}

#[cfg(test)]
mod tests {
    use super::numbered;

    #[test]
    fn numbering_keeps_the_extension() {
        assert_eq!(numbered("ai-image-5.png", 2), "ai-image-5-2.png");
        assert_eq!(numbered("picture", 1), "picture-1");
        assert_eq!(numbered(".hidden", 3), ".hidden-3");
    }
}
