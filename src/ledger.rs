//! Flat-file ledger of links that have already been reported.
//!
//! One link per line, append-only. Blank lines are ignored on read, so files
//! written with a leading newline before every entry parse the same way.

use crate::LinkSet;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("ledger file {0} does not exist (pass --create-ledger to create it)")]
    Missing(PathBuf),
    #[error("ledger I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Durable set of reported links, backed by a single file.
#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    /// Open an existing ledger. A missing file is an error.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(LedgerError::Missing(path));
        }
        Ok(Self { path })
    }

    /// Open a ledger, creating the file (and its directory) if needed
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| LedgerError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LedgerError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All links recorded so far
    pub fn entries(&self) -> Result<LinkSet, LedgerError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        Ok(parse_entries(&content))
    }

    /// Record the unseen members of `candidates` and return them.
    ///
    /// Links containing a line break cannot be stored and are never returned.
    ///
    /// The file stays exclusively locked from the read until the appended
    /// entries are synced to disk.
    pub fn reconcile(&self, candidates: &LinkSet) -> Result<LinkSet, LedgerError> {
        let mut file = self.open_locked()?;
        let result = self.reconcile_locked(&mut file, candidates);
        if let Err(e) = file.unlock() {
            log::warn!("failed to unlock ledger {}: {}", self.path.display(), e);
        }
        result
    }

    fn reconcile_locked(
        &self,
        file: &mut File,
        candidates: &LinkSet,
    ) -> Result<LinkSet, LedgerError> {
        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| self.io_error(e))?;
        let seen = parse_entries(&content);

        let new: LinkSet = candidates
            .difference(&seen)
            .filter(|link| {
                let single_line = !link.contains(['\n', '\r']);
                if !single_line {
                    log::warn!("not recording link with a line break: {:?}", link);
                }
                single_line
            })
            .cloned()
            .collect();
        log::info!(
            "ledger {}: {} known, {} candidates, {} new",
            self.path.display(),
            seen.len(),
            candidates.len(),
            new.len()
        );
        if new.is_empty() {
            return Ok(new);
        }

        let mut buf = String::new();
        if !content.is_empty() && !content.ends_with('\n') {
            buf.push('\n');
        }
        for link in &new {
            buf.push_str(link);
            buf.push('\n');
        }

        file.seek(SeekFrom::End(0))
            .and_then(|_| file.write_all(buf.as_bytes()))
            .and_then(|_| file.sync_all())
            .map_err(|e| self.io_error(e))?;

        Ok(new)
    }

    fn open_locked(&self) -> Result<File, LedgerError> {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => LedgerError::Missing(self.path.clone()),
                _ => self.io_error(e),
            })?;
        file.lock().map_err(|e| self.io_error(e))?;
        Ok(file)
    }

    fn io_error(&self, source: std::io::Error) -> LedgerError {
        LedgerError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn parse_entries(content: &str) -> LinkSet {
    content
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
