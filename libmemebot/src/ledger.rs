//! Append-only record of posted memes
//!
//! One line per successful post: `<id> <timestamp> <uri>`. The file is re-read
//! in full on every query. Reads require the file to exist; only
//! [`Ledger::record`] creates it.
//!
//! There is no locking: two runs started at the same time can both pass the
//! "not yet posted" check for the same entry.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{LedgerError, Result};
use crate::types::LedgerEntry;

#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True iff `id` is the first token of some line
    pub fn has_posted(&self, id: &str) -> Result<bool> {
        Ok(self.entries()?.iter().any(|entry| entry.id == id))
    }

    pub fn posted_ids(&self) -> Result<HashSet<String>> {
        Ok(self.entries()?.into_iter().map(|entry| entry.id).collect())
    }

    /// Every recorded post, in file order
    pub fn entries(&self) -> Result<Vec<LedgerEntry>> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| self.read_error(e))?;
        Ok(content.lines().filter_map(LedgerEntry::parse_line).collect())
    }

    /// Append one line, creating the file if needed
    pub fn record(&self, entry: &LedgerEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;

        file.write_all(entry.to_line().as_bytes())
            .and_then(|_| file.sync_data())
            .map_err(|e| self.io_error(e))?;

        debug!("Recorded {} in {}", entry.id, self.path.display());
        Ok(())
    }

    fn read_error(&self, error: std::io::Error) -> crate::MemebotError {
        if error.kind() == ErrorKind::NotFound {
            LedgerError::Missing(self.path.display().to_string()).into()
        } else {
            self.io_error(error)
        }
    }

    fn io_error(&self, source: std::io::Error) -> crate::MemebotError {
        LedgerError::Io {
            path: self.path.display().to_string(),
            source,
        }
        .into()
    }
}
