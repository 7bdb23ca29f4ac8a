//! Whole-bank persistence to a single file.
//!
//! The file holds the bincode encoding of the complete account map, every
//! history included. There is no versioning: a file written by a different
//! layout fails to decode.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use passbook_common::{LedgerError, Result};
use tracing::{info, instrument, warn};

use crate::bank::Bank;
use crate::config::LedgerConfig;

/// File-backed store for a [`Bank`].
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store for the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store for the configured data file.
    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(config.data_file.clone())
    }

    /// Path of the data file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check whether the data file exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Encode the whole bank and replace the file contents.
    ///
    /// Bytes go to a sibling temporary file first, which is then renamed
    /// over the data file. The temporary file is removed if either step
    /// fails.
    #[instrument(skip(self, bank), fields(path = %self.path.display()))]
    pub fn save(&self, bank: &Bank) -> Result<()> {
        let bytes = bincode::serialize(bank)
            .map_err(|e| LedgerError::Encoding(format!("Failed to encode bank: {}", e)))?;

        let tmp_path = self.tmp_path();
        let written =
            write_synced(&tmp_path, &bytes).and_then(|()| fs::rename(&tmp_path, &self.path));
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!(
                        error = %cleanup,
                        tmp = %tmp_path.display(),
                        "Failed to remove temporary file"
                    );
                }
            }
            return Err(e.into());
        }

        info!(accounts = bank.len(), bytes = bytes.len(), "Bank saved");
        Ok(())
    }

    /// Decode the bank stored in the file.
    ///
    /// Returns `Ok(None)` when the file does not exist yet.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<Option<Bank>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No data file, nothing to load");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let bank: Bank = bincode::deserialize(&bytes)
            .map_err(|e| LedgerError::Encoding(format!("Failed to decode bank: {}", e)))?;

        info!(accounts = bank.len(), bytes = bytes.len(), "Bank loaded");
        Ok(Some(bank))
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

impl Bank {
    /// Persist the whole bank to `store`.
    pub fn save_to(&self, store: &FileStore) -> Result<()> {
        store.save(self)
    }

    /// Replace this bank wholesale with the contents of `store`.
    ///
    /// Returns `false` and leaves the bank untouched when there is no data
    /// file. A decoded bank that fails [`Bank::verify_integrity`] is
    /// rejected, also leaving the bank untouched.
    pub fn restore_from(&mut self, store: &FileStore) -> Result<bool> {
        let Some(loaded) = store.load()? else {
            return Ok(false);
        };

        loaded.verify_integrity()?;
        *self = loaded;
        Ok(true)
    }
}
