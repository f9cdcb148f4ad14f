use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::backend::{BackendError, Document, LedgerStore, Result};

/// Ledger kept as an HTML page on disk.
pub struct HtmlStore {
    path: PathBuf
}

impl HtmlStore {
    pub fn new(path: impl AsRef<Path>) -> HtmlStore {
        HtmlStore { path: path.as_ref().to_owned() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file actually holding the ledger. A symlinked ledger is written
    /// through to its target so the link itself survives the rename.
    fn destination(&self) -> PathBuf {
        fs::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone())
    }

    fn temp_path(destination: &Path) -> PathBuf {
        let mut name = destination.file_name().unwrap_or_default().to_owned();
        name.push(".tmp");
        destination.with_file_name(name)
    }

    fn write_temp(&self, temp_path: &Path, contents: &str) -> io::Result<()> {
        let mut file = fs::File::create(temp_path)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()
    }
}

impl LedgerStore for HtmlStore {
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn load(&self) -> Result<Document> {
        let bytes = fs::read(&self.path)
            .map_err(|source| BackendError::Load { path: self.path.clone(), source })?;
        let source = String::from_utf8_lossy(&bytes).into_owned();
        let document = Document::parse(source)
            .map_err(|source| BackendError::Malformed { path: self.path.clone(), source })?;

        debug!("loaded {} entries from {}", document.len(), self.path.display());
        return Ok(document);
    }

    fn persist(&self, document: &Document) -> Result<()> {
        let destination = self.destination();
        let temp_path = Self::temp_path(&destination);
        let contents = document.to_ascii();

        // a failed rename leaves the old ledger in place
        self.write_temp(&temp_path, &contents)
            .and_then(|_| fs::rename(&temp_path, &destination))
            .map_err(|source| {
                let _ = fs::remove_file(&temp_path);
                BackendError::Persist { path: self.path.clone(), source }
            })?;

        debug!("wrote {} bytes to {}", contents.len(), destination.display());
        return Ok(());
    }
}
