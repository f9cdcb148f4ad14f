use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::backend::Document;
use crate::backend::document::MarkupError;
use crate::core::Amount;

#[derive(Error, Debug)]
pub enum BackendError {
    /// The ledger file could not be read.
    #[error("failed to read ledger {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        source: io::Error
    },
    /// The ledger file was read but is not usable markup, or has
    /// no transactions section.
    #[error("ledger {} is malformed: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        source: MarkupError
    },
    /// A cell in the transactions section is not a decimal amount.
    #[error("ledger entry {text:?} is not an amount")]
    Parse {
        text: String
    },
    /// The entries add up to more than a decimal can hold.
    #[error("ledger entries add up to more than can be represented")]
    Overflow,
    /// The updated ledger could not be written back.
    #[error("failed to write ledger {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        source: io::Error
    }
}

pub type Result<T> = std::result::Result<T, BackendError>;

/// Storage for the transaction ledger. Every operation starts from a fresh
/// `load`, nothing is cached between calls.
pub trait LedgerStore {
    fn exists(&self) -> bool;
    fn load(&self) -> Result<Document>;
    fn persist(&self, document: &Document) -> Result<()>;

    /// Append one entry and write the ledger back.
    fn record(&self, entry: &str) -> Result<Document> {
        let mut document = self.load()?;
        document.append_entry(entry);
        self.persist(&document)?;
        return Ok(document);
    }

    fn balance(&self) -> Result<Amount> {
        self.load()?.sum_entries()
    }
}

impl<T: LedgerStore + ?Sized> LedgerStore for &T {
    fn exists(&self) -> bool {
        (**self).exists()
    }

    fn load(&self) -> Result<Document> {
        (**self).load()
    }

    fn persist(&self, document: &Document) -> Result<()> {
        (**self).persist(document)
    }
}
