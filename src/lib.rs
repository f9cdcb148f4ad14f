mod core;
mod backend;
mod console;
pub mod config;

pub use crate::core::{Amount, AmountError, TransactionKind};
pub use crate::core::amount;
pub use crate::backend::{BackendError, Document, HtmlStore, LedgerStore};
pub use crate::console::{Command, Messages, Session, State};
