mod html_store;
mod interface;
pub mod document;

pub use interface::{LedgerStore, Result, BackendError};
pub use html_store::HtmlStore;
pub use document::Document;
