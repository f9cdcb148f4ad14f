pub mod amount;
pub mod error;

pub use amount::{Amount, TransactionKind};
pub use error::AmountError;
