use thiserror::Error;

use crate::core::Amount;

#[derive(Error, Debug, PartialEq)]
pub enum AmountError {
    /// Occurs when an amount below zero is offered for a deposit
    /// or a withdrawal. The sign is implied by the command.
    #[error("amount {0} must be positive")]
    Negative(Amount),
    /// Occurs when an amount carries more than two significant
    /// fractional digits.
    #[error("amount {0} has too many decimal digits")]
    TooPrecise(String),
    /// Occurs when an amount is at or above `MAX_AMOUNT`, including
    /// numbers too large to be held as a decimal at all.
    #[error("amount {0} is too large")]
    TooLarge(String),
    /// Occurs when the user typed something that is not a number.
    #[error("{0:?} is not a number")]
    NotANumber(String),
}
