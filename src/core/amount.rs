use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::core::error::AmountError;

pub type Amount = Decimal;

/// Number of fractional digits a ledger amount may carry.
pub const MAX_DECIMAL_DIGITS: u32 = 2;

/// Every accepted amount is strictly below 10^15, which leaves the ledger
/// room for far more entries than it will ever hold before a sum overflows.
pub const MAX_AMOUNT: Amount = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TransactionKind {
    Deposit,
    Withdraw
}

impl TransactionKind {
    /// The amount as it contributes to the balance.
    pub fn signed(&self, amount: Amount) -> Amount {
        match self {
            Self::Deposit => amount,
            Self::Withdraw => -amount
        }
    }

    /// Text stored in the ledger cell for this transaction. The magnitude is
    /// written with trailing zeros dropped but at least one fractional digit,
    /// so a withdrawal of `10.00` is stored as `-10.0`.
    pub fn entry_text(&self, amount: Amount) -> String {
        let normalized = amount.abs().normalize();
        let magnitude = if normalized.scale() == 0 {
            format!("{}.0", normalized)
        } else {
            normalized.to_string()
        };

        match self {
            Self::Deposit => magnitude,
            Self::Withdraw => format!("-{}", magnitude)
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Deposit => "deposit",
            Self::Withdraw => "withdrawal"
        };
        write!(f, "{}", name)
    }
}

/// Read an amount typed by the user. Plain decimals and scientific
/// notation are both understood. A well-formed number too big for a decimal
/// is reported as too large rather than as not a number.
pub fn parse_amount(token: &str) -> Result<Amount, AmountError> {
    let token = token.trim();
    Decimal::from_str(token)
        .or_else(|_| Decimal::from_scientific(token))
        .map_err(|_| match token.parse::<f64>() {
            Ok(value) if looks_numeric(token) && value.abs() >= 1.0 => AmountError::TooLarge(token.to_owned()),
            _ => AmountError::NotANumber(token.to_owned())
        })
}

/// Digits with an optional sign, point and exponent; rules out `inf` and `NaN`.
fn looks_numeric(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
        && token.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
}

/// Accept a non-negative amount below `MAX_AMOUNT` with at most two
/// significant fractional digits. Trailing zeros do not count, so `1.000`
/// passes while `1.005` does not.
pub fn validate(amount: Amount) -> Result<Amount, AmountError> {
    if amount < Decimal::ZERO {
        return Err(AmountError::Negative(amount));
    }
    if amount >= MAX_AMOUNT {
        return Err(AmountError::TooLarge(amount.to_string()));
    }
    if amount.normalize().scale() > MAX_DECIMAL_DIGITS {
        return Err(AmountError::TooPrecise(amount.to_string()));
    }
    return Ok(amount);
}
