use serde::{Serialize, Deserialize};

/// Every line the session prints. Any field left out of a config file
/// keeps its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub prompt: String,
    pub deposit_prompt: String,
    pub withdraw_prompt: String,
    pub negative_error: String,
    pub precision_error: String,
    pub size_error: String,
    pub number_error: String,
    pub command_error: String,
    pub load_error: String,
    pub parse_error: String,
    pub persist_error: String,
    /// Printed right before the balance amount.
    pub balance: String,
}

impl Default for Messages {
    fn default() -> Self {
        Messages {
            prompt: "Please enter in a command (Deposit, Withdraw, Balance, Exit):".to_owned(),
            deposit_prompt: "Please enter an amount to deposit:".to_owned(),
            withdraw_prompt: "Please enter an amount to withdraw:".to_owned(),
            negative_error: "Error: Please enter a positive amount.".to_owned(),
            precision_error: "Error: Please enter a number with no more than 2 decimal digits".to_owned(),
            size_error: "Error: Please enter an amount below 1000000000000000".to_owned(),
            number_error: "Error: Please enter a number".to_owned(),
            command_error: "Error: Please enter a known command or D, W, B, or E".to_owned(),
            load_error: "Log file couldn't load".to_owned(),
            parse_error: "Couldn't parse the log file.".to_owned(),
            persist_error: "Couldn't write the log file.".to_owned(),
            balance: "The current balance is: $".to_owned(),
        }
    }
}
