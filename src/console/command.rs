use crate::core::TransactionKind;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Deposit,
    Withdraw,
    Balance,
    Exit
}

impl Command {
    /// Match a command word or its initial, ignoring case.
    pub fn parse(token: &str) -> Option<Command> {
        let token = token.trim().to_ascii_lowercase();
        match token.as_str() {
            "deposit" | "d" => Some(Command::Deposit),
            "withdraw" | "w" => Some(Command::Withdraw),
            "balance" | "b" => Some(Command::Balance),
            "exit" | "e" => Some(Command::Exit),
            _ => None
        }
    }

    /// The transaction this command records, if any.
    pub fn transaction(&self) -> Option<TransactionKind> {
        match self {
            Command::Deposit => Some(TransactionKind::Deposit),
            Command::Withdraw => Some(TransactionKind::Withdraw),
            _ => None
        }
    }
}
