use std::io::{self, BufRead, Write};

use colored::{ColoredString, Colorize};
use log::{info, warn};
use rust_decimal::RoundingStrategy;

use crate::backend::{BackendError, LedgerStore};
use crate::console::{Command, Messages, TokenReader};
use crate::core::{amount, Amount, AmountError, TransactionKind};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum State {
    AwaitingCommand,
    AwaitingAmount(TransactionKind),
    Terminated
}

/// Interactive loop reading commands and amounts from `input` and writing
/// prompts and results to `output`.
pub struct Session<S, R, W> {
    store: S,
    messages: Messages,
    input: TokenReader<R>,
    output: W,
    state: State
}

impl<S: LedgerStore, R: BufRead, W: Write> Session<S, R, W> {
    pub fn new(store: S, messages: Messages, input: R, output: W) -> Session<S, R, W> {
        Session {
            store,
            messages,
            input: TokenReader::new(input),
            output,
            state: State::AwaitingCommand
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Check the ledger is there, then serve commands until Exit or the end
    /// of input. A missing ledger ends the session before the first prompt.
    pub fn run(&mut self) -> io::Result<State> {
        if !self.store.exists() {
            warn!("ledger file not found, not starting");
            let message = self.messages.load_error.clone();
            self.error(&message)?;
            self.state = State::Terminated;
            return Ok(self.state);
        }

        while self.state != State::Terminated {
            self.state = self.step()?;
        }
        return Ok(self.state);
    }

    /// Handle one command or one amount and return the state that follows.
    pub fn step(&mut self) -> io::Result<State> {
        match self.state {
            State::AwaitingCommand => self.read_command(),
            State::AwaitingAmount(kind) => self.read_amount(kind),
            State::Terminated => Ok(State::Terminated)
        }
    }

    fn read_command(&mut self) -> io::Result<State> {
        writeln!(self.output, "{}", self.messages.prompt)?;
        let Some(token) = self.input.next_token()? else {
            return Ok(State::Terminated);
        };

        let next = match Command::parse(&token) {
            Some(Command::Exit) => State::Terminated,
            Some(Command::Balance) => {
                self.show_balance()?;
                State::AwaitingCommand
            },
            Some(command) => match command.transaction() {
                Some(kind) => State::AwaitingAmount(kind),
                None => State::AwaitingCommand
            },
            None => {
                warn!("unknown command {:?}", token);
                let message = self.messages.command_error.clone();
                self.error(&message)?;
                State::AwaitingCommand
            }
        };
        Ok(next)
    }

    fn read_amount(&mut self, kind: TransactionKind) -> io::Result<State> {
        let prompt = match kind {
            TransactionKind::Deposit => &self.messages.deposit_prompt,
            TransactionKind::Withdraw => &self.messages.withdraw_prompt
        };
        writeln!(self.output, "{}", prompt)?;
        let Some(token) = self.input.next_token()? else {
            return Ok(State::Terminated);
        };

        match amount::parse_amount(&token).and_then(amount::validate) {
            Ok(accepted) => {
                self.record(kind, accepted)?;
                Ok(State::AwaitingCommand)
            },
            Err(err) => {
                warn!("rejected {}: {}", kind, err);
                let message = match err {
                    AmountError::Negative(_) => self.messages.negative_error.clone(),
                    AmountError::TooPrecise(_) => self.messages.precision_error.clone(),
                    AmountError::TooLarge(_) => self.messages.size_error.clone(),
                    AmountError::NotANumber(_) => self.messages.number_error.clone()
                };
                self.error(&message)?;
                Ok(State::AwaitingAmount(kind))
            }
        }
    }

    fn record(&mut self, kind: TransactionKind, amount: Amount) -> io::Result<()> {
        let entry = kind.entry_text(amount);
        match self.store.record(&entry) {
            Ok(document) => {
                info!("recorded {} of {} as {:?} ({} entries)", kind, amount, entry, document.len());
                Ok(())
            },
            Err(err) => self.report(err)
        }
    }

    fn show_balance(&mut self) -> io::Result<()> {
        match self.store.balance() {
            Ok(balance) => {
                writeln!(self.output, "{}{}", self.messages.balance, format_balance(balance))
            },
            Err(err) => self.report(err)
        }
    }

    fn report(&mut self, err: BackendError) -> io::Result<()> {
        warn!("{}", err);
        let message = match err {
            BackendError::Load { .. } => self.messages.load_error.clone(),
            BackendError::Malformed { .. } | BackendError::Parse { .. } | BackendError::Overflow => {
                self.messages.parse_error.clone()
            },
            BackendError::Persist { .. } => self.messages.persist_error.clone()
        };
        self.error(&message)
    }

    fn error(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{}", message.red())
    }
}

/// Two fractional digits, half away from zero, coloured by sign.
fn format_balance(balance: Amount) -> ColoredString {
    let rounded = balance.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    // near the top of the decimal range there is no room for a scale of two,
    // so the zeros are added to the text instead
    let mut text = rounded.to_string();
    let missing = 2 - rounded.scale().min(2);
    if missing == 2 {
        text.push('.');
    }
    text.extend(std::iter::repeat('0').take(missing as usize));
    if rounded < Amount::ZERO {
        text.bright_red()
    } else if rounded > Amount::ZERO {
        text.green()
    } else {
        text.normal()
    }
}
