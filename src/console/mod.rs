mod command;
mod messages;
mod session;
mod tokens;

pub use command::Command;
pub use messages::Messages;
pub use session::{Session, State};
pub use tokens::TokenReader;
