//! Line-oriented text protocol spoken by the `nexus` binary
mod command;
mod handler;

pub use command::{parse_command, Command};
pub use handler::{handle_command, Flow};
