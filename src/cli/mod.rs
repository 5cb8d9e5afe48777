pub mod commands;

pub use commands::{Cli, Command, USAGE, UsageError, run};
