pub mod args;
pub mod driver;
pub mod output;

pub use args::Cli;
pub use driver::{run, GenerateArgs, Ports, RunOutcome, UsageError};
