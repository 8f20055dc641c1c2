pub mod extractor;
pub mod runner;

pub use extractor::Extractor;
pub use runner::{CommandRunner, CommandSpec, RunStatus, StdioMode, SystemRunner};

#[cfg(test)]
pub(crate) use runner::testing;
