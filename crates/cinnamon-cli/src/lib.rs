pub mod args;
pub mod config;
pub mod host;

pub use args::Cli;
pub use host::Host;
