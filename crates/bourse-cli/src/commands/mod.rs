//! Subcommand implementations, one module per platform.

pub mod capital;
pub mod etoro;
