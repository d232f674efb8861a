//! CLI subcommand implementations

pub mod encode;
pub mod inspect;
pub mod run;
