//! Command-line surface: argument parsing, subcommands and their handlers

pub mod args;
pub mod commands;
pub mod handlers;

pub use args::Args;
