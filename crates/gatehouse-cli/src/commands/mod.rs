//! Subcommand implementations.

pub(crate) mod config;
pub(crate) mod history;
pub(crate) mod import;
pub(crate) mod keys;
pub(crate) mod qr;
pub(crate) mod verify;
