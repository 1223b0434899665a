//! One module per `passvault` subcommand, each exposing `execute`.

pub mod add;
pub mod audit_cmd;
pub mod backup;
pub mod completions;
pub mod copy;
pub mod generate;
pub mod init;
pub mod list;
pub mod menu;
pub mod passwd;
pub mod remove;
pub mod show;
