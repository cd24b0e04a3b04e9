//! Command dispatch: bridges CLI args -> core calls -> output formatting.

pub mod config_cmd;
pub mod endpoints;
pub mod fetch;
pub mod flush;
pub mod watch;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a parsed command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Endpoints => endpoints::handle(global),
        Command::Fetch(args) => fetch::handle(args, global).await,
        Command::FlushDates => flush::handle(global).await,
        Command::Watch(args) => watch::handle(args, global).await,
        Command::Config(args) => config_cmd::handle(&args, global),
    }
}
