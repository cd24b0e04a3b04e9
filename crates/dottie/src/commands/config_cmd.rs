//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let settings = config::load(global)?;
            let path = config::effective_path(global);
            let rendered = settings.to_redacted_toml()?;
            output::print_output(
                &format!("# {}\n{}", path.display(), rendered.trim_end()),
                global.quiet,
            );
            Ok(())
        }
        ConfigCommand::Path => {
            output::print_output(&config::effective_path(global).display().to_string(), global.quiet);
            Ok(())
        }
    }
}
