//! Command-line arguments

use std::path::PathBuf;

use calsync_domain::Config;
use clap::Parser;

/// Sync a shared Microsoft 365 calendar into a SQL table.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "calsync", version, about)]
pub struct Cli {
    /// Settings file; probed next to the working directory when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only sign in and print the signed-in user.
    #[arg(long)]
    pub verify_login: bool,

    /// Only list the calendars visible to the signed-in user.
    #[arg(long)]
    pub list_calendars: bool,

    /// Print the shared calendar's events instead of writing them.
    #[arg(long)]
    pub dump: bool,
}

impl Cli {
    /// Raise the debug flags selected on the command line. Flags can only be
    /// switched on; the settings file keeps any it already enables.
    pub fn apply(&self, config: &mut Config) {
        config.debug.login |= self.verify_login;
        config.debug.list_calendars |= self.list_calendars;
        config.debug.display_calendar |= self.dump;
    }
}
