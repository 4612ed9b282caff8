//! Run mode selection

use serde::{Deserialize, Serialize};

use crate::config::DebugConfig;
use crate::impl_domain_option_conversions;

/// Which pipeline operation a single invocation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Authenticate and report the signed-in principal.
    VerifyLogin,
    /// Enumerate calendars visible to the signed-in principal.
    ListCalendars,
    /// Fetch events and print them instead of persisting.
    DumpToConsole,
    /// Fetch events and write them to the store.
    Persist,
}

impl_domain_option_conversions!(RunMode {
    VerifyLogin => "verify_login",
    ListCalendars => "list_calendars",
    DumpToConsole => "dump_to_console",
    Persist => "persist",
});

impl RunMode {
    /// Resolve the mode from debug flags. Precedence: login check, calendar
    /// listing, console dump, then persistence.
    pub fn from_flags(flags: &DebugConfig) -> Self {
        if flags.login {
            Self::VerifyLogin
        } else if flags.list_calendars {
            Self::ListCalendars
        } else if flags.display_calendar {
            Self::DumpToConsole
        } else {
            Self::Persist
        }
    }

    /// Whether the mode reads the shared mailbox and therefore needs it
    /// configured.
    pub fn requires_mailbox(self) -> bool {
        matches!(self, Self::DumpToConsole | Self::Persist)
    }
}
