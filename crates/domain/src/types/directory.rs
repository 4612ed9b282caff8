//! Directory objects surfaced by the diagnostic modes

use serde::{Deserialize, Serialize};

/// A calendar visible to the signed-in principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSummary {
    pub name: Option<String>,
    pub id: String,
}

/// The signed-in user, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub display_name: Option<String>,
    pub user_principal_name: Option<String>,
}
