//! Local user profile rows

use serde::{Deserialize, Serialize};

/// One local profile row of a directory user (one per affiliation)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub user_id: String,
    pub company_code: String,
    pub organization_code: String,
    pub position_code: Option<String>,
    /// The user's primary affiliation
    pub is_primary: bool,
}

impl ProfileRow {
    pub fn new(
        user_id: impl Into<String>,
        company_code: impl Into<String>,
        organization_code: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            company_code: company_code.into(),
            organization_code: organization_code.into(),
            position_code: None,
            is_primary: true,
        }
    }
}
