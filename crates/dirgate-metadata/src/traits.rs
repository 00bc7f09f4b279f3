//! User record store trait
//!
//! Defines the read-only lookup the authenticator uses to confirm that a
//! directory user is provisioned locally.

use async_trait::async_trait;
use dirgate_core::types::ProfileRow;
use dirgate_core::Result;

#[async_trait]
pub trait UserRecordStore: Send + Sync {
    /// All local profile rows of a user, empty when the user is not provisioned
    async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<ProfileRow>>;
}
