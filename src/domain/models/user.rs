//! Account model for the demo user store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user account.
///
/// Password digests stay inside the repository layer; they are never part of
/// this model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
}
