use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::database::Record;
use crate::time::{now, Timestamp};

/// A registered identity. The id is generated and never shown as the login name.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, new)]
pub struct Account {
    #[new(default)]
    pub id: Record<Account>,
    #[new(value = "now()")]
    pub created_at: Timestamp,
    pub login: String,
    #[new(default)]
    pub last_login: Option<Timestamp>,
    #[new(default)]
    pub total_sessions: u64,
}

crate::table!("accounts": Account = id);

/// The account a login name and password resolved to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CredentialMatch {
    pub account: Record<Account>,
}
