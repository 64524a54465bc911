//! Session-stored types.

use serde::{Deserialize, Serialize};

use tally_core::TenantId;

/// Keys under which values are stored in the tower-sessions session.
pub mod session_keys {
    /// The logged-in tenant ([`super::CurrentTenant`]).
    pub const CURRENT_TENANT: &str = "current_tenant";
}

/// The authenticated tenant carried in the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentTenant {
    /// Tenant ID, threaded through every ledger operation.
    pub id: TenantId,
    /// Login name, for display.
    pub username: String,
}
