//! Tenant domain types.

use chrono::{DateTime, Utc};

use tally_core::{TenantId, Username};

/// An authenticated account; the unit of data isolation.
///
/// The credential hash never leaves the repository layer; this type carries
/// only what handlers and services need.
#[derive(Debug, Clone)]
pub struct Tenant {
    /// Unique tenant ID.
    pub id: TenantId,
    /// Unique login name.
    pub username: Username,
    /// When the tenant registered.
    pub created_at: DateTime<Utc>,
}
