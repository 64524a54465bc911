//! Business services over the ledger repositories.

pub mod assistant;
pub mod auth;
pub mod inventory;
pub mod reports;

pub use assistant::{AssistantError, AssistantService};
pub use auth::{AuthError, AuthService};
pub use inventory::{InventoryService, LedgerError};
pub use reports::{PurchasesReport, ReportsService, SalesReport};
