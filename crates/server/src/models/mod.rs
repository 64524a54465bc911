//! Domain types.
//!
//! These types represent validated domain objects separate from database row
//! types; the `db` module owns the Row→Model conversions.

pub mod product;
pub mod purchase;
pub mod sale;
pub mod session;
pub mod tenant;

pub use product::{NewProduct, Product};
pub use purchase::{NewPurchase, Purchase};
pub use sale::{Sale, SaleWithProduct};
pub use session::{CurrentTenant, session_keys};
pub use tenant::Tenant;
