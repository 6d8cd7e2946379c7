//! Boundary traits: record store and identity provider.

pub mod identity;
pub mod store;
pub mod test_helpers;

pub use identity::{IdentityError, IdentityProvider};
pub use store::{ApprovalOutcome, DeductOutcome, DemandeStore, ProduitStore, RecordStore, UserStore};
