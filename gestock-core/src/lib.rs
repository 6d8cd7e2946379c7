//! # gestock-core
//!
//! Foundation crate for the Gestock supply-request service.
//! Defines domain types, store traits, errors, config, events, and telemetry.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod errors;
pub mod events;
pub mod telemetry;
pub mod traits;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::GestockConfig;
pub use errors::error_code::GestockErrorCode;
pub use errors::{GestockError, StorageError};
pub use events::dispatcher::EventDispatcher;
pub use events::handler::{ChannelSubscriber, EventHandler};
pub use events::GestockEvent;
pub use types::collections::{FxHashMap, FxHashSet};
pub use types::demande::{Decision, Demande, DemandeDraft, NouvelleDemande, Statut};
pub use types::identifiers::{DemandeId, ProduitId, UserId};
pub use types::produit::{NouveauProduit, Produit, ProduitKey};
pub use types::role::Role;
pub use types::user::{Registration, UserProfile};
