//! Domain events and the dispatcher feeding live subscribers.

pub mod dispatcher;
pub mod handler;

pub use dispatcher::EventDispatcher;
pub use handler::{ChannelSubscriber, EventHandler};

use crate::types::demande::Statut;
use crate::types::identifiers::{DemandeId, ProduitId};

/// Events emitted by the ledger and the lifecycle manager.
#[derive(Debug, Clone, PartialEq)]
pub enum GestockEvent {
    /// A produit's stock level changed (CRUD or deduction). Carries the new
    /// quantity.
    StockChanged {
        produit_id: ProduitId,
        quantite: i64,
    },
    /// A produit record was removed.
    ProduitRemoved { produit_id: ProduitId },
    /// A new demande entered the pipeline.
    DemandeSubmitted { demande_id: DemandeId },
    /// A pending demande was decided.
    DemandeDecided {
        demande_id: DemandeId,
        statut: Statut,
    },
}
