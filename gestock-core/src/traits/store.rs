//! Record-store traits implemented by the SQLite engine.
//!
//! One trait per collection plus the blanket `RecordStore`, so the service
//! layer can take exactly the access it needs and tests can stub a single
//! collection.

use crate::errors::StorageError;
use crate::types::demande::{Demande, NouvelleDemande, Statut};
use crate::types::identifiers::{DemandeId, ProduitId, UserId};
use crate::types::produit::{NouveauProduit, Produit, ProduitKey};
use crate::types::role::Role;
use crate::types::user::UserProfile;

/// Result of a conditional stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeductOutcome {
    /// Stock was decremented; carries the committed quantity.
    Deducted { new_quantite: i64 },
    /// No produit row with that id; nothing was written.
    Missing,
    /// The decrement would go negative; nothing was written.
    Insufficient { available: i64 },
}

/// Result of the transactional approve commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// Stock deducted and statut flipped to `acceptee`, atomically.
    Committed { new_quantite: i64 },
    /// The referenced produit no longer exists; nothing was written.
    ProduitMissing,
    /// The decrement would go negative; nothing was written.
    Insufficient { available: i64 },
}

/// Access to the `users` collection.
pub trait UserStore: Send + Sync {
    fn get_user(&self, id: &UserId) -> Result<Option<UserProfile>, StorageError>;

    /// Insert or replace a user document.
    fn put_user(&self, user: &UserProfile) -> Result<(), StorageError>;

    fn list_users(&self) -> Result<Vec<UserProfile>, StorageError>;

    /// Returns false when no such user exists.
    fn set_role(&self, id: &UserId, role: Role) -> Result<bool, StorageError>;

    /// Returns false when no such user exists.
    fn delete_user(&self, id: &UserId) -> Result<bool, StorageError>;
}

/// Access to the `produits` collection.
pub trait ProduitStore: Send + Sync {
    fn insert_produit(&self, produit: &NouveauProduit) -> Result<ProduitId, StorageError>;

    fn get_produit(&self, id: ProduitId) -> Result<Option<Produit>, StorageError>;

    /// Returns false when no such produit exists.
    fn update_produit(&self, id: ProduitId, produit: &NouveauProduit)
        -> Result<bool, StorageError>;

    /// Returns false when no such produit exists.
    fn delete_produit(&self, id: ProduitId) -> Result<bool, StorageError>;

    fn list_produits(&self) -> Result<Vec<Produit>, StorageError>;

    /// All produits whose normalized triple equals `key`, oldest first.
    /// Normalization is applied to the stored columns as well, so legacy
    /// unnormalized rows still match.
    fn find_produits_by_key(&self, key: &ProduitKey) -> Result<Vec<Produit>, StorageError>;

    /// Conditionally decrement stock. The check and the write are one
    /// statement; stock can never be observed negative.
    fn deduct_quantite(&self, id: ProduitId, quantite: i64)
        -> Result<DeductOutcome, StorageError>;
}

/// Access to the `demandes` collection.
pub trait DemandeStore: Send + Sync {
    fn insert_demande(&self, demande: &NouvelleDemande) -> Result<DemandeId, StorageError>;

    fn get_demande(&self, id: DemandeId) -> Result<Option<Demande>, StorageError>;

    /// All demandes, newest first.
    fn list_demandes(&self) -> Result<Vec<Demande>, StorageError>;

    fn list_demandes_by_demandeur(&self, demandeur: &UserId)
        -> Result<Vec<Demande>, StorageError>;

    fn list_demandes_by_statut(&self, statut: Statut) -> Result<Vec<Demande>, StorageError>;

    /// Flip a pending demande to a terminal statut. Returns false when the
    /// demande is missing or already decided; nothing is written then.
    fn mark_decided(&self, id: DemandeId, statut: Statut) -> Result<bool, StorageError>;

    /// Atomically deduct `quantite` from the produit and mark the demande
    /// `acceptee`, in one transaction. On any non-committed outcome the
    /// demande stays `en_attente` and the stock is untouched.
    fn commit_approval(
        &self,
        demande_id: DemandeId,
        produit_id: ProduitId,
        quantite: i64,
    ) -> Result<ApprovalOutcome, StorageError>;
}

/// Full record-store surface: all three collections.
pub trait RecordStore: UserStore + ProduitStore + DemandeStore {}

impl<T: UserStore + ProduitStore + DemandeStore> RecordStore for T {}
