//! `StorageEngine` — SQLite implementation of the record-store traits.
//!
//! Owns the `DatabaseManager`; all reads go through `with_reader()`, all
//! writes through `with_writer()`. No code outside this crate touches a raw
//! `&Connection`.

use std::path::Path;
use std::sync::Arc;

use gestock_core::config::GestockConfig;
use gestock_core::errors::StorageError;
use gestock_core::traits::store::{
    ApprovalOutcome, DeductOutcome, DemandeStore, ProduitStore, RecordStore, UserStore,
};
use gestock_core::types::demande::{Demande, NouvelleDemande, Statut};
use gestock_core::types::identifiers::{DemandeId, ProduitId, UserId};
use gestock_core::types::produit::{NouveauProduit, Produit, ProduitKey};
use gestock_core::types::role::Role;
use gestock_core::types::user::UserProfile;

use crate::connection::DatabaseManager;
use crate::lock::StoreLock;
use crate::queries;

/// The unified Gestock storage engine.
pub struct StorageEngine {
    db: DatabaseManager,
    // Held for the engine's lifetime when opened through a config.
    _lock: Option<StoreLock>,
}

impl StorageEngine {
    /// Open a file-backed engine at the given database path. No advisory
    /// lock; intended for tooling and tests.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        Ok(Self {
            db: DatabaseManager::open(path)?,
            _lock: None,
        })
    }

    /// Open the engine described by the configuration: lock the data
    /// directory, then open `gestock.db` inside it.
    pub fn open_with_config(config: &GestockConfig) -> Result<Self, StorageError> {
        let dir = config.database.effective_path();
        let mut lock = StoreLock::new(&dir)?;
        lock.hold_exclusive()?;
        let db = DatabaseManager::open_with_timeout(
            &dir.join("gestock.db"),
            config.database.effective_busy_timeout_ms(),
        )?;
        Ok(Self {
            db,
            _lock: Some(lock),
        })
    }

    /// Open an in-memory engine (tests).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Ok(Self {
            db: DatabaseManager::open_in_memory()?,
            _lock: None,
        })
    }

    /// Database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.db.path()
    }

    /// Expose as `Arc<dyn RecordStore>` for service construction.
    pub fn as_record_store(self: &Arc<Self>) -> Arc<dyn RecordStore> {
        Arc::clone(self) as Arc<dyn RecordStore>
    }
}

impl UserStore for StorageEngine {
    fn get_user(&self, id: &UserId) -> Result<Option<UserProfile>, StorageError> {
        self.db.with_reader(|conn| queries::users::get_user(conn, id))
    }

    fn put_user(&self, user: &UserProfile) -> Result<(), StorageError> {
        self.db.with_writer(|conn| queries::users::upsert_user(conn, user))
    }

    fn list_users(&self) -> Result<Vec<UserProfile>, StorageError> {
        self.db.with_reader(queries::users::list_users)
    }

    fn set_role(&self, id: &UserId, role: Role) -> Result<bool, StorageError> {
        self.db.with_writer(|conn| queries::users::set_role(conn, id, role))
    }

    fn delete_user(&self, id: &UserId) -> Result<bool, StorageError> {
        self.db.with_writer(|conn| queries::users::delete_user(conn, id))
    }
}

impl ProduitStore for StorageEngine {
    fn insert_produit(&self, produit: &NouveauProduit) -> Result<ProduitId, StorageError> {
        self.db
            .with_writer(|conn| queries::produits::insert_produit(conn, produit))
    }

    fn get_produit(&self, id: ProduitId) -> Result<Option<Produit>, StorageError> {
        self.db.with_reader(|conn| queries::produits::get_produit(conn, id))
    }

    fn update_produit(
        &self,
        id: ProduitId,
        produit: &NouveauProduit,
    ) -> Result<bool, StorageError> {
        self.db
            .with_writer(|conn| queries::produits::update_produit(conn, id, produit))
    }

    fn delete_produit(&self, id: ProduitId) -> Result<bool, StorageError> {
        self.db
            .with_writer(|conn| queries::produits::delete_produit(conn, id))
    }

    fn list_produits(&self) -> Result<Vec<Produit>, StorageError> {
        self.db.with_reader(queries::produits::list_produits)
    }

    fn find_produits_by_key(&self, key: &ProduitKey) -> Result<Vec<Produit>, StorageError> {
        self.db
            .with_reader(|conn| queries::produits::find_by_key(conn, key))
    }

    fn deduct_quantite(
        &self,
        id: ProduitId,
        quantite: i64,
    ) -> Result<DeductOutcome, StorageError> {
        self.db
            .with_writer(|conn| queries::produits::deduct_quantite(conn, id, quantite))
    }
}

impl DemandeStore for StorageEngine {
    fn insert_demande(&self, demande: &NouvelleDemande) -> Result<DemandeId, StorageError> {
        self.db
            .with_writer(|conn| queries::demandes::insert_demande(conn, demande))
    }

    fn get_demande(&self, id: DemandeId) -> Result<Option<Demande>, StorageError> {
        self.db.with_reader(|conn| queries::demandes::get_demande(conn, id))
    }

    fn list_demandes(&self) -> Result<Vec<Demande>, StorageError> {
        self.db.with_reader(queries::demandes::list_demandes)
    }

    fn list_demandes_by_demandeur(
        &self,
        demandeur: &UserId,
    ) -> Result<Vec<Demande>, StorageError> {
        self.db
            .with_reader(|conn| queries::demandes::list_by_demandeur(conn, demandeur))
    }

    fn list_demandes_by_statut(&self, statut: Statut) -> Result<Vec<Demande>, StorageError> {
        self.db
            .with_reader(|conn| queries::demandes::list_by_statut(conn, statut))
    }

    fn mark_decided(&self, id: DemandeId, statut: Statut) -> Result<bool, StorageError> {
        self.db
            .with_writer(|conn| queries::demandes::mark_decided(conn, id, statut))
    }

    fn commit_approval(
        &self,
        demande_id: DemandeId,
        produit_id: ProduitId,
        quantite: i64,
    ) -> Result<ApprovalOutcome, StorageError> {
        self.db.with_transaction(|tx| {
            // Deduct first: the statut flip below only commits alongside it.
            // The Missing/Insufficient arms wrote nothing, so committing the
            // empty transaction is harmless.
            match queries::produits::deduct_quantite(tx, produit_id, quantite)? {
                DeductOutcome::Deducted { new_quantite } => {
                    let flipped =
                        queries::demandes::mark_decided(tx, demande_id, Statut::Acceptee)?;
                    if !flipped {
                        // The caller checked the demande was pending under the
                        // same writer; reaching this means the invariant broke.
                        // The Err rolls the deduction back.
                        return Err(StorageError::SqliteError {
                            message: format!("demande {demande_id} not pending at commit"),
                        });
                    }
                    Ok(ApprovalOutcome::Committed { new_quantite })
                }
                DeductOutcome::Missing => Ok(ApprovalOutcome::ProduitMissing),
                DeductOutcome::Insufficient { available } => {
                    Ok(ApprovalOutcome::Insufficient { available })
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn produit(quantite: i64) -> NouveauProduit {
        NouveauProduit {
            type_produit: "ORDINATEUR".to_string(),
            marque: "HP".to_string(),
            modele: "X1".to_string(),
            quantite,
            date_insertion: "2025-01-01".to_string(),
            numero_marche: "M-42".to_string(),
            seuil_critique: 2,
        }
    }

    fn demande(produit_id: ProduitId, quantite: i64) -> NouvelleDemande {
        NouvelleDemande {
            nom: "Alaoui".to_string(),
            prenom: "Sara".to_string(),
            matricule: "M123".to_string(),
            entite: "Technique".to_string(),
            produit_id,
            type_produit: "ORDINATEUR".to_string(),
            marque: "HP".to_string(),
            modele: "X1".to_string(),
            quantite,
            date: 1_700_000_000,
            demandeur_id: UserId::new("uid-1"),
        }
    }

    #[test]
    fn produit_crud_round_trip() {
        let engine = StorageEngine::open_in_memory().unwrap();
        let id = engine.insert_produit(&produit(10)).unwrap();

        let stored = engine.get_produit(id).unwrap().unwrap();
        assert_eq!(stored.quantite, 10);
        assert_eq!(stored.seuil_critique, 2);

        let mut edited = produit(4);
        edited.numero_marche = "M-43".to_string();
        assert!(engine.update_produit(id, &edited).unwrap());
        assert_eq!(engine.get_produit(id).unwrap().unwrap().numero_marche, "M-43");

        assert!(engine.delete_produit(id).unwrap());
        assert!(engine.get_produit(id).unwrap().is_none());
        assert!(!engine.delete_produit(id).unwrap());
    }

    #[test]
    fn find_by_key_normalizes_stored_rows() {
        let engine = StorageEngine::open_in_memory().unwrap();
        let mut legacy = produit(1);
        legacy.type_produit = " ordinateur ".to_string();
        legacy.marque = "hp".to_string();
        engine.insert_produit(&legacy).unwrap();

        let key = ProduitKey::new("ORDINATEUR", "HP", "X1");
        let matches = engine.find_produits_by_key(&key).unwrap();
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn deduct_outcomes() {
        let engine = StorageEngine::open_in_memory().unwrap();
        let id = engine.insert_produit(&produit(5)).unwrap();

        assert_eq!(
            engine.deduct_quantite(id, 5).unwrap(),
            DeductOutcome::Deducted { new_quantite: 0 }
        );
        assert_eq!(
            engine.deduct_quantite(id, 1).unwrap(),
            DeductOutcome::Insufficient { available: 0 }
        );
        assert_eq!(
            engine.deduct_quantite(ProduitId(999), 1).unwrap(),
            DeductOutcome::Missing
        );
    }

    #[test]
    fn commit_approval_is_atomic() {
        let engine = StorageEngine::open_in_memory().unwrap();
        let produit_id = engine.insert_produit(&produit(10)).unwrap();
        let demande_id = engine.insert_demande(&demande(produit_id, 3)).unwrap();

        let outcome = engine.commit_approval(demande_id, produit_id, 3).unwrap();
        assert_eq!(outcome, ApprovalOutcome::Committed { new_quantite: 7 });
        assert_eq!(
            engine.get_demande(demande_id).unwrap().unwrap().statut,
            Statut::Acceptee
        );

        // Insufficient stock leaves both records untouched.
        let second = engine.insert_demande(&demande(produit_id, 8)).unwrap();
        let outcome = engine.commit_approval(second, produit_id, 8).unwrap();
        assert_eq!(outcome, ApprovalOutcome::Insufficient { available: 7 });
        assert_eq!(
            engine.get_demande(second).unwrap().unwrap().statut,
            Statut::EnAttente
        );
        assert_eq!(engine.get_produit(produit_id).unwrap().unwrap().quantite, 7);
    }

    #[test]
    fn commit_approval_rolls_back_when_demande_already_decided() {
        let engine = StorageEngine::open_in_memory().unwrap();
        let produit_id = engine.insert_produit(&produit(10)).unwrap();
        let demande_id = engine.insert_demande(&demande(produit_id, 3)).unwrap();
        assert!(engine.mark_decided(demande_id, Statut::Refusee).unwrap());

        let err = engine.commit_approval(demande_id, produit_id, 3).unwrap_err();
        assert!(matches!(err, StorageError::SqliteError { .. }));
        // The deduction inside the failed transaction must not stick.
        assert_eq!(engine.get_produit(produit_id).unwrap().unwrap().quantite, 10);
    }

    #[test]
    fn file_backed_engine_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("gestock.db");

        let id = {
            let engine = StorageEngine::open(&db_path).unwrap();
            engine.insert_produit(&produit(3)).unwrap()
        };

        let engine = StorageEngine::open(&db_path).unwrap();
        assert_eq!(engine.get_produit(id).unwrap().unwrap().quantite, 3);
    }
}
