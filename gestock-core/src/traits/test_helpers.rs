//! In-memory test doubles for the boundary traits.
//!
//! `MemoryStore` backs unit tests that should not open a SQLite connection;
//! integration tests use the real engine from `gestock-storage`.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::errors::StorageError;
use crate::traits::identity::{IdentityError, IdentityProvider};
use crate::traits::store::{
    ApprovalOutcome, DeductOutcome, DemandeStore, ProduitStore, UserStore,
};
use crate::types::demande::{Demande, NouvelleDemande, Statut};
use crate::types::identifiers::{DemandeId, ProduitId, UserId};
use crate::types::produit::{NouveauProduit, Produit, ProduitKey};
use crate::types::role::Role;
use crate::types::user::UserProfile;

#[derive(Default)]
struct Inner {
    users: Vec<UserProfile>,
    produits: BTreeMap<i64, Produit>,
    demandes: BTreeMap<i64, Demande>,
    next_produit_id: i64,
    next_demande_id: i64,
}

/// In-memory implementation of all three store traits.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for MemoryStore {
    fn get_user(&self, id: &UserId) -> Result<Option<UserProfile>, StorageError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| &u.id == id).cloned())
    }

    fn put_user(&self, user: &UserProfile) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap();
        inner.users.retain(|u| u.id != user.id);
        inner.users.push(user.clone());
        Ok(())
    }

    fn list_users(&self) -> Result<Vec<UserProfile>, StorageError> {
        let mut users = self.inner.lock().unwrap().users.clone();
        users.sort_by(|a, b| a.nom.cmp(&b.nom));
        Ok(users)
    }

    fn set_role(&self, id: &UserId, role: Role) -> Result<bool, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.users.iter_mut().find(|u| &u.id == id) {
            Some(user) => {
                user.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_user(&self, id: &UserId) -> Result<bool, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.users.len();
        inner.users.retain(|u| &u.id != id);
        Ok(inner.users.len() < before)
    }
}

impl ProduitStore for MemoryStore {
    fn insert_produit(&self, produit: &NouveauProduit) -> Result<ProduitId, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_produit_id += 1;
        let id = inner.next_produit_id;
        inner.produits.insert(
            id,
            Produit {
                id: ProduitId(id),
                type_produit: produit.type_produit.clone(),
                marque: produit.marque.clone(),
                modele: produit.modele.clone(),
                quantite: produit.quantite,
                date_insertion: produit.date_insertion.clone(),
                numero_marche: produit.numero_marche.clone(),
                seuil_critique: produit.seuil_critique,
            },
        );
        Ok(ProduitId(id))
    }

    fn get_produit(&self, id: ProduitId) -> Result<Option<Produit>, StorageError> {
        Ok(self.inner.lock().unwrap().produits.get(&id.0).cloned())
    }

    fn update_produit(
        &self,
        id: ProduitId,
        produit: &NouveauProduit,
    ) -> Result<bool, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.produits.get_mut(&id.0) {
            Some(existing) => {
                existing.type_produit = produit.type_produit.clone();
                existing.marque = produit.marque.clone();
                existing.modele = produit.modele.clone();
                existing.quantite = produit.quantite;
                existing.date_insertion = produit.date_insertion.clone();
                existing.numero_marche = produit.numero_marche.clone();
                existing.seuil_critique = produit.seuil_critique;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_produit(&self, id: ProduitId) -> Result<bool, StorageError> {
        Ok(self.inner.lock().unwrap().produits.remove(&id.0).is_some())
    }

    fn list_produits(&self) -> Result<Vec<Produit>, StorageError> {
        Ok(self.inner.lock().unwrap().produits.values().cloned().collect())
    }

    fn find_produits_by_key(&self, key: &ProduitKey) -> Result<Vec<Produit>, StorageError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .produits
            .values()
            .filter(|p| &p.key() == key)
            .cloned()
            .collect())
    }

    fn deduct_quantite(
        &self,
        id: ProduitId,
        quantite: i64,
    ) -> Result<DeductOutcome, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.produits.get_mut(&id.0) {
            None => Ok(DeductOutcome::Missing),
            Some(p) if p.quantite < quantite => Ok(DeductOutcome::Insufficient {
                available: p.quantite,
            }),
            Some(p) => {
                p.quantite -= quantite;
                Ok(DeductOutcome::Deducted {
                    new_quantite: p.quantite,
                })
            }
        }
    }
}

impl DemandeStore for MemoryStore {
    fn insert_demande(&self, demande: &NouvelleDemande) -> Result<DemandeId, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_demande_id += 1;
        let id = inner.next_demande_id;
        inner.demandes.insert(
            id,
            Demande {
                id: DemandeId(id),
                nom: demande.nom.clone(),
                prenom: demande.prenom.clone(),
                matricule: demande.matricule.clone(),
                entite: demande.entite.clone(),
                produit_id: demande.produit_id,
                type_produit: demande.type_produit.clone(),
                marque: demande.marque.clone(),
                modele: demande.modele.clone(),
                quantite: demande.quantite,
                date: demande.date,
                statut: Statut::EnAttente,
                demandeur_id: demande.demandeur_id.clone(),
            },
        );
        Ok(DemandeId(id))
    }

    fn get_demande(&self, id: DemandeId) -> Result<Option<Demande>, StorageError> {
        Ok(self.inner.lock().unwrap().demandes.get(&id.0).cloned())
    }

    fn list_demandes(&self) -> Result<Vec<Demande>, StorageError> {
        let mut demandes: Vec<Demande> =
            self.inner.lock().unwrap().demandes.values().cloned().collect();
        demandes.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(demandes)
    }

    fn list_demandes_by_demandeur(
        &self,
        demandeur: &UserId,
    ) -> Result<Vec<Demande>, StorageError> {
        Ok(self
            .list_demandes()?
            .into_iter()
            .filter(|d| &d.demandeur_id == demandeur)
            .collect())
    }

    fn list_demandes_by_statut(&self, statut: Statut) -> Result<Vec<Demande>, StorageError> {
        Ok(self
            .list_demandes()?
            .into_iter()
            .filter(|d| d.statut == statut)
            .collect())
    }

    fn mark_decided(&self, id: DemandeId, statut: Statut) -> Result<bool, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.demandes.get_mut(&id.0) {
            Some(d) if d.statut == Statut::EnAttente => {
                d.statut = statut;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn commit_approval(
        &self,
        demande_id: DemandeId,
        produit_id: ProduitId,
        quantite: i64,
    ) -> Result<ApprovalOutcome, StorageError> {
        let mut inner = self.inner.lock().unwrap();

        let pending = matches!(
            inner.demandes.get(&demande_id.0),
            Some(d) if d.statut == Statut::EnAttente
        );
        if !pending {
            return Err(StorageError::SqliteError {
                message: format!("demande {demande_id} not pending at commit"),
            });
        }

        let new_quantite = match inner.produits.get_mut(&produit_id.0) {
            None => return Ok(ApprovalOutcome::ProduitMissing),
            Some(p) if p.quantite < quantite => {
                return Ok(ApprovalOutcome::Insufficient {
                    available: p.quantite,
                })
            }
            Some(p) => {
                p.quantite -= quantite;
                p.quantite
            }
        };

        if let Some(d) = inner.demandes.get_mut(&demande_id.0) {
            d.statut = Statut::Acceptee;
        }
        Ok(ApprovalOutcome::Committed { new_quantite })
    }
}

/// Identity-provider test double with a fixed account table.
#[derive(Default)]
pub struct StaticIdentity {
    accounts: Mutex<Vec<(String, String, UserId)>>,
    current: Mutex<Option<UserId>>,
}

impl StaticIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_account(&self, identifiant: &str, secret: &str, uid: UserId) {
        self.accounts
            .lock()
            .unwrap()
            .push((identifiant.to_string(), secret.to_string(), uid));
    }
}

impl IdentityProvider for StaticIdentity {
    fn sign_in(&self, identifiant: &str, secret: &str) -> Result<UserId, IdentityError> {
        let accounts = self.accounts.lock().unwrap();
        let uid = accounts
            .iter()
            .find(|(i, s, _)| i == identifiant && s == secret)
            .map(|(_, _, uid)| uid.clone())
            .ok_or(IdentityError::InvalidCredentials)?;
        *self.current.lock().unwrap() = Some(uid.clone());
        Ok(uid)
    }

    fn sign_out(&self) {
        *self.current.lock().unwrap() = None;
    }

    fn current_user(&self) -> Option<UserId> {
        self.current.lock().unwrap().clone()
    }
}
