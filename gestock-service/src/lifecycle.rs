//! Request lifecycle: submission, decision, and read projections.
//!
//! A demande is created `en_attente` with its produit resolved up front, and
//! decided at most once. Approval deducts stock and flips the statut in one
//! storage transaction, so no decided demande can exist without its
//! deduction, and no deduction without its decision.

use std::sync::Arc;

use gestock_core::errors::GestockError;
use gestock_core::events::{EventDispatcher, GestockEvent};
use gestock_core::traits::store::ApprovalOutcome;
use gestock_core::traits::RecordStore;
use gestock_core::types::demande::{Decision, Demande, DemandeDraft, NouvelleDemande, Statut};
use gestock_core::types::identifiers::DemandeId;
use gestock_core::types::produit::ProduitKey;
use gestock_core::types::role::Role;
use gestock_core::types::time::now_epoch;

use crate::auth::{AuthorizationGuard, Session};
use crate::reports::FicheRetrait;

/// Filter for the history view. All criteria are optional and combined with
/// AND; dates are epoch seconds, bounds inclusive.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    /// Case-insensitive substring matched against nom and prenom.
    pub term: Option<String>,
    pub from: Option<i64>,
    pub to: Option<i64>,
}

impl HistoryFilter {
    fn matches(&self, demande: &Demande) -> bool {
        if let Some(term) = &self.term {
            let term = term.to_lowercase();
            let hit = demande.nom.to_lowercase().contains(&term)
                || demande.prenom.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }
        if let Some(from) = self.from {
            if demande.date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if demande.date > to {
                return false;
            }
        }
        true
    }
}

/// Manages the `demandes` collection.
#[derive(Clone)]
pub struct RequestLifecycle {
    store: Arc<dyn RecordStore>,
    guard: AuthorizationGuard,
    events: EventDispatcher,
}

impl RequestLifecycle {
    pub fn new(store: Arc<dyn RecordStore>, events: EventDispatcher) -> Self {
        Self {
            guard: AuthorizationGuard::new(Arc::clone(&store)),
            store,
            events,
        }
    }

    /// Submit a new demande for the signed-in user. The produit is resolved
    /// from the normalized triple here, once; the demande stores its id. No
    /// inventory effect until approval.
    pub fn submit(
        &self,
        session: &Session,
        draft: &DemandeDraft,
    ) -> Result<DemandeId, GestockError> {
        let demandeur = self.guard.require(session, &[])?;

        if draft.quantite <= 0 {
            return Err(GestockError::validation("quantite must be positive"));
        }
        let key = ProduitKey::new(&draft.type_produit, &draft.marque, &draft.modele);
        if !key.is_complete() {
            return Err(GestockError::validation(
                "type, marque and modele are required",
            ));
        }

        let mut matches = self.store.find_produits_by_key(&key)?;
        let produit = match matches.len() {
            0 => return Err(GestockError::not_found("produit", &key)),
            1 => matches.remove(0),
            n => {
                return Err(GestockError::DuplicateMatch {
                    key: key.to_string(),
                    matches: n,
                })
            }
        };

        let entite = draft.entite.trim();
        let demande = NouvelleDemande {
            nom: demandeur.nom,
            prenom: demandeur.prenom,
            matricule: demandeur.matricule,
            entite: if entite.is_empty() {
                demandeur.entite
            } else {
                entite.to_string()
            },
            produit_id: produit.id,
            type_produit: key.type_produit,
            marque: key.marque,
            modele: key.modele,
            quantite: draft.quantite,
            date: now_epoch(),
            demandeur_id: demandeur.id,
        };
        let id = self.store.insert_demande(&demande)?;
        tracing::info!(demande_id = %id, produit_id = %produit.id, "demande submitted");
        self.events
            .emit(&GestockEvent::DemandeSubmitted { demande_id: id });
        Ok(id)
    }

    /// Decide a pending demande. Responsable only.
    ///
    /// Reject flips the statut and touches nothing else. Approve commits the
    /// stock deduction and the statut flip atomically; on any failure the
    /// demande stays `en_attente` and the stock is unchanged.
    pub fn decide(
        &self,
        session: &Session,
        id: DemandeId,
        decision: Decision,
    ) -> Result<(), GestockError> {
        self.guard.require(session, &[Role::Responsable])?;

        let demande = self
            .store
            .get_demande(id)?
            .ok_or_else(|| GestockError::not_found("demande", id))?;
        if demande.statut.is_terminal() {
            return Err(GestockError::InvalidState {
                id: id.0,
                statut: demande.statut.to_string(),
            });
        }

        match decision {
            Decision::Reject => {
                if !self.store.mark_decided(id, Statut::Refusee)? {
                    // Decided between the read above and this write.
                    let statut = self
                        .store
                        .get_demande(id)?
                        .map(|d| d.statut.to_string())
                        .unwrap_or_else(|| "missing".to_string());
                    return Err(GestockError::InvalidState { id: id.0, statut });
                }
                tracing::info!(demande_id = %id, "demande refusee");
                self.events.emit(&GestockEvent::DemandeDecided {
                    demande_id: id,
                    statut: Statut::Refusee,
                });
                Ok(())
            }
            Decision::Approve => {
                match self
                    .store
                    .commit_approval(id, demande.produit_id, demande.quantite)?
                {
                    ApprovalOutcome::Committed { new_quantite } => {
                        tracing::info!(
                            demande_id = %id,
                            produit_id = %demande.produit_id,
                            remaining = new_quantite,
                            "demande acceptee"
                        );
                        self.events.emit(&GestockEvent::StockChanged {
                            produit_id: demande.produit_id,
                            quantite: new_quantite,
                        });
                        self.events.emit(&GestockEvent::DemandeDecided {
                            demande_id: id,
                            statut: Statut::Acceptee,
                        });
                        Ok(())
                    }
                    ApprovalOutcome::ProduitMissing => {
                        Err(GestockError::not_found("produit", demande.produit_id))
                    }
                    ApprovalOutcome::Insufficient { available } => {
                        Err(GestockError::InsufficientStock {
                            key: ProduitKey::new(
                                &demande.type_produit,
                                &demande.marque,
                                &demande.modele,
                            )
                            .to_string(),
                            available,
                            requested: demande.quantite,
                        })
                    }
                }
            }
        }
    }

    /// The signed-in user's own demandes, newest first.
    pub fn my_demandes(&self, session: &Session) -> Result<Vec<Demande>, GestockError> {
        let demandeur = self.guard.require(session, &[])?;
        Ok(self.store.list_demandes_by_demandeur(&demandeur.id)?)
    }

    /// Every demande, newest first.
    pub fn list_all(&self, session: &Session) -> Result<Vec<Demande>, GestockError> {
        self.guard
            .require(session, &[Role::Responsable, Role::Superviseur])?;
        Ok(self.store.list_demandes()?)
    }

    /// Pending demandes awaiting a decision.
    pub fn list_pending(&self, session: &Session) -> Result<Vec<Demande>, GestockError> {
        self.guard
            .require(session, &[Role::Responsable, Role::Superviseur])?;
        Ok(self.store.list_demandes_by_statut(Statut::EnAttente)?)
    }

    /// Filtered view over all demandes for the history screen.
    pub fn history(
        &self,
        session: &Session,
        filter: &HistoryFilter,
    ) -> Result<Vec<Demande>, GestockError> {
        self.guard
            .require(session, &[Role::Responsable, Role::Superviseur])?;
        Ok(self
            .store
            .list_demandes()?
            .into_iter()
            .filter(|d| filter.matches(d))
            .collect())
    }

    /// Build the fiche de retrait for an accepted demande.
    pub fn generate_document(
        &self,
        session: &Session,
        id: DemandeId,
    ) -> Result<FicheRetrait, GestockError> {
        self.guard.require(session, &[Role::Responsable])?;
        let demande = self
            .store
            .get_demande(id)?
            .ok_or_else(|| GestockError::not_found("demande", id))?;
        FicheRetrait::from_demande(&demande)
    }
}
