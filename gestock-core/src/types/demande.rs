//! Supply requests (the `demandes` collection) and their lifecycle states.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::identifiers::{DemandeId, ProduitId, UserId};

/// Lifecycle state of a demande. `EnAttente` is the only non-terminal state;
/// a demande is decided at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statut {
    EnAttente,
    Acceptee,
    Refusee,
}

impl Statut {
    /// Stable string form stored in the `demandes` table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Statut::EnAttente => "en_attente",
            Statut::Acceptee => "acceptee",
            Statut::Refusee => "refusee",
        }
    }

    /// Parse the stored string form. Unknown strings map to `None`.
    pub fn parse(s: &str) -> Option<Statut> {
        match s {
            "en_attente" => Some(Statut::EnAttente),
            "acceptee" => Some(Statut::Acceptee),
            "refusee" => Some(Statut::Refusee),
            _ => None,
        }
    }

    /// Terminal states cannot be decided again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Statut::EnAttente)
    }
}

impl fmt::Display for Statut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decision taken by a responsable on a pending demande.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

/// A supply request document.
///
/// `produit_id` is resolved from the normalized product triple once at
/// submission; the triple itself is kept for display and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demande {
    pub id: DemandeId,
    pub nom: String,
    pub prenom: String,
    pub matricule: String,
    pub entite: String,
    pub produit_id: ProduitId,
    pub type_produit: String,
    pub marque: String,
    pub modele: String,
    pub quantite: i64,
    /// Submission time, epoch seconds.
    pub date: i64,
    pub statut: Statut,
    pub demandeur_id: UserId,
}

/// Submission form input, before product resolution and validation.
#[derive(Debug, Clone, Default)]
pub struct DemandeDraft {
    pub type_produit: String,
    pub marque: String,
    pub modele: String,
    pub quantite: i64,
    /// Overrides the demandeur's department when non-blank.
    pub entite: String,
}

/// Fully-resolved demande row, ready for insertion. Always persisted
/// `en_attente`.
#[derive(Debug, Clone)]
pub struct NouvelleDemande {
    pub nom: String,
    pub prenom: String,
    pub matricule: String,
    pub entite: String,
    pub produit_id: ProduitId,
    pub type_produit: String,
    pub marque: String,
    pub modele: String,
    pub quantite: i64,
    pub date: i64,
    pub demandeur_id: UserId,
}
