//! Read-only projections: fiche de retrait, dashboard stats, stock export.
//!
//! Everything here is plain data; rendering to Word, PDF or a spreadsheet
//! happens outside this crate.

use std::sync::Arc;

use serde::Serialize;

use gestock_core::errors::GestockError;
use gestock_core::traits::RecordStore;
use gestock_core::types::collections::FxHashMap;
use gestock_core::types::demande::{Demande, Statut};
use gestock_core::types::identifiers::DemandeId;

/// Data for the printable withdrawal slip of an accepted demande.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FicheRetrait {
    pub demande_id: DemandeId,
    pub nom: String,
    pub prenom: String,
    pub matricule: String,
    pub entite: String,
    /// Display form of the product, "TYPE - MODELE - MARQUE".
    pub produit: String,
    pub quantite: i64,
    /// Submission time, epoch seconds.
    pub date: i64,
}

impl FicheRetrait {
    /// Project an accepted demande onto the slip. Any other statut is an
    /// invalid state.
    pub fn from_demande(demande: &Demande) -> Result<FicheRetrait, GestockError> {
        if demande.statut != Statut::Acceptee {
            return Err(GestockError::InvalidState {
                id: demande.id.0,
                statut: demande.statut.to_string(),
            });
        }
        Ok(FicheRetrait {
            demande_id: demande.id,
            nom: demande.nom.clone(),
            prenom: demande.prenom.clone(),
            matricule: demande.matricule.clone(),
            entite: demande.entite.clone(),
            produit: format!(
                "{} - {} - {}",
                demande.type_produit, demande.modele, demande.marque
            ),
            quantite: demande.quantite,
            date: demande.date,
        })
    }
}

/// Aggregates for the statistics view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_produits: usize,
    /// Sum of all stock quantities.
    pub total_stock: i64,
    pub demandes_en_attente: usize,
    pub demandes_acceptees: usize,
    pub demandes_refusees: usize,
    /// Demande count per product display key.
    pub demandes_par_produit: FxHashMap<String, usize>,
}

/// One row of the stock spreadsheet export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockExportRow {
    pub type_produit: String,
    pub marque: String,
    pub modele: String,
    pub quantite: i64,
    pub numero_marche: String,
    pub date_insertion: String,
    /// Stock at or below the critical threshold.
    pub sous_seuil: bool,
}

/// Builds the read projections from the store.
#[derive(Clone)]
pub struct Reporting {
    store: Arc<dyn RecordStore>,
}

impl Reporting {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn dashboard(&self) -> Result<DashboardStats, GestockError> {
        let produits = self.store.list_produits()?;
        let demandes = self.store.list_demandes()?;

        let mut stats = DashboardStats {
            total_produits: produits.len(),
            total_stock: produits.iter().map(|p| p.quantite).sum(),
            ..DashboardStats::default()
        };
        for demande in &demandes {
            match demande.statut {
                Statut::EnAttente => stats.demandes_en_attente += 1,
                Statut::Acceptee => stats.demandes_acceptees += 1,
                Statut::Refusee => stats.demandes_refusees += 1,
            }
            let key = format!(
                "{} - {} - {}",
                demande.type_produit, demande.modele, demande.marque
            );
            *stats.demandes_par_produit.entry(key).or_default() += 1;
        }
        Ok(stats)
    }

    pub fn stock_export_rows(&self) -> Result<Vec<StockExportRow>, GestockError> {
        Ok(self
            .store
            .list_produits()?
            .into_iter()
            .map(|p| StockExportRow {
                sous_seuil: p.is_below_seuil(),
                type_produit: p.type_produit,
                marque: p.marque,
                modele: p.modele,
                quantite: p.quantite,
                numero_marche: p.numero_marche,
                date_insertion: p.date_insertion,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gestock_core::types::identifiers::{ProduitId, UserId};

    fn demande(statut: Statut) -> Demande {
        Demande {
            id: DemandeId(7),
            nom: "Alaoui".to_string(),
            prenom: "Sara".to_string(),
            matricule: "M123".to_string(),
            entite: "Technique".to_string(),
            produit_id: ProduitId(1),
            type_produit: "ORDINATEUR".to_string(),
            marque: "HP".to_string(),
            modele: "X1".to_string(),
            quantite: 2,
            date: 1_700_000_000,
            statut,
            demandeur_id: UserId::new("u1"),
        }
    }

    #[test]
    fn fiche_formats_produit_as_type_modele_marque() {
        let fiche = FicheRetrait::from_demande(&demande(Statut::Acceptee)).unwrap();
        assert_eq!(fiche.produit, "ORDINATEUR - X1 - HP");
        assert_eq!(fiche.quantite, 2);
    }

    #[test]
    fn fiche_requires_acceptee() {
        for statut in [Statut::EnAttente, Statut::Refusee] {
            let err = FicheRetrait::from_demande(&demande(statut)).unwrap_err();
            assert!(matches!(err, GestockError::InvalidState { .. }));
        }
    }
}
