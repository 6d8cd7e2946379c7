//! Inventory records (the `produits` collection) and the normalized
//! matching key.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::identifiers::ProduitId;

/// An inventory record. `quantite` never goes negative; the storage layer
/// enforces the invariant with a conditional decrement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Produit {
    pub id: ProduitId,
    pub type_produit: String,
    pub marque: String,
    pub modele: String,
    pub quantite: i64,
    pub date_insertion: String,
    /// Procurement contract number.
    pub numero_marche: String,
    /// Critical threshold; stock at or below it is flagged in the low-stock
    /// report.
    pub seuil_critique: i64,
}

impl Produit {
    /// Normalized matching key for this record.
    pub fn key(&self) -> ProduitKey {
        ProduitKey::new(&self.type_produit, &self.marque, &self.modele)
    }

    /// Whether the stock level is at or below the critical threshold.
    pub fn is_below_seuil(&self) -> bool {
        self.quantite <= self.seuil_critique
    }
}

/// Input for creating or editing a produit. The ledger normalizes the text
/// fields on write so key matching stays consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NouveauProduit {
    pub type_produit: String,
    pub marque: String,
    pub modele: String,
    pub quantite: i64,
    pub date_insertion: String,
    pub numero_marche: String,
    pub seuil_critique: i64,
}

/// Normalized (trimmed, upper-cased) product matching key.
///
/// Demandes resolve their produit through this triple at submission time,
/// so the normalization here must be exactly what the write path applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProduitKey {
    pub type_produit: String,
    pub marque: String,
    pub modele: String,
}

impl ProduitKey {
    pub fn new(type_produit: &str, marque: &str, modele: &str) -> Self {
        Self {
            type_produit: normalize(type_produit),
            marque: normalize(marque),
            modele: normalize(modele),
        }
    }

    /// All three components non-empty after normalization.
    pub fn is_complete(&self) -> bool {
        !self.type_produit.is_empty() && !self.marque.is_empty() && !self.modele.is_empty()
    }
}

impl fmt::Display for ProduitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.type_produit, self.marque, self.modele)
    }
}

/// Trim and upper-case one matching field.
pub fn normalize(field: &str) -> String {
    field.trim().to_uppercase()
}
