//! Inventory ledger: produit CRUD and the stock deduction primitive.
//!
//! All text fields are normalized on write with the same rule the matching
//! key uses, so a record can always be found again through its triple.

use std::sync::Arc;

use gestock_core::errors::GestockError;
use gestock_core::events::{EventDispatcher, GestockEvent};
use gestock_core::traits::store::DeductOutcome;
use gestock_core::traits::RecordStore;
use gestock_core::types::identifiers::ProduitId;
use gestock_core::types::produit::{normalize, NouveauProduit, Produit, ProduitKey};

/// Manages the `produits` collection.
#[derive(Clone)]
pub struct InventoryLedger {
    store: Arc<dyn RecordStore>,
    events: EventDispatcher,
}

impl InventoryLedger {
    pub fn new(store: Arc<dyn RecordStore>, events: EventDispatcher) -> Self {
        Self { store, events }
    }

    /// Validate and normalize form input into an insertable record.
    fn prepare(&self, produit: &NouveauProduit) -> Result<NouveauProduit, GestockError> {
        let key = ProduitKey::new(&produit.type_produit, &produit.marque, &produit.modele);
        if !key.is_complete() {
            return Err(GestockError::validation(
                "type, marque and modele are required",
            ));
        }
        if produit.quantite < 0 {
            return Err(GestockError::validation("quantite cannot be negative"));
        }
        if produit.seuil_critique < 0 {
            return Err(GestockError::validation("seuil critique cannot be negative"));
        }
        Ok(NouveauProduit {
            type_produit: key.type_produit,
            marque: key.marque,
            modele: key.modele,
            quantite: produit.quantite,
            date_insertion: produit.date_insertion.trim().to_string(),
            numero_marche: produit.numero_marche.trim().to_string(),
            seuil_critique: produit.seuil_critique,
        })
    }

    /// Add a produit record. Returns the stored record.
    pub fn add(&self, produit: &NouveauProduit) -> Result<Produit, GestockError> {
        let prepared = self.prepare(produit)?;
        let id = self.store.insert_produit(&prepared)?;
        tracing::info!(produit_id = %id, quantite = prepared.quantite, "produit added");
        self.events.emit(&GestockEvent::StockChanged {
            produit_id: id,
            quantite: prepared.quantite,
        });
        Ok(Produit {
            id,
            type_produit: prepared.type_produit,
            marque: prepared.marque,
            modele: prepared.modele,
            quantite: prepared.quantite,
            date_insertion: prepared.date_insertion,
            numero_marche: prepared.numero_marche,
            seuil_critique: prepared.seuil_critique,
        })
    }

    /// Replace an existing record's fields.
    pub fn edit(&self, id: ProduitId, produit: &NouveauProduit) -> Result<(), GestockError> {
        let prepared = self.prepare(produit)?;
        if !self.store.update_produit(id, &prepared)? {
            return Err(GestockError::not_found("produit", id));
        }
        self.events.emit(&GestockEvent::StockChanged {
            produit_id: id,
            quantite: prepared.quantite,
        });
        Ok(())
    }

    /// Remove a record entirely.
    pub fn remove(&self, id: ProduitId) -> Result<(), GestockError> {
        if !self.store.delete_produit(id)? {
            return Err(GestockError::not_found("produit", id));
        }
        tracing::info!(produit_id = %id, "produit removed");
        self.events.emit(&GestockEvent::ProduitRemoved { produit_id: id });
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<Produit>, GestockError> {
        Ok(self.store.list_produits()?)
    }

    pub fn get(&self, id: ProduitId) -> Result<Option<Produit>, GestockError> {
        Ok(self.store.get_produit(id)?)
    }

    /// Resolve a normalized key to exactly one record. Zero matches is
    /// `NotFound`; several matches are surfaced as `DuplicateMatch` rather
    /// than silently picking one.
    pub fn resolve(&self, key: &ProduitKey) -> Result<Produit, GestockError> {
        let mut matches = self.store.find_produits_by_key(key)?;
        match matches.len() {
            0 => Err(GestockError::not_found("produit", key)),
            1 => Ok(matches.remove(0)),
            n => Err(GestockError::DuplicateMatch {
                key: key.to_string(),
                matches: n,
            }),
        }
    }

    /// Deduct stock from the produit matching the triple. Returns the new
    /// quantity. Nothing is written on any failure.
    pub fn deduct(
        &self,
        type_produit: &str,
        marque: &str,
        modele: &str,
        quantite: i64,
    ) -> Result<i64, GestockError> {
        if quantite <= 0 {
            return Err(GestockError::validation(
                "deducted quantite must be positive",
            ));
        }
        let key = ProduitKey::new(type_produit, marque, modele);
        if !key.is_complete() {
            return Err(GestockError::validation(
                "type, marque and modele are required",
            ));
        }
        let produit = self.resolve(&key)?;
        match self.store.deduct_quantite(produit.id, quantite)? {
            DeductOutcome::Deducted { new_quantite } => {
                tracing::info!(
                    produit_id = %produit.id,
                    deducted = quantite,
                    remaining = new_quantite,
                    "stock deducted"
                );
                self.events.emit(&GestockEvent::StockChanged {
                    produit_id: produit.id,
                    quantite: new_quantite,
                });
                Ok(new_quantite)
            }
            // The record vanished between resolve and deduct.
            DeductOutcome::Missing => Err(GestockError::not_found("produit", key)),
            DeductOutcome::Insufficient { available } => Err(GestockError::InsufficientStock {
                key: key.to_string(),
                available,
                requested: quantite,
            }),
        }
    }

    /// Produits at or below their critical threshold.
    pub fn low_stock(&self) -> Result<Vec<Produit>, GestockError> {
        Ok(self
            .store
            .list_produits()?
            .into_iter()
            .filter(Produit::is_below_seuil)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gestock_core::traits::test_helpers::MemoryStore;

    fn ledger() -> InventoryLedger {
        InventoryLedger::new(Arc::new(MemoryStore::new()), EventDispatcher::default())
    }

    fn form(type_produit: &str, marque: &str, modele: &str, quantite: i64) -> NouveauProduit {
        NouveauProduit {
            type_produit: type_produit.to_string(),
            marque: marque.to_string(),
            modele: modele.to_string(),
            quantite,
            date_insertion: "2025-01-01".to_string(),
            numero_marche: "M-42".to_string(),
            seuil_critique: 0,
        }
    }

    #[test]
    fn add_normalizes_text_fields() {
        let ledger = ledger();
        let stored = ledger.add(&form(" ordinateur ", "hp", " x1 ", 5)).unwrap();
        assert_eq!(stored.type_produit, "ORDINATEUR");
        assert_eq!(stored.marque, "HP");
        assert_eq!(stored.modele, "X1");
    }

    #[test]
    fn add_rejects_blank_key_component() {
        let ledger = ledger();
        let err = ledger.add(&form("ORDINATEUR", "  ", "X1", 5)).unwrap_err();
        assert!(matches!(err, GestockError::Validation(_)));
    }

    #[test]
    fn resolve_surfaces_duplicates() {
        let ledger = ledger();
        ledger.add(&form("ORDINATEUR", "HP", "X1", 5)).unwrap();
        ledger.add(&form(" ordinateur", " hp ", "x1", 2)).unwrap();

        let err = ledger
            .resolve(&ProduitKey::new("ORDINATEUR", "HP", "X1"))
            .unwrap_err();
        assert!(matches!(
            err,
            GestockError::DuplicateMatch { matches: 2, .. }
        ));
    }

    #[test]
    fn deduct_to_zero_then_fail_without_write() {
        let ledger = ledger();
        ledger.add(&form("ORDINATEUR", "HP", "X1", 5)).unwrap();

        assert_eq!(ledger.deduct("ORDINATEUR", "HP", "X1", 5).unwrap(), 0);

        let err = ledger.deduct("ORDINATEUR", "HP", "X1", 1).unwrap_err();
        assert!(matches!(
            err,
            GestockError::InsufficientStock {
                available: 0,
                requested: 1,
                ..
            }
        ));
    }

    #[test]
    fn failed_deduct_leaves_stock_unchanged() {
        let ledger = ledger();
        ledger.add(&form("ORDINATEUR", "HP", "X1", 5)).unwrap();

        let err = ledger.deduct("ORDINATEUR", "HP", "X1", 6).unwrap_err();
        assert!(matches!(
            err,
            GestockError::InsufficientStock {
                available: 5,
                requested: 6,
                ..
            }
        ));
        let remaining = ledger
            .resolve(&ProduitKey::new("ORDINATEUR", "HP", "X1"))
            .unwrap()
            .quantite;
        assert_eq!(remaining, 5);
    }

    #[test]
    fn deduct_matches_unnormalized_input() {
        let ledger = ledger();
        ledger.add(&form("ORDINATEUR", "HP", "X1", 5)).unwrap();
        assert_eq!(ledger.deduct(" ordinateur ", "hp", "x1", 2).unwrap(), 3);
    }

    #[test]
    fn low_stock_is_inclusive_of_threshold() {
        let ledger = ledger();
        let mut at_threshold = form("ORDINATEUR", "HP", "X1", 3);
        at_threshold.seuil_critique = 3;
        ledger.add(&at_threshold).unwrap();
        ledger.add(&form("ECRAN", "DELL", "U24", 10)).unwrap();

        let low = ledger.low_stock().unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].type_produit, "ORDINATEUR");
    }

    #[test]
    fn remove_emits_event_and_second_remove_is_not_found() {
        let dispatcher = EventDispatcher::default();
        let (subscriber, rx) = gestock_core::events::ChannelSubscriber::new();
        dispatcher.subscribe(Arc::new(subscriber));
        let ledger = InventoryLedger::new(Arc::new(MemoryStore::new()), dispatcher);

        let stored = ledger.add(&form("ORDINATEUR", "HP", "X1", 5)).unwrap();
        ledger.remove(stored.id).unwrap();

        let events: Vec<_> = rx.try_iter().collect();
        assert!(events.contains(&GestockEvent::ProduitRemoved {
            produit_id: stored.id
        }));

        let err = ledger.remove(stored.id).unwrap_err();
        assert!(matches!(err, GestockError::NotFound { .. }));
    }
}
