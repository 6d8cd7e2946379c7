//! Property tests for the stock invariant.

use std::sync::Arc;

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use gestock_core::errors::GestockError;
use gestock_core::events::EventDispatcher;
use gestock_core::traits::{ProduitStore, RecordStore};
use gestock_core::types::produit::NouveauProduit;
use gestock_service::InventoryLedger;
use gestock_storage::StorageEngine;

fn ledger_with_stock(quantite: i64) -> (Arc<StorageEngine>, InventoryLedger) {
    let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
    let store: Arc<dyn RecordStore> = engine.clone();
    let ledger = InventoryLedger::new(store, EventDispatcher::default());
    ledger
        .add(&NouveauProduit {
            type_produit: "ORDINATEUR".to_string(),
            marque: "HP".to_string(),
            modele: "X1".to_string(),
            quantite,
            date_insertion: "2025-01-01".to_string(),
            numero_marche: "M-42".to_string(),
            seuil_critique: 0,
        })
        .unwrap();
    (engine, ledger)
}

proptest! {
    /// Whatever sequence of deductions is attempted, observed stock never
    /// goes negative, and every successful deduction is exactly reflected.
    #[test]
    fn stock_never_goes_negative(
        initial in 0i64..50,
        deductions in proptest::collection::vec(1i64..20, 0..12),
    ) {
        let (engine, ledger) = ledger_with_stock(initial);
        let mut expected = initial;

        for amount in deductions {
            match ledger.deduct("ORDINATEUR", "HP", "X1", amount) {
                Ok(new_quantite) => {
                    expected -= amount;
                    prop_assert_eq!(new_quantite, expected);
                }
                Err(GestockError::InsufficientStock { available, requested, .. }) => {
                    prop_assert_eq!(available, expected);
                    prop_assert_eq!(requested, amount);
                }
                Err(other) => return Err(TestCaseError::fail(other.to_string())),
            }
            let produits = engine.list_produits().unwrap();
            prop_assert_eq!(produits.len(), 1);
            prop_assert!(produits[0].quantite >= 0);
            prop_assert_eq!(produits[0].quantite, expected);
        }
    }
}
