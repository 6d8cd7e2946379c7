//! Reporting projections over the real SQLite engine.

use std::sync::Arc;

use gestock_core::events::EventDispatcher;
use gestock_core::traits::{ProduitStore, RecordStore, UserStore};
use gestock_core::types::demande::{Decision, DemandeDraft};
use gestock_core::types::identifiers::UserId;
use gestock_core::types::produit::NouveauProduit;
use gestock_core::types::role::Role;
use gestock_core::types::time::now_epoch;
use gestock_core::types::user::UserProfile;
use gestock_service::{Reporting, RequestLifecycle, Session};
use gestock_storage::StorageEngine;

fn seed_user(store: &dyn RecordStore, id: &str, role: Role) -> Session {
    store
        .put_user(&UserProfile {
            id: UserId::new(id),
            nom: "Alaoui".to_string(),
            prenom: "Sara".to_string(),
            matricule: "M123".to_string(),
            entite: "Technique".to_string(),
            identifiant: format!("{id}@gestock"),
            role,
            created_at: now_epoch(),
        })
        .unwrap();
    Session::for_user(UserId::new(id))
}

fn seed_produit(store: &dyn RecordStore, modele: &str, quantite: i64, seuil: i64) {
    store
        .insert_produit(&NouveauProduit {
            type_produit: "ORDINATEUR".to_string(),
            marque: "HP".to_string(),
            modele: modele.to_string(),
            quantite,
            date_insertion: "2025-01-01".to_string(),
            numero_marche: "M-42".to_string(),
            seuil_critique: seuil,
        })
        .unwrap();
}

fn draft(modele: &str, quantite: i64) -> DemandeDraft {
    DemandeDraft {
        type_produit: "ORDINATEUR".to_string(),
        marque: "HP".to_string(),
        modele: modele.to_string(),
        quantite,
        entite: String::new(),
    }
}

#[test]
fn dashboard_aggregates_statuts_and_stock() {
    let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
    let store: Arc<dyn RecordStore> = engine.clone();
    let employe = seed_user(store.as_ref(), "emp", Role::Employe);
    let responsable = seed_user(store.as_ref(), "resp", Role::Responsable);
    seed_produit(store.as_ref(), "X1", 10, 0);
    seed_produit(store.as_ref(), "X2", 4, 0);
    let lifecycle = RequestLifecycle::new(store.clone(), EventDispatcher::default());

    let approved = lifecycle.submit(&employe, &draft("X1", 3)).unwrap();
    let rejected = lifecycle.submit(&employe, &draft("X1", 1)).unwrap();
    lifecycle.submit(&employe, &draft("X2", 2)).unwrap();
    lifecycle
        .decide(&responsable, approved, Decision::Approve)
        .unwrap();
    lifecycle
        .decide(&responsable, rejected, Decision::Reject)
        .unwrap();

    let stats = Reporting::new(store).dashboard().unwrap();
    assert_eq!(stats.total_produits, 2);
    // 10 - 3 after the approval, plus the untouched 4.
    assert_eq!(stats.total_stock, 11);
    assert_eq!(stats.demandes_en_attente, 1);
    assert_eq!(stats.demandes_acceptees, 1);
    assert_eq!(stats.demandes_refusees, 1);
    assert_eq!(stats.demandes_par_produit["ORDINATEUR - X1 - HP"], 2);
    assert_eq!(stats.demandes_par_produit["ORDINATEUR - X2 - HP"], 1);
}

#[test]
fn export_rows_flag_low_stock() {
    let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
    let store: Arc<dyn RecordStore> = engine.clone();
    seed_produit(store.as_ref(), "X1", 2, 2);
    seed_produit(store.as_ref(), "X2", 9, 2);

    let rows = Reporting::new(store).stock_export_rows().unwrap();
    assert_eq!(rows.len(), 2);
    let x1 = rows.iter().find(|r| r.modele == "X1").unwrap();
    let x2 = rows.iter().find(|r| r.modele == "X2").unwrap();
    assert!(x1.sous_seuil);
    assert!(!x2.sous_seuil);
}
