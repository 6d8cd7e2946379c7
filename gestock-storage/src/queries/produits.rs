//! produits table queries.

use rusqlite::{params, Connection, OptionalExtension};

use gestock_core::errors::StorageError;
use gestock_core::traits::store::DeductOutcome;
use gestock_core::types::identifiers::ProduitId;
use gestock_core::types::produit::{NouveauProduit, Produit, ProduitKey};

const COLUMNS: &str =
    "id, type_produit, marque, modele, quantite, date_insertion, numero_marche, seuil_critique";

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Produit> {
    Ok(Produit {
        id: ProduitId(row.get(0)?),
        type_produit: row.get(1)?,
        marque: row.get(2)?,
        modele: row.get(3)?,
        quantite: row.get(4)?,
        date_insertion: row.get(5)?,
        numero_marche: row.get(6)?,
        seuil_critique: row.get(7)?,
    })
}

pub fn insert_produit(conn: &Connection, p: &NouveauProduit) -> Result<ProduitId, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO produits
             (type_produit, marque, modele, quantite, date_insertion, numero_marche, seuil_critique)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    stmt.execute(params![
        p.type_produit,
        p.marque,
        p.modele,
        p.quantite,
        p.date_insertion,
        p.numero_marche,
        p.seuil_critique,
    ])
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(ProduitId(conn.last_insert_rowid()))
}

pub fn get_produit(conn: &Connection, id: ProduitId) -> Result<Option<Produit>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!("SELECT {COLUMNS} FROM produits WHERE id = ?1"))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    stmt.query_row(params![id.0], map_row)
        .optional()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

/// Returns false when no such produit exists.
pub fn update_produit(
    conn: &Connection,
    id: ProduitId,
    p: &NouveauProduit,
) -> Result<bool, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "UPDATE produits SET
                 type_produit = ?2, marque = ?3, modele = ?4, quantite = ?5,
                 date_insertion = ?6, numero_marche = ?7, seuil_critique = ?8
             WHERE id = ?1",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    let changed = stmt
        .execute(params![
            id.0,
            p.type_produit,
            p.marque,
            p.modele,
            p.quantite,
            p.date_insertion,
            p.numero_marche,
            p.seuil_critique,
        ])
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(changed > 0)
}

/// Returns false when no such produit exists.
pub fn delete_produit(conn: &Connection, id: ProduitId) -> Result<bool, StorageError> {
    let mut stmt = conn
        .prepare_cached("DELETE FROM produits WHERE id = ?1")
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    let changed = stmt
        .execute(params![id.0])
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(changed > 0)
}

pub fn list_produits(conn: &Connection) -> Result<Vec<Produit>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {COLUMNS} FROM produits ORDER BY type_produit, marque, modele"
        ))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    let rows = stmt
        .query_map([], map_row)
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(|e| StorageError::SqliteError { message: e.to_string() })?);
    }
    Ok(result)
}

/// All produits matching the normalized key, oldest first. Normalization is
/// applied to the stored columns too, so legacy unnormalized rows match.
pub fn find_by_key(conn: &Connection, key: &ProduitKey) -> Result<Vec<Produit>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {COLUMNS} FROM produits
             WHERE UPPER(TRIM(type_produit)) = ?1
               AND UPPER(TRIM(marque)) = ?2
               AND UPPER(TRIM(modele)) = ?3
             ORDER BY id"
        ))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    let rows = stmt
        .query_map(params![key.type_produit, key.marque, key.modele], map_row)
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(|e| StorageError::SqliteError { message: e.to_string() })?);
    }
    Ok(result)
}

/// Conditional stock decrement. The guard is in the statement itself, so the
/// check and the write cannot be interleaved by another writer.
pub fn deduct_quantite(
    conn: &Connection,
    id: ProduitId,
    quantite: i64,
) -> Result<DeductOutcome, StorageError> {
    let mut stmt = conn
        .prepare_cached("UPDATE produits SET quantite = quantite - ?2 WHERE id = ?1 AND quantite >= ?2")
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    let changed = stmt
        .execute(params![id.0, quantite])
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    if changed > 0 {
        let new_quantite: i64 = conn
            .query_row("SELECT quantite FROM produits WHERE id = ?1", params![id.0], |row| {
                row.get(0)
            })
            .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
        return Ok(DeductOutcome::Deducted { new_quantite });
    }

    // No row updated: either the produit is gone or the stock is short.
    let available: Option<i64> = conn
        .query_row("SELECT quantite FROM produits WHERE id = ?1", params![id.0], |row| {
            row.get(0)
        })
        .optional()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    match available {
        Some(available) => Ok(DeductOutcome::Insufficient { available }),
        None => Ok(DeductOutcome::Missing),
    }
}
