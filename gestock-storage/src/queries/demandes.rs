//! demandes table queries.

use rusqlite::{params, Connection, OptionalExtension};

use gestock_core::errors::StorageError;
use gestock_core::types::demande::{Demande, NouvelleDemande, Statut};
use gestock_core::types::identifiers::{DemandeId, UserId};
use gestock_core::types::identifiers::ProduitId;

const COLUMNS: &str = "id, nom, prenom, matricule, entite, produit_id, type_produit, marque, \
                       modele, quantite, date, statut, demandeur_id";

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Demande> {
    Ok(Demande {
        id: DemandeId(row.get(0)?),
        nom: row.get(1)?,
        prenom: row.get(2)?,
        matricule: row.get(3)?,
        entite: row.get(4)?,
        produit_id: ProduitId(row.get(5)?),
        type_produit: row.get(6)?,
        marque: row.get(7)?,
        modele: row.get(8)?,
        quantite: row.get(9)?,
        date: row.get(10)?,
        statut: Statut::parse(&row.get::<_, String>(11)?).unwrap_or(Statut::EnAttente),
        demandeur_id: UserId::new(row.get::<_, String>(12)?),
    })
}

pub fn insert_demande(conn: &Connection, d: &NouvelleDemande) -> Result<DemandeId, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO demandes
             (nom, prenom, matricule, entite, produit_id, type_produit, marque, modele,
              quantite, date, statut, demandeur_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 'en_attente', ?11)",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    stmt.execute(params![
        d.nom,
        d.prenom,
        d.matricule,
        d.entite,
        d.produit_id.0,
        d.type_produit,
        d.marque,
        d.modele,
        d.quantite,
        d.date,
        d.demandeur_id.as_str(),
    ])
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(DemandeId(conn.last_insert_rowid()))
}

pub fn get_demande(conn: &Connection, id: DemandeId) -> Result<Option<Demande>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!("SELECT {COLUMNS} FROM demandes WHERE id = ?1"))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    stmt.query_row(params![id.0], map_row)
        .optional()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

fn collect(
    rows: rusqlite::MappedRows<'_, impl FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<Demande>>,
) -> Result<Vec<Demande>, StorageError> {
    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(|e| StorageError::SqliteError { message: e.to_string() })?);
    }
    Ok(result)
}

pub fn list_demandes(conn: &Connection) -> Result<Vec<Demande>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!("SELECT {COLUMNS} FROM demandes ORDER BY date DESC, id DESC"))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    let rows = stmt
        .query_map([], map_row)
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    collect(rows)
}

pub fn list_by_demandeur(
    conn: &Connection,
    demandeur: &UserId,
) -> Result<Vec<Demande>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {COLUMNS} FROM demandes WHERE demandeur_id = ?1 ORDER BY date DESC, id DESC"
        ))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    let rows = stmt
        .query_map(params![demandeur.as_str()], map_row)
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    collect(rows)
}

pub fn list_by_statut(conn: &Connection, statut: Statut) -> Result<Vec<Demande>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {COLUMNS} FROM demandes WHERE statut = ?1 ORDER BY date DESC, id DESC"
        ))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    let rows = stmt
        .query_map(params![statut.as_str()], map_row)
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    collect(rows)
}

/// Flip a pending demande to a terminal statut. Returns false when the row is
/// missing or already decided; nothing is written then.
pub fn mark_decided(
    conn: &Connection,
    id: DemandeId,
    statut: Statut,
) -> Result<bool, StorageError> {
    let mut stmt = conn
        .prepare_cached("UPDATE demandes SET statut = ?2 WHERE id = ?1 AND statut = 'en_attente'")
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    let changed = stmt
        .execute(params![id.0, statut.as_str()])
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(changed > 0)
}
