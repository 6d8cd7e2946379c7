//! Schema migrations, tracked via PRAGMA user_version.

use rusqlite::Connection;

use gestock_core::errors::StorageError;

use crate::connection::sqe;

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// v1 schema — the three record collections.
///
/// The produit triple is deliberately NOT unique: legacy data may contain
/// duplicate keys, and resolution surfaces them as an error instead of
/// silently picking one.
const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    nom TEXT NOT NULL,
    prenom TEXT NOT NULL,
    matricule TEXT NOT NULL,
    entite TEXT NOT NULL DEFAULT '',
    identifiant TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'employe',
    created_at INTEGER NOT NULL
) STRICT;

CREATE TABLE IF NOT EXISTS produits (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    type_produit TEXT NOT NULL,
    marque TEXT NOT NULL,
    modele TEXT NOT NULL,
    quantite INTEGER NOT NULL DEFAULT 0 CHECK (quantite >= 0),
    date_insertion TEXT NOT NULL DEFAULT '',
    numero_marche TEXT NOT NULL DEFAULT '',
    seuil_critique INTEGER NOT NULL DEFAULT 0
) STRICT;

CREATE INDEX IF NOT EXISTS idx_produits_key
    ON produits(type_produit, marque, modele);

CREATE TABLE IF NOT EXISTS demandes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nom TEXT NOT NULL,
    prenom TEXT NOT NULL,
    matricule TEXT NOT NULL,
    entite TEXT NOT NULL DEFAULT '',
    produit_id INTEGER NOT NULL,
    type_produit TEXT NOT NULL,
    marque TEXT NOT NULL,
    modele TEXT NOT NULL,
    quantite INTEGER NOT NULL CHECK (quantite > 0),
    date INTEGER NOT NULL,
    statut TEXT NOT NULL DEFAULT 'en_attente',
    demandeur_id TEXT NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_demandes_demandeur ON demandes(demandeur_id);
CREATE INDEX IF NOT EXISTS idx_demandes_statut ON demandes(statut);
"#;

/// Read the schema version.
pub fn get_schema_version(conn: &Connection) -> Result<u32, StorageError> {
    let version: i64 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(sqe)?;
    Ok(version as u32)
}

/// Apply all pending migrations. Idempotent.
pub fn initialize(conn: &Connection) -> Result<(), StorageError> {
    let version = get_schema_version(conn)?;
    if version >= SCHEMA_VERSION {
        return Ok(());
    }
    if version < 1 {
        conn.execute_batch(SCHEMA_V1)
            .map_err(|e| StorageError::MigrationFailed {
                version: 1,
                message: e.to_string(),
            })?;
    }
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)
        .map_err(|e| StorageError::MigrationFailed {
            version: SCHEMA_VERSION,
            message: e.to_string(),
        })?;
    tracing::info!(from = version, to = SCHEMA_VERSION, "schema migrated");
    Ok(())
}
