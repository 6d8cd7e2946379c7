//! users table queries.

use rusqlite::{params, Connection, OptionalExtension};

use gestock_core::errors::StorageError;
use gestock_core::types::identifiers::UserId;
use gestock_core::types::role::Role;
use gestock_core::types::user::UserProfile;

const COLUMNS: &str = "id, nom, prenom, matricule, entite, identifiant, role, created_at";

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserProfile> {
    Ok(UserProfile {
        id: UserId::new(row.get::<_, String>(0)?),
        nom: row.get(1)?,
        prenom: row.get(2)?,
        matricule: row.get(3)?,
        entite: row.get(4)?,
        identifiant: row.get(5)?,
        // Unknown stored roles fall back to the least-privileged one.
        role: Role::parse(&row.get::<_, String>(6)?).unwrap_or(Role::Employe),
        created_at: row.get(7)?,
    })
}

pub fn upsert_user(conn: &Connection, user: &UserProfile) -> Result<(), StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO users (id, nom, prenom, matricule, entite, identifiant, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                 nom = excluded.nom,
                 prenom = excluded.prenom,
                 matricule = excluded.matricule,
                 entite = excluded.entite,
                 identifiant = excluded.identifiant,
                 role = excluded.role",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    stmt.execute(params![
        user.id.as_str(),
        user.nom,
        user.prenom,
        user.matricule,
        user.entite,
        user.identifiant,
        user.role.as_str(),
        user.created_at,
    ])
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: &UserId) -> Result<Option<UserProfile>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!("SELECT {COLUMNS} FROM users WHERE id = ?1"))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    stmt.query_row(params![id.as_str()], map_row)
        .optional()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

pub fn list_users(conn: &Connection) -> Result<Vec<UserProfile>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!("SELECT {COLUMNS} FROM users ORDER BY nom, prenom"))
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

/// Returns false when no such user exists.
pub fn set_role(conn: &Connection, id: &UserId, role: Role) -> Result<bool, StorageError> {
    let mut stmt = conn
        .prepare_cached("UPDATE users SET role = ?2 WHERE id = ?1")
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    let changed = stmt
        .execute(params![id.as_str(), role.as_str()])
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(changed > 0)
}

/// Returns false when no such user exists.
pub fn delete_user(conn: &Connection, id: &UserId) -> Result<bool, StorageError> {
    let mut stmt = conn
        .prepare_cached("DELETE FROM users WHERE id = ?1")
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    let changed = stmt
        .execute(params![id.as_str()])
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(changed > 0)
}
