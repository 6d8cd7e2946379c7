//! User roles. The role is the sole authorization attribute.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role assigned to a user document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Submits demandes and sees their own history.
    Employe,
    /// Decides demandes, manages produits, users, and roles.
    Responsable,
    /// Read-only live view of the stock.
    Superviseur,
}

impl Role {
    /// Stable string form stored in the `users` table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employe => "employe",
            Role::Responsable => "responsable",
            Role::Superviseur => "superviseur",
        }
    }

    /// Parse the stored string form. Unknown strings map to `None`.
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "employe" => Some(Role::Employe),
            "responsable" => Some(Role::Responsable),
            "superviseur" => Some(Role::Superviseur),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
