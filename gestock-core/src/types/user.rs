//! User profile documents (the `users` collection).

use serde::{Deserialize, Serialize};

use crate::types::identifiers::UserId;
use crate::types::role::Role;

/// A user document. Created at registration; only the role is mutated
/// afterwards, by a responsable. Deletion exists as an administrative action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub nom: String,
    pub prenom: String,
    /// Employee id.
    pub matricule: String,
    /// Department.
    pub entite: String,
    /// Login name used with the identity provider.
    pub identifiant: String,
    pub role: Role,
    pub created_at: i64,
}

/// Registration form input, before trimming and validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    pub nom: String,
    pub prenom: String,
    pub matricule: String,
    pub entite: String,
    pub identifiant: String,
}

impl Registration {
    /// Trim every text field, matching the registration form behavior.
    pub fn trimmed(&self) -> Registration {
        Registration {
            nom: self.nom.trim().to_string(),
            prenom: self.prenom.trim().to_string(),
            matricule: self.matricule.trim().to_string(),
            entite: self.entite.trim().to_string(),
            identifiant: self.identifiant.trim().to_string(),
        }
    }

    /// All mandatory fields present. `entite` is optional at registration.
    pub fn is_complete(&self) -> bool {
        !self.nom.is_empty()
            && !self.prenom.is_empty()
            && !self.matricule.is_empty()
            && !self.identifiant.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trimmed_strips_whitespace() {
        let reg = Registration {
            nom: "  Alaoui ".to_string(),
            prenom: " Sara".to_string(),
            matricule: "M123 ".to_string(),
            entite: "  ".to_string(),
            identifiant: " s.alaoui ".to_string(),
        };
        let t = reg.trimmed();
        assert_eq!(t.nom, "Alaoui");
        assert_eq!(t.prenom, "Sara");
        assert_eq!(t.matricule, "M123");
        assert_eq!(t.entite, "");
        assert_eq!(t.identifiant, "s.alaoui");
        assert!(t.is_complete());
    }

    #[test]
    fn incomplete_without_matricule() {
        let reg = Registration {
            nom: "Alaoui".to_string(),
            prenom: "Sara".to_string(),
            identifiant: "s.alaoui".to_string(),
            ..Registration::default()
        };
        assert!(!reg.is_complete());
    }
}
