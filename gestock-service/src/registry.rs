//! User administration: registration and role management.

use std::sync::Arc;

use gestock_core::errors::GestockError;
use gestock_core::traits::RecordStore;
use gestock_core::types::identifiers::UserId;
use gestock_core::types::role::Role;
use gestock_core::types::time::now_epoch;
use gestock_core::types::user::{Registration, UserProfile};

use crate::auth::{AuthorizationGuard, Session};

/// Manages the `users` collection.
#[derive(Clone)]
pub struct UserRegistry {
    store: Arc<dyn RecordStore>,
    guard: AuthorizationGuard,
}

impl UserRegistry {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            guard: AuthorizationGuard::new(Arc::clone(&store)),
            store,
        }
    }

    /// Create the user document for a freshly-created identity. Fields are
    /// trimmed; the role always starts at `employe`.
    pub fn register(
        &self,
        uid: UserId,
        registration: &Registration,
    ) -> Result<UserProfile, GestockError> {
        let trimmed = registration.trimmed();
        if !trimmed.is_complete() {
            return Err(GestockError::validation(
                "nom, prenom, matricule and identifiant are required",
            ));
        }
        if self.store.get_user(&uid)?.is_some() {
            return Err(GestockError::validation(format!(
                "user {uid} is already registered"
            )));
        }
        let profile = UserProfile {
            id: uid,
            nom: trimmed.nom,
            prenom: trimmed.prenom,
            matricule: trimmed.matricule,
            entite: trimmed.entite,
            identifiant: trimmed.identifiant,
            role: Role::Employe,
            created_at: now_epoch(),
        };
        self.store.put_user(&profile)?;
        tracing::info!(user = %profile.id, "user registered");
        Ok(profile)
    }

    pub fn get(&self, id: &UserId) -> Result<Option<UserProfile>, GestockError> {
        Ok(self.store.get_user(id)?)
    }

    /// All users, for the administration view. Responsable only.
    pub fn list_users(&self, session: &Session) -> Result<Vec<UserProfile>, GestockError> {
        self.guard.require(session, &[Role::Responsable])?;
        Ok(self.store.list_users()?)
    }

    /// Change a user's role. Responsable only.
    pub fn change_role(
        &self,
        session: &Session,
        user_id: &UserId,
        new_role: Role,
    ) -> Result<(), GestockError> {
        self.guard.require(session, &[Role::Responsable])?;
        if !self.store.set_role(user_id, new_role)? {
            return Err(GestockError::not_found("user", user_id));
        }
        tracing::info!(user = %user_id, role = %new_role, "role changed");
        Ok(())
    }

    /// Remove a user document. Responsable only. The identity account is the
    /// identity provider's concern, not ours.
    pub fn delete_user(&self, session: &Session, user_id: &UserId) -> Result<(), GestockError> {
        self.guard.require(session, &[Role::Responsable])?;
        if !self.store.delete_user(user_id)? {
            return Err(GestockError::not_found("user", user_id));
        }
        tracing::info!(user = %user_id, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gestock_core::traits::test_helpers::MemoryStore;

    fn registry() -> UserRegistry {
        UserRegistry::new(Arc::new(MemoryStore::new()))
    }

    fn registration() -> Registration {
        Registration {
            nom: " Alaoui ".to_string(),
            prenom: "Sara".to_string(),
            matricule: " M123".to_string(),
            entite: "".to_string(),
            identifiant: "s.alaoui ".to_string(),
        }
    }

    #[test]
    fn register_trims_and_defaults_to_employe() {
        let registry = registry();
        let profile = registry
            .register(UserId::new("u1"), &registration())
            .unwrap();
        assert_eq!(profile.nom, "Alaoui");
        assert_eq!(profile.matricule, "M123");
        assert_eq!(profile.role, Role::Employe);
    }

    #[test]
    fn register_rejects_incomplete_form() {
        let registry = registry();
        let mut reg = registration();
        reg.matricule = "  ".to_string();
        let err = registry.register(UserId::new("u1"), &reg).unwrap_err();
        assert!(matches!(err, GestockError::Validation(_)));
    }

    #[test]
    fn register_rejects_duplicate_uid() {
        let registry = registry();
        registry
            .register(UserId::new("u1"), &registration())
            .unwrap();
        let err = registry
            .register(UserId::new("u1"), &registration())
            .unwrap_err();
        assert!(matches!(err, GestockError::Validation(_)));
    }

    #[test]
    fn role_management_requires_responsable() {
        let registry = registry();
        let employe = registry
            .register(UserId::new("u1"), &registration())
            .unwrap();

        let session = Session::for_user(employe.id.clone());
        let err = registry
            .change_role(&session, &employe.id, Role::Superviseur)
            .unwrap_err();
        assert!(matches!(err, GestockError::Permission(_)));
        assert!(matches!(
            registry.list_users(&session).unwrap_err(),
            GestockError::Permission(_)
        ));
        assert!(matches!(
            registry.delete_user(&session, &employe.id).unwrap_err(),
            GestockError::Permission(_)
        ));
    }
}
