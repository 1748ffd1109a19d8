//! Capability check at the request boundary.
//!
//! The API layer enforces these requirements before touching services.

use thiserror::Error;

use stockdesk_core::UserId;

use crate::{Capability, Role};

/// A fully resolved principal for authorization decisions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing capability '{0}'")]
    Forbidden(Capability),
}

/// Authorize a principal for one capability.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: Capability) -> Result<(), AuthzError> {
    if principal.role.can(required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_passes_every_check() {
        let p = Principal {
            user_id: UserId::new(),
            role: Role::Admin,
        };
        assert!(authorize(&p, Capability::ManageUsers).is_ok());
    }

    #[test]
    fn employee_is_denied_catalog_management() {
        let p = Principal {
            user_id: UserId::new(),
            role: Role::Employee,
        };
        assert_eq!(
            authorize(&p, Capability::ManageCatalog),
            Err(AuthzError::Forbidden(Capability::ManageCatalog))
        );
    }
}
