//! Roles and capabilities (RBAC).
//!
//! Roles are a closed set modeled as a tagged variant, with one
//! capability-set lookup instead of scattered per-role boolean checks.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role granted to an authenticated user.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access to the dashboard.
    Admin,
    /// Day-to-day operator: records movements, reads reports.
    Employee,
    /// Diagnostics superuser (full access, intended for support).
    Developer,
    /// Business owner; admin rights that cannot be revoked in-app.
    Master,
}

/// A discrete thing a role is allowed to do.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ManageCatalog,
    RecordMovements,
    ManageSuppliers,
    ViewReports,
    UploadImages,
    ManageUsers,
}

const ALL_CAPABILITIES: &[Capability] = &[
    Capability::ManageCatalog,
    Capability::RecordMovements,
    Capability::ManageSuppliers,
    Capability::ViewReports,
    Capability::UploadImages,
    Capability::ManageUsers,
];

const EMPLOYEE_CAPABILITIES: &[Capability] = &[
    Capability::RecordMovements,
    Capability::ViewReports,
    Capability::UploadImages,
];

impl Role {
    /// The capability set granted by this role.
    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            Role::Admin | Role::Developer | Role::Master => ALL_CAPABILITIES,
            Role::Employee => EMPLOYEE_CAPABILITIES,
        }
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
            Role::Developer => "developer",
            Role::Master => "master",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            "developer" => Ok(Role::Developer),
            "master" => Ok(Role::Master),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ManageCatalog => "manage_catalog",
            Capability::RecordMovements => "record_movements",
            Capability::ManageSuppliers => "manage_suppliers",
            Capability::ViewReports => "view_reports",
            Capability::UploadImages => "upload_images",
            Capability::ManageUsers => "manage_users",
        }
    }
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employee_cannot_manage_catalog() {
        assert!(!Role::Employee.can(Capability::ManageCatalog));
        assert!(Role::Employee.can(Capability::RecordMovements));
    }

    #[test]
    fn master_keeps_full_rights() {
        for cap in ALL_CAPABILITIES {
            assert!(Role::Master.can(*cap));
        }
    }

    #[test]
    fn role_parses_from_wire_form() {
        assert_eq!("developer".parse::<Role>().unwrap(), Role::Developer);
        assert!("superuser".parse::<Role>().is_err());
    }
}
