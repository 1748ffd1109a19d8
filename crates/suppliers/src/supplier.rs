use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockdesk_core::{DomainError, DomainResult, SupplierId};

/// Contact details for a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// A supplier of goods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub tax_id: Option<String>,
    pub contact: ContactInfo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Supplier {
    pub fn new(id: SupplierId, name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        let now = Utc::now();
        Ok(Self {
            id,
            name,
            tax_id: None,
            contact: ContactInfo::default(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_tax_id(mut self, tax_id: impl Into<String>) -> Self {
        self.tax_id = Some(tax_id.into());
        self
    }

    pub fn with_contact(mut self, contact: ContactInfo) -> Self {
        self.contact = contact;
        self
    }

    /// Apply an edit; `None` fields are left untouched.
    pub fn update(
        &mut self,
        name: Option<String>,
        tax_id: Option<String>,
        contact: Option<ContactInfo>,
    ) -> DomainResult<()> {
        if let Some(name) = name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name cannot be empty"));
            }
            self.name = name;
        }
        if let Some(tax_id) = tax_id {
            self.tax_id = Some(tax_id);
        }
        if let Some(contact) = contact {
            self.contact = contact;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}
