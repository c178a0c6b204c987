use serde::{Deserialize, Serialize};

use stockledger_core::SupplierId;

/// Supplier master data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
}

impl Supplier {
    pub fn new(id: SupplierId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            contact_person: None,
            email: None,
        }
    }

    pub fn with_contact(mut self, contact_person: impl Into<String>) -> Self {
        self.contact_person = Some(contact_person.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Display name with the contact person when one is on file.
    pub fn display_name(&self) -> String {
        match &self.contact_person {
            Some(contact) => format!("{} ({contact})", self.name),
            None => self.name.clone(),
        }
    }
}
