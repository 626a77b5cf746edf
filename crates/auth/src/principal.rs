use serde::{Deserialize, Serialize};

use blogdesk_core::UserId;

use crate::{Role, lenient};

/// The signed-in user as cached on this machine.
///
/// Same wire shape as the backend's user DTO:
/// `{ id, firstName, lastName, email, roles: [{ id, name, authorities: [{ id, name }] }] }`.
///
/// Decoding is lenient: a field with the wrong shape falls back to its
/// default, and a `roles` value that is not an array reads as "no roles".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,

    #[serde(default, deserialize_with = "lenient::or_default")]
    pub first_name: String,

    #[serde(default, deserialize_with = "lenient::or_default")]
    pub last_name: String,

    #[serde(default, deserialize_with = "lenient::or_default")]
    pub email: String,

    #[serde(default, deserialize_with = "lenient::seq")]
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            email: email.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }

    /// Parse a persisted record.
    ///
    /// Returns `None` for anything that is not a JSON object; never errors.
    pub fn from_record(raw: &str) -> Option<Self> {
        match serde_json::from_str::<serde_json::Value>(raw).ok()? {
            value @ serde_json::Value::Object(_) => serde_json::from_value(value).ok(),
            _ => None,
        }
    }

    /// Serialize to the persisted record format.
    pub fn to_record(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// "First Last", falling back to the email when both names are empty.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }

    /// Whether this principal is the user with the given id.
    pub fn is(&self, user_id: UserId) -> bool {
        self.id == Some(user_id)
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|role| role.name == name)
    }
}
