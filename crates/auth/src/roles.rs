use serde::{Deserialize, Serialize};

use blogdesk_core::{AuthorityId, RoleId};

use crate::{Authority, lenient};

/// One authority entry inside a role, as the backend ships it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityGrant {
    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub id: Option<AuthorityId>,
    pub name: Authority,
}

impl AuthorityGrant {
    pub fn new(name: Authority) -> Self {
        Self { id: None, name }
    }
}

/// A named bundle of authorities.
///
/// A principal carries materialized copies of its roles; changing a role on
/// the backend is not visible here until the principal record is rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Role {
    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub id: Option<RoleId>,

    #[serde(default, deserialize_with = "lenient::or_default")]
    pub name: String,

    #[serde(default, deserialize_with = "lenient::seq")]
    pub authorities: Vec<AuthorityGrant>,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            authorities: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: RoleId) -> Self {
        self.id = Some(id);
        self
    }

    /// Add an authority to this role (builder style).
    pub fn grant(mut self, authority: Authority) -> Self {
        self.authorities.push(AuthorityGrant::new(authority));
        self
    }

    /// Names of the authorities this role grants, duplicates included.
    pub fn authority_names(&self) -> impl Iterator<Item = &Authority> {
        self.authorities.iter().map(|grant| &grant.name)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_backend_shape() {
        let role: Role = serde_json::from_str(
            r#"{
                "id": "8b1c0c2e-8a7f-4f49-9d38-3c4d0c1e2f3a",
                "name": "ADMIN",
                "authorities": [
                    {"id": "1e2d3c4b-5a69-4788-9a0b-1c2d3e4f5a6b", "name": "USER_READ"},
                    {"id": "2e2d3c4b-5a69-4788-9a0b-1c2d3e4f5a6b", "name": "USER_MODIFY"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(role.name, "ADMIN");
        assert!(role.id.is_some());
        let names: Vec<_> = role.authority_names().map(Authority::as_str).collect();
        assert_eq!(names, ["USER_READ", "USER_MODIFY"]);
    }

    #[test]
    fn skips_authority_entries_without_a_name() {
        let role: Role = serde_json::from_str(
            r#"{"name": "USER", "authorities": [{"id": null}, {"name": 7}, {"name": "BLOGPOST_CREATE"}]}"#,
        )
        .unwrap();

        assert_eq!(role.authorities.len(), 1);
        assert_eq!(role.authorities[0].name, Authority::BLOGPOST_CREATE);
    }

    #[test]
    fn non_array_authorities_read_as_empty() {
        let role: Role = serde_json::from_str(r#"{"name": "USER", "authorities": "oops"}"#).unwrap();
        assert!(role.authorities.is_empty());

        let role: Role = serde_json::from_str(r#"{"name": "USER"}"#).unwrap();
        assert!(role.authorities.is_empty());
    }

    #[test]
    fn malformed_role_id_is_dropped() {
        let role: Role = serde_json::from_str(r#"{"id": "nope", "name": "USER"}"#).unwrap();
        assert_eq!(role.id, None);
    }
}
