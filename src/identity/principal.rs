use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed role set understood by this client. The collaborator speaks
/// `ROLE_<NAME>` tags on the wire; required-role sets are built from these
/// constants so a typo in a guarded route fails at compile time instead of
/// silently never matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    User,
    Moderator,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Moderator, Role::Admin];

    /// Wire form as delivered by the collaborator (`ROLE_ADMIN` etc.).
    pub fn as_wire(&self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Moderator => "ROLE_MODERATOR",
            Role::Admin => "ROLE_ADMIN",
        }
    }

    /// Parse a wire tag. Case-insensitive; returns None on unknown tags so
    /// callers can drop them without failing the whole identity.
    pub fn from_wire(tag: &str) -> Option<Role> {
        let up = tag.trim().to_ascii_uppercase();
        Role::ALL.iter().copied().find(|r| r.as_wire() == up)
    }

    /// Bare-name matching: `"admin"` matches `ROLE_ADMIN`, any case.
    pub fn matches_name(&self, name: &str) -> bool {
        let want = format!("ROLE_{}", name.trim().to_ascii_uppercase());
        self.as_wire() == want
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("rol desconocido: {0}")]
pub struct RolDesconocido(pub String);

impl FromStr for Role {
    type Err = RolDesconocido;

    /// Accepts either the wire form or the bare name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let up = s.trim().to_ascii_uppercase();
        let wire = if up.starts_with("ROLE_") { up.clone() } else { format!("ROLE_{}", up) };
        Role::from_wire(&wire).ok_or(RolDesconocido(s.to_string()))
    }
}

/// Lossy ingest of collaborator role tags: unknown tags are dropped with a
/// warning instead of invalidating the identity.
pub fn roles_from_wire(tags: &[String]) -> BTreeSet<Role> {
    let mut out = BTreeSet::new();
    for t in tags {
        match Role::from_wire(t) {
            Some(r) => { out.insert(r); }
            None => tracing::warn!("ignorando rol desconocido del servidor: {}", t),
        }
    }
    out
}

pub fn roles_to_wire(roles: &BTreeSet<Role>) -> Vec<String> {
    roles.iter().map(|r| r.as_wire().to_string()).collect()
}

fn serialize_roles<S: Serializer>(roles: &BTreeSet<Role>, ser: S) -> Result<S::Ok, S::Error> {
    roles_to_wire(roles).serialize(ser)
}

fn deserialize_roles<'de, D: Deserializer<'de>>(de: D) -> Result<BTreeSet<Role>, D::Error> {
    let raw = Vec::<String>::deserialize(de)?;
    Ok(roles_from_wire(&raw))
}

/// The authenticated user's profile plus bearer token, exactly as the
/// signin endpoint delivers it and as it is persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(serialize_with = "serialize_roles", deserialize_with = "deserialize_roles")]
    pub roles: BTreeSet<Role>,
    #[serde(rename = "accessToken")]
    pub token: String,
}

impl UserIdentity {
    /// An identity is either fully present or not usable at all; a persisted
    /// record missing its token or username loads as absent.
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.email.is_empty() && !self.token.is_empty()
    }

    /// `has_role("admin")` is true iff the role set contains `ROLE_ADMIN`.
    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|r| r.matches_name(name))
    }
}
