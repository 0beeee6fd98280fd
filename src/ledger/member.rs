use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque participant identifier issued by the external identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct MemberId(pub String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemberId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Role used only to resolve the `host_all` / `guest_all` split policies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Host,
    Guest,
}

impl MemberRole {
    pub fn label(&self) -> &'static str {
        match self {
            MemberRole::Host => "host",
            MemberRole::Guest => "guest",
        }
    }
}

/// A ledger participant. Members are never removed so history stays attributable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub role: MemberRole,
}

impl Member {
    pub fn new(name: impl Into<String>, role: MemberRole) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }
}

/// Membership keyed by id; ordered so every fold over it is deterministic.
pub type Members = BTreeMap<MemberId, Member>;

impl From<String> for MemberId {
    fn from(value: String) -> Self {
        Self(value)
    }
}
