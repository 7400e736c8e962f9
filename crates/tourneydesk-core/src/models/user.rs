use std::fmt;

use serde::{Deserialize, Serialize};

use super::entity::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Viewer,
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Whether this role may create, update or delete records
    pub fn can_edit(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Manager => write!(f, "manager"),
            Role::Viewer => write!(f, "viewer"),
            Role::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_role_parses() {
        let user: User =
            serde_json::from_str(r#"{"id":"u1","username":"ref","role":"referee"}"#).unwrap();
        assert_eq!(user.role, Role::Unknown);
        assert!(!user.role.can_edit());
    }
}
