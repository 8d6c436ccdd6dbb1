// Marketplace roles
//
// Roles travel inside session tokens and in API payloads as
// SCREAMING_SNAKE_CASE strings ("CLIENT", "FREELANCER", "ADMIN").

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Role of a marketplace account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Role {
    /// Posts tasks and books villas
    Client,
    /// Bids on and delivers tasks
    Freelancer,
    /// Operates the marketplace
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Client, Role::Freelancer, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "CLIENT",
            Role::Freelancer => "FREELANCER",
            Role::Admin => "ADMIN",
        }
    }

    /// Roles a visitor may pick for themselves at registration
    pub fn is_self_assignable(&self) -> bool {
        matches!(self, Role::Client | Role::Freelancer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CLIENT" => Ok(Role::Client),
            "FREELANCER" => Ok(Role::Freelancer),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("CLIENT".parse::<Role>().unwrap(), Role::Client);
        assert_eq!("freelancer".parse::<Role>().unwrap(), Role::Freelancer);
        assert_eq!(" Admin ".parse::<Role>().unwrap(), Role::Admin);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(
            serde_json::to_string(&Role::Freelancer).unwrap(),
            "\"FREELANCER\""
        );
        let role: Role = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert_eq!(Role::Client.to_string(), "CLIENT");
    }

    #[test]
    fn test_admin_is_not_self_assignable() {
        assert!(Role::Client.is_self_assignable());
        assert!(Role::Freelancer.is_self_assignable());
        assert!(!Role::Admin.is_self_assignable());
    }
}
