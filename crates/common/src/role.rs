use serde::{Deserialize, Serialize};

/// Role claim carried by a verified bearer token.
///
/// The identity service is the single source of truth for roles; nothing in
/// this system stores or synchronizes a second copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// A storefront customer.
    Cliente,
    /// A back-office administrator.
    Admin,
}

impl Role {
    /// Returns the role name as used in token claims.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Cliente => "Cliente",
            Role::Admin => "Admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cliente" => Ok(Role::Cliente),
            "Admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Error returned when parsing an unrecognized role claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl std::fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_roundtrip() {
        assert_eq!("Cliente".parse::<Role>().unwrap(), Role::Cliente);
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::Admin.to_string(), "Admin");
    }

    #[test]
    fn test_unknown_role_rejected() {
        let err = "Superuser".parse::<Role>().unwrap_err();
        assert_eq!(err.0, "Superuser");
    }
}
