use std::{collections::HashSet, fmt::Display, str::FromStr, time::SystemTime};

use serde::{Deserialize, Serialize};

#[derive(Debug, Hash, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Trusted,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Trusted => write!(f, "trusted"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "admin" => Ok(Role::Admin),
            "trusted" => Ok(Role::Trusted),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

pub trait TimeLimited {
    fn set_validity(&mut self, until: SystemTime);
    fn check_validity(&self) -> bool;
}

pub trait Authorization {
    fn has_role(&self, role: &Role) -> bool;

    fn has_any_role<'a, I>(&self, roles: I) -> bool
    where
        I: IntoIterator<Item = &'a Role>,
    {
        roles.into_iter().any(|role| self.has_role(role))
    }

    fn has_all_roles<'a, I>(&self, roles: I) -> bool
    where
        I: IntoIterator<Item = &'a Role>,
    {
        roles.into_iter().all(|role| self.has_role(role))
    }
}

/// Claim carried in API bearer token, `sub` is the user id
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiClaim {
    pub sub: String,
    pub exp: u64,
    pub roles: HashSet<Role>,
}

impl ApiClaim {
    pub fn new_expired<'a>(sub: impl Into<String>, roles: impl IntoIterator<Item = &'a Role>) -> Self {
        Self {
            sub: sub.into(),
            exp: 0,
            roles: roles.into_iter().copied().collect(),
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(&Role::Admin)
    }
}

impl Authorization for ApiClaim {
    fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }
}

fn unix_secs(time: SystemTime) -> u64 {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

impl TimeLimited for ApiClaim {
    fn set_validity(&mut self, until: SystemTime) {
        self.exp = unix_secs(until);
    }

    fn check_validity(&self) -> bool {
        self.exp > unix_secs(SystemTime::now())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_role() {
        let claim = ApiClaim {
            sub: "123".to_string(),
            exp: 1,
            roles: HashSet::from([Role::Admin]),
        };
        assert!(claim.has_role(&Role::Admin));
        assert!(!claim.has_role(&Role::Trusted));
        assert!(claim.has_any_role(&[Role::Admin, Role::Trusted]));
        assert!(!claim.has_all_roles(&[Role::Admin, Role::Trusted]));
        assert_eq!(claim.user_id(), Some(123));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("trusted".parse::<Role>(), Ok(Role::Trusted));
        assert!("librarian".parse::<Role>().is_err());
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn test_validity() {
        let mut claim = ApiClaim::new_expired("1", &[]);
        assert!(!claim.check_validity());
        claim.set_validity(SystemTime::now() + Duration::from_secs(60));
        assert!(claim.check_validity());
    }
}
