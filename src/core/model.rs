//! Data model for provisioning runs: users, boards, identities and roles

use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Remote ids are GraphQL `ID`s, which arrive as either a JSON string or number
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Str(String),
        Num(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Str(s) => s,
        RawId::Num(n) => n.to_string(),
    })
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                deserialize_id(deserializer).map(Self)
            }
        }
    };
}

opaque_id!(
    /// Opaque user identifier owned by the remote directory
    UserId
);

opaque_id!(
    /// Opaque board identifier
    BoardId
);

/// An account in the remote directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    /// Case-insensitive lookup key; some accounts have none
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
}

impl User {
    /// Label used in outcome lists: the email, or the name for accounts without one
    pub fn label(&self) -> &str {
        if self.email.is_empty() {
            &self.name
        } else {
            &self.email
        }
    }

    /// Case-insensitive email comparison
    pub fn has_email(&self, email: &str) -> bool {
        !self.email.is_empty() && emails_match(&self.email, email)
    }
}

/// Compare two emails the way input lists are normalized (full Unicode lowercase)
pub(crate) fn emails_match(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A board users can be added to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
}

/// A user created by an invitation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InvitedUser {
    pub id: UserId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
}

/// One entry of the invite list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityRequest {
    /// A user already picked from the directory
    ExistingUserRef(User),
    /// A normalized email that may or may not match an account
    EmailString(String),
}

impl IdentityRequest {
    /// Label this identity is reported under
    pub fn label(&self) -> &str {
        match self {
            IdentityRequest::ExistingUserRef(user) => user.label(),
            IdentityRequest::EmailString(email) => email,
        }
    }
}

/// Role given to every newly invited user in one run
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum RoleSelection {
    #[default]
    Guest,
    Member,
}

impl RoleSelection {
    /// Value of the remote `UserRole` enum
    pub fn as_api_value(&self) -> &'static str {
        match self {
            RoleSelection::Guest => "GUEST",
            RoleSelection::Member => "MEMBER",
        }
    }
}

impl fmt::Display for RoleSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleSelection::Guest => write!(f, "guest"),
            RoleSelection::Member => write!(f, "member"),
        }
    }
}

impl FromStr for RoleSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "guest" => Ok(RoleSelection::Guest),
            "member" => Ok(RoleSelection::Member),
            _ => Err(format!("Unknown role: {} (expected guest or member)", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_accept_strings_and_numbers() {
        let user: User =
            serde_json::from_str(r#"{"id": 42, "name": "Ada", "email": "ada@x.com"}"#).unwrap();
        assert_eq!(user.id, UserId::new("42"));

        let board: Board = serde_json::from_str(r#"{"id": "1234", "name": "Roadmap"}"#).unwrap();
        assert_eq!(board.id.as_str(), "1234");
    }

    #[test]
    fn test_null_email_becomes_empty() {
        let user: User = serde_json::from_str(r#"{"id": "7", "name": "Bot", "email": null}"#).unwrap();
        assert!(user.email.is_empty());
        assert_eq!(user.label(), "Bot");
        assert!(!user.has_email(""));
    }

    #[test]
    fn test_has_email_ignores_case() {
        let user = User {
            id: UserId::new("1"),
            name: "Ada".to_string(),
            email: "Ada@Example.com".to_string(),
        };
        assert!(user.has_email("ada@example.com"));
        assert!(!user.has_email("ada@example.org"));
    }

    #[test]
    fn test_has_email_ignores_non_ascii_case() {
        let user = User {
            id: UserId::new("1"),
            name: "Éva".to_string(),
            email: "Éva@x.com".to_string(),
        };
        assert!(user.has_email("éva@x.com"));
        assert!(user.has_email("ÉVA@X.COM"));
        assert!(!user.has_email("eva@x.com"));
    }

    #[test]
    fn test_role_parsing_and_display() {
        assert_eq!("Guest".parse::<RoleSelection>(), Ok(RoleSelection::Guest));
        assert_eq!("member".parse::<RoleSelection>(), Ok(RoleSelection::Member));
        assert!("admin".parse::<RoleSelection>().is_err());
        assert_eq!(RoleSelection::default(), RoleSelection::Guest);
        assert_eq!(RoleSelection::Member.to_string(), "member");
        assert_eq!(RoleSelection::Member.as_api_value(), "MEMBER");
    }

    #[test]
    fn test_identity_label() {
        let user = User {
            id: UserId::new("1"),
            name: "Ada".to_string(),
            email: String::new(),
        };
        assert_eq!(IdentityRequest::ExistingUserRef(user).label(), "Ada");
        assert_eq!(
            IdentityRequest::EmailString("a@x.com".to_string()).label(),
            "a@x.com"
        );
    }
}
