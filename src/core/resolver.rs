//! Directory resolution: map an identity request to a user id
//!
//! Existing user references resolve directly. Emails are matched
//! case-insensitively against a point-in-time directory snapshot; unmatched
//! emails are invited one at a time with the run's role.

use thiserror::Error;
use tracing::{debug, warn};

use crate::core::api::{ApiError, BoardApi};
use crate::core::model::{
    emails_match, IdentityRequest, InvitedUser, RoleSelection, User, UserId,
};

/// How an identity came to have a user id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionKind {
    /// Already present in the directory (or selected from it)
    Existing,
    /// Created by an invitation during this run
    Invited,
}

/// A resolved identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub user_id: UserId,
    pub kind: ResolutionKind,
}

/// An email that could be neither matched nor invited
#[derive(Debug, Error)]
pub enum ResolutionFailure {
    #[error("Invitation for {email} failed: {source}")]
    InviteFailed {
        email: String,
        #[source]
        source: ApiError,
    },

    #[error("Invitation for {email} returned no user")]
    NoUserReturned { email: String },

    #[error("Invitation for {email} returned {count} users and none matches")]
    Ambiguous { email: String, count: usize },
}

impl ResolutionFailure {
    pub fn email(&self) -> &str {
        match self {
            ResolutionFailure::InviteFailed { email, .. }
            | ResolutionFailure::NoUserReturned { email }
            | ResolutionFailure::Ambiguous { email, .. } => email,
        }
    }
}

/// Resolves identities against one directory snapshot
pub struct DirectoryResolver<'a, A: BoardApi> {
    api: &'a A,
    snapshot: &'a [User],
    role: RoleSelection,
}

impl<'a, A: BoardApi> DirectoryResolver<'a, A> {
    pub fn new(api: &'a A, snapshot: &'a [User], role: RoleSelection) -> Self {
        Self {
            api,
            snapshot,
            role,
        }
    }

    /// Resolve one identity, inviting it if the snapshot has no match
    pub fn resolve(&self, identity: &IdentityRequest) -> Result<Resolution, ResolutionFailure> {
        match identity {
            IdentityRequest::ExistingUserRef(user) => Ok(Resolution {
                user_id: user.id.clone(),
                kind: ResolutionKind::Existing,
            }),
            IdentityRequest::EmailString(email) => {
                if let Some(user) = self.lookup(email) {
                    debug!(email = %email, user_id = %user.id, "matched existing account");
                    return Ok(Resolution {
                        user_id: user.id.clone(),
                        kind: ResolutionKind::Existing,
                    });
                }
                self.invite(email).map(|user_id| Resolution {
                    user_id,
                    kind: ResolutionKind::Invited,
                })
            }
        }
    }

    /// Find an account by email in the snapshot
    pub fn lookup(&self, email: &str) -> Option<&'a User> {
        self.snapshot.iter().find(|u| u.has_email(email))
    }

    fn invite(&self, email: &str) -> Result<UserId, ResolutionFailure> {
        debug!(email = %email, role = %self.role, "inviting");

        let invited = self
            .api
            .invite_users(&[email.to_string()], self.role)
            .map_err(|source| {
                warn!(email = %email, error = %source, "invitation failed");
                ResolutionFailure::InviteFailed {
                    email: email.to_string(),
                    source,
                }
            })?;

        pick_invited(email, invited)
    }
}

/// Choose the created user for `email` from an invitation response
fn pick_invited(email: &str, mut invited: Vec<InvitedUser>) -> Result<UserId, ResolutionFailure> {
    if let Some(pos) = invited
        .iter()
        .position(|u| !u.email.is_empty() && emails_match(&u.email, email))
    {
        return Ok(invited.swap_remove(pos).id);
    }

    match invited.len() {
        0 => {
            warn!(email = %email, "invitation returned no user");
            Err(ResolutionFailure::NoUserReturned {
                email: email.to_string(),
            })
        }
        1 => Ok(invited.remove(0).id),
        count => {
            warn!(email = %email, count, "invitation response is ambiguous");
            Err(ResolutionFailure::Ambiguous {
                email: email.to_string(),
                count,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::api::testing::{user, Call, FakeApi};

    #[test]
    fn test_existing_ref_skips_directory() {
        let api = FakeApi::default();
        let resolver = DirectoryResolver::new(&api, &[], RoleSelection::Guest);
        let identity = IdentityRequest::ExistingUserRef(user("u1", "Ada", "ada@x.com"));

        let resolution = resolver.resolve(&identity).unwrap();
        assert_eq!(resolution.user_id, UserId::new("u1"));
        assert_eq!(resolution.kind, ResolutionKind::Existing);
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_matching_email_never_invites() {
        let api = FakeApi::default();
        let snapshot = vec![user("u1", "Ada", "Ada@X.com")];
        let resolver = DirectoryResolver::new(&api, &snapshot, RoleSelection::Guest);

        let resolution = resolver
            .resolve(&IdentityRequest::EmailString("ada@x.com".to_string()))
            .unwrap();
        assert_eq!(resolution.user_id, UserId::new("u1"));
        assert_eq!(resolution.kind, ResolutionKind::Existing);
        assert_eq!(api.invite_count(), 0);
    }

    #[test]
    fn test_non_ascii_email_matches_directory() {
        let api = FakeApi::default();
        let snapshot = vec![user("u1", "Éva", "Éva@x.com")];
        let resolver = DirectoryResolver::new(&api, &snapshot, RoleSelection::Guest);

        let email = crate::core::parse_email_list("Éva@x.com").remove(0);
        let resolution = resolver
            .resolve(&IdentityRequest::EmailString(email))
            .unwrap();
        assert_eq!(resolution.user_id, UserId::new("u1"));
        assert_eq!(resolution.kind, ResolutionKind::Existing);
        assert_eq!(api.invite_count(), 0);
    }

    #[test]
    fn test_unmatched_email_is_invited_with_role() {
        let api = FakeApi::default();
        let resolver = DirectoryResolver::new(&api, &[], RoleSelection::Member);

        let resolution = resolver
            .resolve(&IdentityRequest::EmailString("new@x.com".to_string()))
            .unwrap();
        assert_eq!(resolution.kind, ResolutionKind::Invited);
        assert_eq!(resolution.user_id, UserId::new("new-1"));
        assert_eq!(
            api.calls(),
            vec![Call::Invite("new@x.com".to_string(), RoleSelection::Member)]
        );
    }

    #[test]
    fn test_failed_invite_carries_email() {
        let mut api = FakeApi::default();
        api.failing_invites.insert("bad@x.com".to_string());
        let resolver = DirectoryResolver::new(&api, &[], RoleSelection::Guest);

        let err = resolver
            .resolve(&IdentityRequest::EmailString("bad@x.com".to_string()))
            .unwrap_err();
        assert!(matches!(err, ResolutionFailure::InviteFailed { .. }));
        assert_eq!(err.email(), "bad@x.com");
    }

    #[test]
    fn test_empty_invite_response_fails() {
        let mut api = FakeApi::default();
        api.empty_invites.insert("ghost@x.com".to_string());
        let resolver = DirectoryResolver::new(&api, &[], RoleSelection::Guest);

        let err = resolver
            .resolve(&IdentityRequest::EmailString("ghost@x.com".to_string()))
            .unwrap_err();
        assert!(matches!(err, ResolutionFailure::NoUserReturned { .. }));
    }

    #[test]
    fn test_pick_invited_prefers_matching_email() {
        let invited = vec![
            InvitedUser {
                id: UserId::new("1"),
                email: "other@x.com".to_string(),
            },
            InvitedUser {
                id: UserId::new("2"),
                email: "A@X.com".to_string(),
            },
        ];
        assert_eq!(pick_invited("a@x.com", invited).unwrap(), UserId::new("2"));

        let invited = vec![
            InvitedUser {
                id: UserId::new("1"),
                email: "other@x.com".to_string(),
            },
            InvitedUser {
                id: UserId::new("2"),
                email: "Éva@X.com".to_string(),
            },
        ];
        assert_eq!(pick_invited("éva@x.com", invited).unwrap(), UserId::new("2"));
    }

    #[test]
    fn test_pick_invited_single_unlabelled_entry() {
        let invited = vec![InvitedUser {
            id: UserId::new("9"),
            email: String::new(),
        }];
        assert_eq!(pick_invited("a@x.com", invited).unwrap(), UserId::new("9"));
    }

    #[test]
    fn test_pick_invited_ambiguous() {
        let invited = vec![
            InvitedUser {
                id: UserId::new("1"),
                email: "b@x.com".to_string(),
            },
            InvitedUser {
                id: UserId::new("2"),
                email: "c@x.com".to_string(),
            },
        ];
        let err = pick_invited("a@x.com", invited).unwrap_err();
        assert!(matches!(err, ResolutionFailure::Ambiguous { count: 2, .. }));
    }
}
