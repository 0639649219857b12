//! Remote directory and board API boundary
//!
//! The provisioning engine only talks to the host platform through [`BoardApi`].
//! [`crate::core::client::GraphqlClient`] is the HTTP implementation; tests
//! substitute an in-memory one.

use thiserror::Error;

use crate::core::model::{Board, BoardId, InvitedUser, RoleSelection, User, UserId};

/// Errors raised by a remote API call
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("API error: {message}")]
    Remote { message: String },

    #[error("Failed to parse API response: {message}")]
    Decode { message: String },
}

/// Operations the engine needs from the host platform
///
/// Every call is a single blocking round trip. Implementations must not
/// retry; a failed call is returned to the caller as is.
pub trait BoardApi {
    /// List boards, at most `limit` of them
    fn list_boards(&self, limit: u32) -> Result<Vec<Board>, ApiError>;

    /// Fetch the directory of existing accounts
    fn list_users(&self) -> Result<Vec<User>, ApiError>;

    /// Invite `emails` with `role`, returning the created users
    fn invite_users(
        &self,
        emails: &[String],
        role: RoleSelection,
    ) -> Result<Vec<InvitedUser>, ApiError>;

    /// Subscribe `user_ids` to one board
    fn add_users_to_board(&self, board_id: &BoardId, user_ids: &[UserId]) -> Result<(), ApiError>;
}

impl<T: BoardApi + ?Sized> BoardApi for &T {
    fn list_boards(&self, limit: u32) -> Result<Vec<Board>, ApiError> {
        (**self).list_boards(limit)
    }

    fn list_users(&self) -> Result<Vec<User>, ApiError> {
        (**self).list_users()
    }

    fn invite_users(
        &self,
        emails: &[String],
        role: RoleSelection,
    ) -> Result<Vec<InvitedUser>, ApiError> {
        (**self).invite_users(emails, role)
    }

    fn add_users_to_board(&self, board_id: &BoardId, user_ids: &[UserId]) -> Result<(), ApiError> {
        (**self).add_users_to_board(board_id, user_ids)
    }
}
