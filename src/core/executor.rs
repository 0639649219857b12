//! Board assignment: one call per (user, board) pair

use thiserror::Error;
use tracing::{debug, warn};

use crate::core::api::{ApiError, BoardApi};
use crate::core::model::{BoardId, UserId};

/// A single (user, board) assignment that errored
#[derive(Debug, Error)]
#[error("Adding user {user_id} to board {board_id} failed: {source}")]
pub struct AssignmentFailure {
    pub user_id: UserId,
    pub board_id: BoardId,
    #[source]
    pub source: ApiError,
}

/// Result of fanning one user out over a list of boards
#[derive(Debug, Default)]
pub struct FanOut {
    pub succeeded: Vec<BoardId>,
    pub failed: Vec<AssignmentFailure>,
}

impl FanOut {
    /// At least one board accepted the user
    pub fn any_succeeded(&self) -> bool {
        !self.succeeded.is_empty()
    }

    /// Number of boards tried
    pub fn attempts(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Issues board assignments for resolved users
pub struct BoardAssignmentExecutor<'a, A: BoardApi> {
    api: &'a A,
}

impl<'a, A: BoardApi> BoardAssignmentExecutor<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Add `user_id` to each board in order
    ///
    /// Attempts are independent: a failure on one board does not stop the
    /// remaining ones.
    pub fn assign(&self, user_id: &UserId, board_ids: &[BoardId]) -> FanOut {
        let mut fan_out = FanOut::default();

        for board_id in board_ids {
            match self
                .api
                .add_users_to_board(board_id, std::slice::from_ref(user_id))
            {
                Ok(()) => {
                    debug!(user_id = %user_id, board_id = %board_id, "added to board");
                    fan_out.succeeded.push(board_id.clone());
                }
                Err(source) => {
                    let failure = AssignmentFailure {
                        user_id: user_id.clone(),
                        board_id: board_id.clone(),
                        source,
                    };
                    warn!("{}", failure);
                    fan_out.failed.push(failure);
                }
            }
        }

        fan_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::api::testing::FakeApi;

    fn boards(ids: &[&str]) -> Vec<BoardId> {
        ids.iter().map(|id| BoardId::new(*id)).collect()
    }

    #[test]
    fn test_one_call_per_board_in_order() {
        let api = FakeApi::default();
        let executor = BoardAssignmentExecutor::new(&api);

        let fan_out = executor.assign(&UserId::new("u1"), &boards(&["b1", "b2", "b3"]));
        assert_eq!(fan_out.attempts(), 3);
        assert!(fan_out.failed.is_empty());
        assert_eq!(
            api.assignments(),
            vec![
                ("u1".to_string(), "b1".to_string()),
                ("u1".to_string(), "b2".to_string()),
                ("u1".to_string(), "b3".to_string()),
            ]
        );
    }

    #[test]
    fn test_failure_does_not_stop_remaining_boards() {
        let mut api = FakeApi::default();
        api.failing_assignments
            .insert(("u1".to_string(), "b1".to_string()));
        let executor = BoardAssignmentExecutor::new(&api);

        let fan_out = executor.assign(&UserId::new("u1"), &boards(&["b1", "b2"]));
        assert_eq!(api.assignments().len(), 2);
        assert_eq!(fan_out.succeeded, boards(&["b2"]));
        assert_eq!(fan_out.failed.len(), 1);
        assert_eq!(fan_out.failed[0].board_id, BoardId::new("b1"));
        assert!(fan_out.any_succeeded());
    }

    #[test]
    fn test_all_failed() {
        let mut api = FakeApi::default();
        api.failing_assignments
            .insert(("u1".to_string(), "b1".to_string()));
        let executor = BoardAssignmentExecutor::new(&api);

        let fan_out = executor.assign(&UserId::new("u1"), &boards(&["b1"]));
        assert!(!fan_out.any_succeeded());
    }
}
