//! Provisioning orchestrator
//!
//! Drives one run: validate the request, take a directory snapshot if any
//! emails need resolving, then resolve and assign every identity in input
//! order (selected users first, then emails). Per-identity failures become
//! outcome entries; only validation and the snapshot fetch abort the run.
//!
//! Everything is sequential. Emails are resolved against a single snapshot, so
//! resolving them concurrently could race two invitations for the same new
//! address.

use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::api::{ApiError, BoardApi};
use crate::core::executor::BoardAssignmentExecutor;
use crate::core::model::{BoardId, IdentityRequest, RoleSelection, User};
use crate::core::outcome::{OutcomeBucket, OutcomeBuilder, ProvisioningOutcome};
use crate::core::resolver::{DirectoryResolver, ResolutionKind};

/// Caller input insufficient to start a run
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("No users or emails to provision")]
    #[diagnostic(
        code(bprov::validation::no_identities),
        help("Pass --user IDs or --emails / --emails-file")
    )]
    NoIdentities,

    #[error("No boards selected")]
    #[diagnostic(
        code(bprov::validation::no_boards),
        help("Pass one or more --board IDs, or use --interactive")
    )]
    NoBoards,
}

/// Errors that abort a whole run
#[derive(Debug, Error, Diagnostic)]
pub enum ProvisionError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("Failed to fetch the user directory: {0}")]
    #[diagnostic(
        code(bprov::directory_fetch),
        help("Check the API token and endpoint, then run again. No changes were made.")
    )]
    DirectoryFetch(#[source] ApiError),
}

/// Immutable input of one run
#[derive(Debug, Clone, Default)]
pub struct ProvisionRequest {
    pub selected_users: Vec<User>,
    pub raw_email_list: String,
    pub selected_boards: Vec<BoardId>,
    pub role: RoleSelection,
}

impl ProvisionRequest {
    /// Check the request can start, returning the parsed email list
    pub fn validate(&self) -> Result<Vec<String>, ValidationFailure> {
        let emails = parse_email_list(&self.raw_email_list);
        if self.selected_users.is_empty() && emails.is_empty() {
            return Err(ValidationFailure::NoIdentities);
        }
        if self.selected_boards.is_empty() {
            return Err(ValidationFailure::NoBoards);
        }
        Ok(emails)
    }
}

/// Split free-form email text on newlines and commas
///
/// Tokens are trimmed and lower-cased; empty ones are dropped. Repeats are
/// kept.
pub fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(['\n', ','])
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Runs provisioning requests against a [`BoardApi`]
pub struct Provisioner<A: BoardApi> {
    api: A,
}

impl<A: BoardApi> Provisioner<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Run one provisioning request to completion
    pub fn provision(
        &self,
        request: &ProvisionRequest,
    ) -> Result<ProvisioningOutcome, ProvisionError> {
        let emails = request.validate()?;

        // Existing users never need the snapshot; fetch it only for emails,
        // and before any assignment so a failed fetch leaves nothing behind.
        let snapshot = if emails.is_empty() {
            Vec::new()
        } else {
            debug!("fetching user directory");
            self.api.list_users().map_err(ProvisionError::DirectoryFetch)?
        };

        let resolver = DirectoryResolver::new(&self.api, &snapshot, request.role);
        let executor = BoardAssignmentExecutor::new(&self.api);
        let mut outcome = OutcomeBuilder::default();

        let identities = request
            .selected_users
            .iter()
            .cloned()
            .map(IdentityRequest::ExistingUserRef)
            .chain(emails.into_iter().map(IdentityRequest::EmailString));

        for identity in identities {
            let label = identity.label().to_string();

            let resolution = match resolver.resolve(&identity) {
                Ok(resolution) => resolution,
                Err(failure) => {
                    warn!("{}", failure);
                    outcome.record(OutcomeBucket::Failed, label);
                    continue;
                }
            };

            let fan_out = executor.assign(&resolution.user_id, &request.selected_boards);
            let bucket = if !fan_out.any_succeeded() {
                warn!(
                    identity = %label,
                    boards = fan_out.attempts(),
                    "every board assignment failed"
                );
                OutcomeBucket::Failed
            } else {
                match resolution.kind {
                    ResolutionKind::Existing => OutcomeBucket::Added,
                    ResolutionKind::Invited => OutcomeBucket::Invited,
                }
            };
            outcome.record(bucket, label);
        }

        let outcome = outcome.finish();
        info!(
            added = outcome.added.len(),
            invited = outcome.invited.len(),
            failed = outcome.failed.len(),
            total = outcome.total(),
            "provisioning complete"
        );
        Ok(outcome)
    }
}
