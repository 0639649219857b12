//! Core module - provisioning engine, remote API and configuration

pub mod api;
pub mod client;
pub mod config;
pub mod executor;
pub mod model;
pub mod outcome;
pub mod provision;
pub mod resolver;

pub use api::{ApiError, BoardApi};
pub use client::GraphqlClient;
pub use config::{Config, ConfigError};
pub use executor::{AssignmentFailure, BoardAssignmentExecutor, FanOut};
pub use model::{Board, BoardId, IdentityRequest, InvitedUser, RoleSelection, User, UserId};
pub use outcome::{OutcomeBucket, ProvisioningOutcome};
pub use provision::{parse_email_list, ProvisionError, ProvisionRequest, Provisioner, ValidationFailure};
pub use resolver::{DirectoryResolver, Resolution, ResolutionFailure, ResolutionKind};
